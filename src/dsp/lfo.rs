//! # Low-Frequency Oscillator
//!
//! A sine wave running far below the audible range (a fraction of a Hz up
//! to ~10 Hz), used to sweep the flanger's delay time back and forth.
//!
//! The output is *unipolar*:
//!
//! ```text
//! value = 0.5 * (1 + sin(phase))      // always within [0, 1]
//! ```
//!
//! so it can be multiplied directly with a depth to get a delay that never
//! goes negative.

use std::f32::consts::TAU;

/// A unipolar sine LFO driven by a phase accumulator.
pub struct Lfo {
    /// Current phase in radians, always within `[0, 2π)`.
    phase: f32,

    /// Radians added per sample: `2π * rate / sample_rate`.
    increment: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfo {
    /// A stopped LFO at phase 0 (output 0.5).
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
        }
    }

    /// Set the oscillation rate.
    ///
    /// The rate is clamped to `[0, sample_rate / 2]`; above Nyquist the
    /// phase would advance by more than π per sample and the "sine" would
    /// alias into something else entirely.
    pub fn set_rate(&mut self, rate_hz: f32, sample_rate: f32) {
        let fs = super::sanitize_sample_rate(sample_rate);
        let rate = if rate_hz.is_finite() {
            rate_hz.clamp(0.0, fs * 0.5)
        } else {
            0.0
        };
        self.increment = TAU * rate / fs;
    }

    /// Output for an arbitrary phase (radians, any range).
    pub fn value_at(phase: f32) -> f32 {
        0.5 * (1.0 + phase.sin())
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return the value at the current phase, then advance by one sample.
    pub fn next_sample(&mut self) -> f32 {
        let value = Self::value_at(self.phase);

        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        value
    }

    /// Go back to phase 0, keeping the rate.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stays_unipolar() {
        let mut lfo = Lfo::new();
        lfo.set_rate(7.3, 1000.0);

        for _ in 0..10_000 {
            let value = lfo.next_sample();
            assert!((0.0..=1.0).contains(&value), "LFO left [0, 1]: {value}");
            assert!((0.0..TAU).contains(&lfo.phase()));
        }
    }

    #[test]
    fn test_wrap_is_continuous() {
        let epsilon = 1e-3;
        let before_wrap = Lfo::value_at(TAU - epsilon);
        let after_wrap = Lfo::value_at(-epsilon);
        assert!((before_wrap - after_wrap).abs() < 1e-4);
    }

    /// One full period of samples brings the phase back to where it started.
    #[test]
    fn test_full_period_returns_to_start() {
        let mut lfo = Lfo::new();
        lfo.set_rate(1.0, 100.0);

        let first = lfo.next_sample();
        for _ in 1..100 {
            lfo.next_sample();
        }

        assert!(lfo.phase() < 1e-3 || (TAU - lfo.phase()) < 1e-3);
        assert!((lfo.next_sample() - first).abs() < 1e-3);
    }

    #[test]
    fn test_quarter_period_peaks() {
        let mut lfo = Lfo::new();
        lfo.set_rate(1.0, 4.0);

        // Phases 0, π/2, π, 3π/2 → 0.5, 1.0, 0.5, 0.0
        let expected = [0.5, 1.0, 0.5, 0.0];
        for want in expected {
            let got = lfo.next_sample();
            assert!((got - want).abs() < 1e-5, "Expected {want}, got {got}");
        }
    }

    #[test]
    fn test_rate_above_nyquist_is_clamped() {
        let mut lfo = Lfo::new();
        lfo.set_rate(1_000_000.0, 48000.0);
        lfo.next_sample();
        assert!((lfo.phase() - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_reset_keeps_rate() {
        let mut lfo = Lfo::new();
        lfo.set_rate(1.0, 4.0);
        lfo.next_sample();
        lfo.reset();

        assert_eq!(lfo.phase(), 0.0);
        lfo.next_sample();
        assert!((lfo.phase() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
