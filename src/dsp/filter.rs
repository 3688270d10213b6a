//! # One-Pole Lowpass / Highpass Filter
//!
//! A one-pole lowpass filter is the simplest possible IIR (Infinite Impulse
//! Response) filter. It removes high-frequency content from a signal while
//! letting low frequencies pass through.
//!
//! ## The Filter Equation
//!
//! ```text
//! y[n] = a0 * x[n] + b1 * y[n-1]
//! ```
//!
//! Where:
//! - `x[n]` is the current input sample
//! - `y[n]` is the current output sample
//! - `y[n-1]` is the *previous* output sample (the filter's "memory", `z1`)
//! - `b1` is the feedback coefficient and `a0 = 1 - b1`
//!
//! Because `a0 + b1 == 1`, a constant input settles at exactly that
//! constant: the lowpass has unity gain at DC.
//!
//! ## Computing the Coefficients from Frequency
//!
//! ```text
//! alpha = e^(-2π * cutoff_hz / sample_rate)
//! a0    = 1 - alpha
//! b1    = alpha
//! ```
//!
//! ## The Highpass
//!
//! The highpass output is simply `x - lowpass(x)`: whatever the lowpass
//! removed. It shares the lowpass pole and state, so it is a complementary
//! filter rather than an independently designed highpass, and switching
//! modes never causes a jump in the filter memory.

use std::f64::consts::PI;

use nih_plug::prelude::Enum;

/// Lowest cutoff we accept. Below this the pole sits so close to 1.0 that
/// the filter effectively freezes.
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff as a fraction of the sample rate, a margin below Nyquist
/// (0.5).
pub const MAX_CUTOFF_RATIO: f32 = 0.45;

/// Which side of the one-pole response is sent to the output.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    #[id = "lowpass"]
    #[name = "Low Pass"]
    LowPass,
    #[id = "highpass"]
    #[name = "High Pass"]
    HighPass,
}

/// A one-pole (6 dB/octave) filter with independent state per channel.
///
/// All channels share one set of coefficients; only the previous output
/// differs between them.
pub struct OnePoleFilter {
    /// Feedforward gain, `1 - b1`.
    a0: f32,

    /// Feedback gain (the pole), `e^(-2π·fc/fs)`.
    b1: f32,

    /// Previous lowpass output for each channel.
    z1: Vec<f32>,

    /// The `(cutoff, sample_rate)` the coefficients were computed for.
    /// `None` until the first `set_cutoff()`.
    tuned_for: Option<(f32, f32)>,
}

impl Default for OnePoleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl OnePoleFilter {
    /// Create a new filter initialized to passthrough (`a0 = 1`, `b1 = 0`)
    /// with no channel state yet.
    pub fn new() -> Self {
        Self {
            a0: 1.0,
            b1: 0.0,
            z1: Vec::new(),
            tuned_for: None,
        }
    }

    /// Update the coefficients for a given cutoff frequency.
    ///
    /// The cutoff is clamped to `[10 Hz, 0.45 * sample_rate]` and a
    /// nonsensical sample rate falls back to 44.1 kHz. Calling this again
    /// with the same arguments is free, so callers can do it once per block
    /// without tracking changes themselves.
    ///
    /// Example at 44100 Hz:
    /// - cutoff = 19845 Hz (the clamp) → b1 ≈ 0.06 (barely filtering)
    /// - cutoff = 1000 Hz → b1 ≈ 0.87 (noticeable filtering)
    /// - cutoff = 10 Hz → b1 ≈ 0.9986 (heavy filtering)
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        if self.tuned_for == Some((cutoff_hz, sample_rate)) {
            return;
        }

        let fs = super::sanitize_sample_rate(sample_rate);
        let fc = if cutoff_hz.is_finite() {
            cutoff_hz.clamp(MIN_CUTOFF_HZ, fs * MAX_CUTOFF_RATIO)
        } else {
            MIN_CUTOFF_HZ
        };

        // The exponential is evaluated in double precision and narrowed.
        let alpha = (-2.0 * PI * fc as f64 / fs as f64).exp();
        self.a0 = (1.0 - alpha) as f32;
        self.b1 = alpha as f32;
        self.tuned_for = Some((cutoff_hz, sample_rate));
    }

    /// Make sure there is state for at least `num_channels` channels.
    ///
    /// New slots start at zero. Existing slots keep their memory and the
    /// state is never shrunk, so a host briefly reporting fewer channels
    /// doesn't erase the others.
    pub fn ensure_channels(&mut self, num_channels: usize) {
        if self.z1.len() < num_channels {
            self.z1.resize(num_channels, 0.0);
        }
    }

    /// Number of channels that currently have state.
    pub fn num_channels(&self) -> usize {
        self.z1.len()
    }

    /// Run one sample through the lowpass of `channel`.
    ///
    /// A channel without state passes through unchanged.
    pub fn process_low_pass(&mut self, input: f32, channel: usize) -> f32 {
        let Some(z1) = self.z1.get_mut(channel) else {
            return input;
        };

        let output = self.a0 * input + self.b1 * *z1;
        *z1 = output;
        output
    }

    /// Run one sample through the complementary highpass of `channel`:
    /// `input - lowpass(input)`.
    pub fn process_high_pass(&mut self, input: f32, channel: usize) -> f32 {
        if channel >= self.z1.len() {
            return input;
        }
        input - self.process_low_pass(input, channel)
    }

    /// Run one sample through the side selected by `mode`.
    pub fn process(&mut self, input: f32, channel: usize, mode: FilterMode) -> f32 {
        match mode {
            FilterMode::LowPass => self.process_low_pass(input, channel),
            FilterMode::HighPass => self.process_high_pass(input, channel),
        }
    }

    /// Filter planar audio in place with the current coefficients.
    ///
    /// State is grown for any channel seen for the first time. Hosts
    /// announce the channel count in `initialize()`, so calling
    /// [`ensure_channels`](Self::ensure_channels) there keeps this from
    /// ever allocating on the audio thread.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], mode: FilterMode) {
        self.ensure_channels(channels.len());

        for (channel, samples) in channels.iter_mut().enumerate() {
            for sample in samples.iter_mut() {
                *sample = self.process(*sample, channel, mode);
            }
        }
    }

    /// Reset every channel's memory to zero, keeping the coefficients.
    pub fn reset(&mut self) {
        self.z1.fill(0.0);
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
