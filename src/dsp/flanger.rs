//! # Flanger Processor
//!
//! A flanger is a feedback delay whose delay time is swept by an LFO over
//! a few milliseconds. Mixing the swept copy with the dry signal produces
//! a comb filter whose notches glide up and down the spectrum.
//!
//! ```text
//! delay_samples = depth_ms * lfo(t) * sample_rate / 1000
//! ```
//!
//! The delay is almost never a whole number of samples here, so the
//! fractional read of [`DelayLine`] is what keeps the sweep smooth.

use super::delay::{clamp_feedback, clamp_unit, finite_or, process_sample};
use super::delay_line::DelayLine;
use super::lfo::Lfo;
use super::{ms_to_samples, sanitize_sample_rate};

/// Longest modulated delay the lines are sized for. Covers the 20 ms depth
/// limit of the plugin with headroom.
pub const MAX_FLANGER_DELAY_SECONDS: f32 = 0.05;

/// Parameter values for one flanger block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlangerParameters {
    /// Peak delay of the sweep, in milliseconds.
    pub depth_ms: f32,
    /// LFO speed in Hz.
    pub rate_hz: f32,
    /// Fraction of the swept signal fed back into the line. Higher values
    /// make the comb notches sharper and the sweep more metallic.
    pub feedback: f32,
    /// Gain of the swept signal at the output.
    pub wet: f32,
    /// Gain of the untouched input at the output.
    pub dry: f32,
}

impl Default for FlangerParameters {
    fn default() -> Self {
        Self {
            depth_ms: 5.0,
            rate_hz: 0.5,
            feedback: 0.35,
            wet: 0.5,
            dry: 0.5,
        }
    }
}

impl FlangerParameters {
    /// The same parameters with every field forced into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            depth_ms: finite_or(self.depth_ms, 0.0).max(0.0),
            rate_hz: finite_or(self.rate_hz, 0.0).max(0.0),
            feedback: clamp_feedback(self.feedback),
            wet: clamp_unit(self.wet),
            dry: clamp_unit(self.dry),
        }
    }
}

/// A delay line and the LFO sweeping it.
struct Voice {
    line: DelayLine,
    lfo: Lfo,
}

/// Multi-channel flanger.
///
/// Every channel has its own voice. All LFOs start at phase 0 and run at
/// the same rate, so the channels sweep in lock-step.
pub struct FlangerProcessor {
    sample_rate: f32,
    voices: Vec<Voice>,
}

impl Default for FlangerProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FlangerProcessor {
    /// An unprepared processor that leaves audio untouched.
    pub fn new() -> Self {
        Self {
            sample_rate: super::FALLBACK_SAMPLE_RATE,
            voices: Vec::new(),
        }
    }

    /// Allocate one voice per channel for the given sample rate.
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.sample_rate = sanitize_sample_rate(sample_rate);
        let capacity = DelayLine::capacity_for(MAX_FLANGER_DELAY_SECONDS, self.sample_rate);
        self.voices = (0..num_channels)
            .map(|_| Voice {
                line: DelayLine::new(capacity),
                lfo: Lfo::new(),
            })
            .collect();
    }

    /// Whether `prepare()` has allocated any voices.
    pub fn is_prepared(&self) -> bool {
        !self.voices.is_empty()
    }

    /// Sample rate the voices were sized for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Ring capacity of each voice, or 0 when unprepared.
    pub fn capacity(&self) -> usize {
        self.voices.first().map_or(0, |voice| voice.line.capacity())
    }

    /// Process planar audio in place.
    ///
    /// Per sample: advance the LFO, turn `depth * lfo` into a delay, read
    /// the delayed sample, write `input + feedback * delayed`, output
    /// `dry * input + wet * delayed`.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], params: FlangerParameters) {
        let params = params.clamped();
        let depth_samples = ms_to_samples(params.depth_ms, self.sample_rate);

        for (voice, samples) in self.voices.iter_mut().zip(channels.iter_mut()) {
            voice.lfo.set_rate(params.rate_hz, self.sample_rate);

            for sample in samples.iter_mut() {
                let delay_samples = depth_samples * voice.lfo.next_sample();
                *sample = process_sample(
                    &mut voice.line,
                    *sample,
                    delay_samples,
                    params.feedback,
                    params.wet,
                    params.dry,
                );
            }
        }
    }

    /// Silence the lines and restart every LFO at phase 0.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.line.clear();
            voice.lfo.reset();
        }
    }

    /// Ring-out time after the input stops: the -60 dB decay of the
    /// feedback loop at the deepest point of the sweep.
    pub fn tail_samples(&self, params: FlangerParameters) -> u32 {
        let params = params.clamped();
        let period = ms_to_samples(params.depth_ms, self.sample_rate).max(1.0);

        if params.feedback > 0.001 {
            let repeats = -3.0 / params.feedback.log10();
            (repeats * period) as u32
        } else {
            period as u32
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_sized_for_max_depth() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(48000.0, 2);

        // 0.05 s @ 48 kHz = 2400 samples → 4096
        assert_eq!(flanger.capacity(), 4096);
        assert!(flanger.is_prepared());
        assert_eq!(flanger.sample_rate(), 48000.0);
    }

    /// With zero depth the delay clamps to one sample, so the wet path is
    /// the input shifted by exactly one sample.
    #[test]
    fn test_zero_depth_is_one_sample_delay() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(48000.0, 1);

        let params = FlangerParameters {
            depth_ms: 0.0,
            rate_hz: 1.0,
            feedback: 0.0,
            wet: 1.0,
            dry: 0.0,
        };

        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = input.clone();
        flanger.process_block(&mut [output.as_mut_slice()], params);

        assert_eq!(output[0], 0.0);
        for i in 1..64 {
            assert!((output[i] - input[i - 1]).abs() < 1e-6);
        }
    }

    /// At LFO rate 0 the phase stays at 0 where the LFO reads 0.5, so the
    /// flanger is a plain delay of half the depth.
    #[test]
    fn test_frozen_lfo_is_fixed_delay_at_half_depth() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(1000.0, 1);

        let params = FlangerParameters {
            depth_ms: 20.0,
            rate_hz: 0.0,
            feedback: 0.5,
            wet: 1.0,
            dry: 0.0,
        };

        let mut signal = vec![0.0; 40];
        signal[0] = 1.0;
        flanger.process_block(&mut [signal.as_mut_slice()], params);

        assert!((signal[10] - 1.0).abs() < 1e-6);
        assert!((signal[20] - 0.5).abs() < 1e-6);
        assert!((signal[30] - 0.25).abs() < 1e-6);
    }

    /// The modulated delay always stays within the ring and output stays
    /// bounded, even with every parameter at its extreme.
    #[test]
    fn test_sweep_stays_bounded() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(44100.0, 2);

        let params = FlangerParameters {
            depth_ms: 1000.0, // deeper than the ring, gets clamped per sample
            rate_hz: 10.0,
            feedback: 5.0,
            wet: 1.0,
            dry: 1.0,
        };

        let mut left: Vec<f32> = (0..44100).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut right = left.clone();
        for (l, r) in left.chunks_mut(256).zip(right.chunks_mut(256)) {
            flanger.process_block(&mut [l, r], params);
        }

        // Bounded by (1 + 1) / (1 - 0.95) for a unit-amplitude input.
        assert!(left.iter().all(|s| s.is_finite() && s.abs() <= 40.0));
        // Identical input and lock-step LFOs give identical channels.
        assert_eq!(left, right);
    }

    /// Stereo voices don't share a line.
    #[test]
    fn test_stereo_channels_are_independent() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(48000.0, 2);

        let mut left = vec![1.0; 128];
        let mut right = vec![0.0; 128];
        flanger.process_block(
            &mut [left.as_mut_slice(), right.as_mut_slice()],
            FlangerParameters::default(),
        );

        assert!(right.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_reset_restarts_sweep() {
        let mut flanger = FlangerProcessor::new();
        flanger.prepare(48000.0, 1);
        let params = FlangerParameters::default();

        let source: Vec<f32> = (0..512).map(|i| (i as f32 * 0.3).cos()).collect();

        let mut first = source.clone();
        flanger.process_block(&mut [first.as_mut_slice()], params);
        flanger.reset();

        let mut second = source.clone();
        flanger.process_block(&mut [second.as_mut_slice()], params);

        assert_eq!(first, second);
    }

    #[test]
    fn test_unprepared_passes_audio_through() {
        let mut flanger = FlangerProcessor::new();

        let mut signal = vec![0.25, -0.5];
        flanger.process_block(&mut [signal.as_mut_slice()], FlangerParameters::default());
        assert_eq!(signal, vec![0.25, -0.5]);
    }
}
