//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks shared by every plugin in this crate:
//!
//! - **`delay_line`**: a power-of-two ring buffer that stores past audio
//!   samples and retrieves them after a (fractional) delay.
//! - **`lfo`**: a unipolar sine low-frequency oscillator.
//! - **`filter`**: a one-pole lowpass, with the complementary highpass
//!   derived from it.
//! - **`delay`** / **`flanger`**: the block processors that wire delay
//!   lines, LFOs and the feedback/mix math together.
//! - **`arpeggiator`**: the MIDI step scheduler.
//! - **`meter`**: smoothed per-channel RMS, published through atomics.
//!
//! Nothing in here allocates after `prepare()`, locks, or returns errors.
//! Out-of-range inputs are clamped instead.

pub mod arpeggiator;
pub mod delay;
pub mod delay_line;
pub mod filter;
pub mod flanger;
pub mod lfo;
pub mod meter;

/// Sample rate substituted when the host reports a nonsensical one.
pub const FALLBACK_SAMPLE_RATE: f32 = 44100.0;

/// Replace a zero, negative or non-finite sample rate with
/// [`FALLBACK_SAMPLE_RATE`].
pub fn sanitize_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        FALLBACK_SAMPLE_RATE
    }
}

/// Convert a time in milliseconds to a (fractional) number of samples.
///
/// ```text
/// delay_samples = delay_ms * sample_rate / 1000
/// ```
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sample_rate() {
        assert_eq!(sanitize_sample_rate(48000.0), 48000.0);
        assert_eq!(sanitize_sample_rate(0.0), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(-1.0), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(f32::NAN), FALLBACK_SAMPLE_RATE);
        assert_eq!(sanitize_sample_rate(f32::INFINITY), FALLBACK_SAMPLE_RATE);
    }

    #[test]
    fn test_ms_to_samples() {
        assert!((ms_to_samples(500.0, 48000.0) - 24000.0).abs() < 1e-3);
        assert!((ms_to_samples(100.0, 44100.0) - 4410.0).abs() < 1e-3);
    }
}
