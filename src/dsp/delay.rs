//! # Feedback Delay Processor
//!
//! Wires one [`DelayLine`] per channel into the classic feedback echo:
//!
//! ```text
//! Input ──┬──────────────────────────────────────── × dry ───┐
//!         │                                                  │
//!         └──►(+)──► [Delay Line] ──┬──► × wet ─────────────►(+)──► Output
//!              ▲                    │
//!              └──── × feedback ◄───┘
//! ```
//!
//! Each channel has its own line and write head, so a stereo signal stays
//! stereo: the left echoes never leak into the right channel.

use super::delay_line::DelayLine;
use super::{ms_to_samples, sanitize_sample_rate};

/// Longest delay time the processor is sized for.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// Highest feedback gain the core accepts. At 1.0 the echoes would never
/// decay; above it they would grow until they clip.
pub const MAX_FEEDBACK: f32 = 0.95;

/// Parameter values for one audio block.
///
/// Read from the host parameters once at the top of `process()` and handed
/// to the processor by value, so the DSP code never touches shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParameters {
    /// Time between the input and its first echo, in milliseconds.
    pub delay_ms: f32,
    /// Fraction of the delayed signal fed back into the line.
    pub feedback: f32,
    /// Gain of the delayed signal at the output.
    pub wet: f32,
    /// Gain of the untouched input at the output.
    pub dry: f32,
}

impl Default for DelayParameters {
    fn default() -> Self {
        Self {
            delay_ms: 500.0,
            feedback: 0.4,
            wet: 0.5,
            dry: 0.5,
        }
    }
}

impl DelayParameters {
    /// The same parameters with every field forced into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            delay_ms: finite_or(self.delay_ms, 0.0).max(0.0),
            feedback: clamp_feedback(self.feedback),
            wet: clamp_unit(self.wet),
            dry: clamp_unit(self.dry),
        }
    }
}

pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    finite_or(value, 0.0).clamp(0.0, 1.0)
}

pub(crate) fn clamp_feedback(value: f32) -> f32 {
    finite_or(value, 0.0).clamp(0.0, MAX_FEEDBACK)
}

/// One echo step on one sample.
///
/// Reads the delayed sample first, then writes `input + feedback * delayed`
/// into the line, so the current input can only be heard on a *later*
/// sample. Returns the dry/wet mixed output.
#[inline]
pub(crate) fn process_sample(
    line: &mut DelayLine,
    input: f32,
    delay_samples: f32,
    feedback: f32,
    wet: f32,
    dry: f32,
) -> f32 {
    let delayed = line.read(delay_samples);
    line.write(input + feedback * delayed);
    dry * input + wet * delayed
}

/// Multi-channel feedback delay.
pub struct DelayProcessor {
    sample_rate: f32,
    lines: Vec<DelayLine>,
}

impl Default for DelayProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayProcessor {
    /// An unprepared processor. Until [`prepare`](Self::prepare) is called,
    /// [`process_block`](Self::process_block) leaves audio untouched.
    pub fn new() -> Self {
        Self {
            sample_rate: super::FALLBACK_SAMPLE_RATE,
            lines: Vec::new(),
        }
    }

    /// Allocate one delay line per channel for the given sample rate,
    /// discarding any previous lines and their contents.
    ///
    /// Must not run concurrently with `process_block()`; plugin hosts only
    /// call `initialize()` while audio is stopped.
    pub fn prepare(&mut self, sample_rate: f32, num_channels: usize) {
        self.sample_rate = sanitize_sample_rate(sample_rate);
        let capacity = DelayLine::capacity_for(MAX_DELAY_SECONDS, self.sample_rate);
        self.lines = (0..num_channels).map(|_| DelayLine::new(capacity)).collect();
    }

    /// Whether `prepare()` has allocated any lines.
    pub fn is_prepared(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Sample rate the lines were sized for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Ring capacity of each line, or 0 when unprepared.
    pub fn capacity(&self) -> usize {
        self.lines.first().map_or(0, DelayLine::capacity)
    }

    /// Process planar audio in place.
    ///
    /// `channels[n]` is channel `n`'s samples for this block. Channels
    /// beyond the number of prepared lines are left as they are.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], params: DelayParameters) {
        let params = params.clamped();
        let delay_samples = ms_to_samples(params.delay_ms, self.sample_rate);

        for (line, samples) in self.lines.iter_mut().zip(channels.iter_mut()) {
            for sample in samples.iter_mut() {
                *sample = process_sample(
                    line,
                    *sample,
                    delay_samples,
                    params.feedback,
                    params.wet,
                    params.dry,
                );
            }
        }
    }

    /// Silence every line.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// How many samples the effect keeps ringing after the input stops.
    ///
    /// Each repeat is attenuated by the feedback factor, so after N repeats
    /// the level is `feedback^N`. Solving `feedback^N = 0.001` (-60 dB):
    ///
    /// ```text
    /// N = log10(0.001) / log10(feedback) = -3 / log10(feedback)
    /// ```
    ///
    /// With (almost) no feedback there is exactly one echo.
    pub fn tail_samples(&self, params: DelayParameters) -> u32 {
        let params = params.clamped();
        let delay_samples = ms_to_samples(params.delay_ms, self.sample_rate);

        if params.feedback > 0.001 {
            let repeats = -3.0 / params.feedback.log10();
            (repeats * delay_samples) as u32
        } else {
            delay_samples as u32
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
