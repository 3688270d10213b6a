//! # RMS Level Meter
//!
//! Measures how loud each channel is, block by block, and publishes the
//! result for a reader on another thread (an editor, a test, a logger).
//!
//! ## Block RMS
//!
//! ```text
//! rms = sqrt( (x[0]² + x[1]² + ... + x[n-1]²) / n )
//! ```
//!
//! The sum of squares is accumulated in `f64` so long blocks of quiet audio
//! don't lose their low bits.
//!
//! ## Smoothing
//!
//! A raw block RMS jumps around with every block. The meter follows it
//! with an exponential moving average:
//!
//! ```text
//! smoothed = (1 - a) * rms + a * previous
//! ```
//!
//! `a = 0` shows the raw block value, `a` close to 1 gives a slow, heavy
//! needle. `a` is clamped to `[0, 1]`.
//!
//! ## Publishing
//!
//! Each smoothed value is stored into an [`AtomicF32`] slot of a shared
//! [`MeterReadings`]. The audio thread only ever stores and the reader
//! only ever loads, so neither side can block the other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use atomic_float::AtomicF32;

/// Channels a [`MeterReadings`] can publish.
pub const MAX_METER_CHANNELS: usize = 8;

/// Smoothing used until the host sets one.
pub const DEFAULT_SMOOTHING: f32 = 0.2;

/// The latest smoothed RMS of every channel, readable from any thread.
pub struct MeterReadings {
    levels: [AtomicF32; MAX_METER_CHANNELS],
    num_channels: AtomicUsize,
}

impl Default for MeterReadings {
    fn default() -> Self {
        Self {
            levels: std::array::from_fn(|_| AtomicF32::new(0.0)),
            num_channels: AtomicUsize::new(0),
        }
    }
}

impl MeterReadings {
    /// Number of channels with a published level.
    pub fn num_channels(&self) -> usize {
        self.num_channels.load(Ordering::Relaxed)
    }

    /// Smoothed RMS of `channel`, or 0 for a channel that isn't metered.
    pub fn level(&self, channel: usize) -> f32 {
        if channel >= self.num_channels() {
            return 0.0;
        }
        self.levels[channel].load(Ordering::Relaxed)
    }

    /// A copy of every published level. Allocates, so call it from the
    /// reading side only.
    pub fn latest(&self) -> Vec<f32> {
        (0..self.num_channels()).map(|ch| self.level(ch)).collect()
    }

    fn publish(&self, levels: &[f32]) {
        let count = levels.len().min(MAX_METER_CHANNELS);
        for (slot, level) in self.levels.iter().zip(&levels[..count]) {
            slot.store(*level, Ordering::Relaxed);
        }
        self.num_channels.store(count, Ordering::Relaxed);
    }
}

/// Per-channel block RMS with exponential smoothing.
pub struct RmsMeter {
    /// Smoothed RMS per channel, grown lazily and never shrunk.
    smoothed: Vec<f32>,
    smoothing: f32,
    readings: Arc<MeterReadings>,
}

impl Default for RmsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl RmsMeter {
    pub fn new() -> Self {
        Self {
            smoothed: Vec::new(),
            smoothing: DEFAULT_SMOOTHING,
            readings: Arc::new(MeterReadings::default()),
        }
    }

    /// Handle for the reading side.
    pub fn readings(&self) -> Arc<MeterReadings> {
        self.readings.clone()
    }

    /// Set the smoothing factor `a`, clamped to `[0, 1]`. NaN means no
    /// smoothing.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = if smoothing.is_finite() {
            smoothing.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Make sure there is state for at least `num_channels` channels. New
    /// channels start at silence; existing ones keep their level.
    pub fn ensure_channels(&mut self, num_channels: usize) {
        if self.smoothed.len() < num_channels {
            self.smoothed.resize(num_channels, 0.0);
        }
    }

    /// Root mean square of one block. An empty block measures 0.
    pub fn block_rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f64 = samples.iter().map(|s| (*s as f64) * (*s as f64)).sum();
        (sum_squares / samples.len() as f64).sqrt() as f32
    }

    /// Measure one block of planar audio, fold it into the smoothed levels
    /// and publish them. Empty blocks leave the levels untouched.
    pub fn process_block<S: AsRef<[f32]>>(&mut self, channels: &[S]) {
        self.ensure_channels(channels.len());

        let a = self.smoothing;
        for (smoothed, samples) in self.smoothed.iter_mut().zip(channels) {
            let samples = samples.as_ref();
            if samples.is_empty() {
                continue;
            }
            *smoothed = (1.0 - a) * Self::block_rms(samples) + a * *smoothed;
        }

        self.readings.publish(&self.smoothed);
    }

    /// Drop every level back to silence and publish that.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.readings.publish(&self.smoothed);
    }
}
