//! # Plugin Parameters
//!
//! Parameters are the knobs and sliders the user sees in the DAW. Each
//! parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   save and recall presets. Once published, never change these IDs
//!   or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** (min, max, and optional skew).
//! - A **default value**.
//!
//! ## Snapshots
//!
//! The host (and its automation thread) writes these values at any time;
//! nih-plug stores them atomically. The audio thread reads each parameter
//! once at the top of `process()` through a `snapshot()` method, and the
//! resulting plain struct is what the DSP code sees for the whole block.
//! Changes therefore land with at most one block of latency.

use nih_plug::prelude::*;

use crate::dsp::arpeggiator::{ArpDirection, NoteDivision};
use crate::dsp::delay::{DelayParameters, MAX_FEEDBACK};
use crate::dsp::filter::FilterMode;
use crate::dsp::flanger::FlangerParameters;
use crate::dsp::meter::DEFAULT_SMOOTHING;

/// A 0-100% parameter used for the wet and dry gains.
fn gain_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(name, default, FloatRange::Linear { min: 0.0, max: 1.0 })
        .with_unit("%")
        .with_value_to_string(formatters::v2s_f32_percentage(1))
        .with_string_to_value(formatters::s2v_f32_percentage())
}

/// Feedback, capped at 95% like the DSP core.
fn feedback_param(default: f32) -> FloatParam {
    FloatParam::new(
        "Feedback",
        default,
        FloatRange::Linear {
            min: 0.0,
            max: MAX_FEEDBACK,
        },
    )
    .with_unit("%")
    .with_value_to_string(formatters::v2s_f32_percentage(1))
    .with_string_to_value(formatters::s2v_f32_percentage())
}

// ─────────────────────────────────────────────────────────────────────
// Output meter
// ─────────────────────────────────────────────────────────────────────

/// Output meter settings, shared by every audio plugin in the bundle.
#[derive(Params)]
pub struct MeterParams {
    /// **Meter Smoothing**: 0 shows each block's raw RMS, values near 1
    /// make the meter fall slowly.
    #[id = "rms_smooth"]
    pub smoothing: FloatParam,
}

impl Default for MeterParams {
    fn default() -> Self {
        Self {
            smoothing: FloatParam::new(
                "Meter Smoothing",
                DEFAULT_SMOOTHING,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_step_size(0.001),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Delay
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the Loveless Delay plugin.
#[derive(Params)]
pub struct DelayParams {
    /// **Delay Time**: how long before you hear the echo.
    ///
    /// Range: 1ms to 2000ms. The skewed range gives the short slapback
    /// times more knob travel, where small changes are most audible.
    #[id = "delay"]
    pub delay_time: FloatParam,

    /// **Feedback**: how many times the echo repeats.
    ///
    /// - 0% = one echo only
    /// - 95% = very long, slowly decaying repeats
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Wet**: level of the echoes.
    #[id = "wet"]
    pub wet: FloatParam,

    /// **Dry**: level of the original signal.
    ///
    /// Wet and dry are independent: 100% wet with 0% dry is what you want
    /// on an aux send, 50/50 is a typical insert setting.
    #[id = "dry"]
    pub dry: FloatParam,

    #[nested(group = "Meter")]
    pub meter: MeterParams,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                500.0,
                FloatRange::Skewed {
                    min: 1.0,
                    max: 2000.0,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" ms")
            .with_step_size(1.0),

            feedback: feedback_param(0.40),
            wet: gain_param("Wet", 0.50),
            dry: gain_param("Dry", 0.50),
            meter: MeterParams::default(),
        }
    }
}

impl DelayParams {
    /// Current values, read once for this block.
    pub fn snapshot(&self) -> DelayParameters {
        DelayParameters {
            delay_ms: self.delay_time.value(),
            feedback: self.feedback.value(),
            wet: self.wet.value(),
            dry: self.dry.value(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Flanger
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the Loveless Flanger plugin.
#[derive(Params)]
pub struct FlangerParams {
    /// **Depth**: the longest delay the sweep reaches. Typical flanging
    /// lives between 1 and 10 ms.
    #[id = "depth"]
    pub depth: FloatParam,

    /// **Rate**: how fast the sweep moves, 0.01 to 10 Hz.
    #[id = "rate"]
    pub rate: FloatParam,

    #[id = "fdbk"]
    pub feedback: FloatParam,

    #[id = "wet"]
    pub wet: FloatParam,

    #[id = "dry"]
    pub dry: FloatParam,

    #[nested(group = "Meter")]
    pub meter: MeterParams,
}

impl Default for FlangerParams {
    fn default() -> Self {
        Self {
            depth: FloatParam::new(
                "Depth",
                5.0,
                FloatRange::Linear {
                    min: 0.0,
                    max: 20.0,
                },
            )
            .with_unit(" ms")
            .with_step_size(0.01),

            rate: FloatParam::new(
                "Rate",
                0.5,
                FloatRange::Skewed {
                    min: 0.01,
                    max: 10.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(0.01),

            feedback: feedback_param(0.35),
            wet: gain_param("Wet", 0.50),
            dry: gain_param("Dry", 0.50),
            meter: MeterParams::default(),
        }
    }
}

impl FlangerParams {
    pub fn snapshot(&self) -> FlangerParameters {
        FlangerParameters {
            depth_ms: self.depth.value(),
            rate_hz: self.rate.value(),
            feedback: self.feedback.value(),
            wet: self.wet.value(),
            dry: self.dry.value(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Filter
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the Loveless Filter plugin.
#[derive(Params)]
pub struct FilterParams {
    /// **Cutoff**: where the filter starts to act.
    ///
    /// Strong skew because frequency perception is roughly logarithmic:
    /// 100 → 200 Hz is a huge change, 19800 → 20000 Hz is inaudible.
    #[id = "cutoff"]
    pub cutoff: FloatParam,

    /// **Type**: low pass keeps what is below the cutoff, high pass what
    /// is above it.
    #[id = "type"]
    pub mode: EnumParam<FilterMode>,

    #[nested(group = "Meter")]
    pub meter: MeterParams,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff: FloatParam::new(
                "Cutoff",
                1000.0,
                FloatRange::Skewed {
                    min: 10.0,
                    max: 20000.0,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(1.0),

            mode: EnumParam::new("Type", FilterMode::LowPass),
            meter: MeterParams::default(),
        }
    }
}

/// Filter settings for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSnapshot {
    pub cutoff_hz: f32,
    pub mode: FilterMode,
}

impl FilterParams {
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            cutoff_hz: self.cutoff.value(),
            mode: self.mode.value(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Arpeggiator
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the Loveless Arp plugin. The tempo comes from the host.
#[derive(Params)]
pub struct ArpParams {
    /// **Division**: step length: 1/4, 1/8, 1/16 or 1/32 notes.
    #[id = "division"]
    pub division: EnumParam<NoteDivision>,

    /// **Direction**: Up, Down, Up/Down or Random.
    #[id = "direction"]
    pub direction: EnumParam<ArpDirection>,
}

impl Default for ArpParams {
    fn default() -> Self {
        Self {
            division: EnumParam::new("Division", NoteDivision::Sixteenth),
            direction: EnumParam::new("Direction", ArpDirection::Up),
        }
    }
}

/// Arpeggiator settings for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpSnapshot {
    pub division: NoteDivision,
    pub direction: ArpDirection,
}

impl ArpParams {
    pub fn snapshot(&self) -> ArpSnapshot {
        ArpSnapshot {
            division: self.division.value(),
            direction: self.direction.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_defaults() {
        let snapshot = DelayParams::default().snapshot();

        assert_eq!(snapshot.delay_ms, 500.0);
        assert_eq!(snapshot.feedback, 0.40);
        assert_eq!(snapshot.wet, 0.50);
        assert_eq!(snapshot.dry, 0.50);
        assert_eq!(snapshot, snapshot.clamped());
    }

    #[test]
    fn test_flanger_defaults() {
        let snapshot = FlangerParams::default().snapshot();

        assert_eq!(snapshot, FlangerParameters::default());
        assert_eq!(snapshot, snapshot.clamped());
    }

    #[test]
    fn test_filter_defaults() {
        let snapshot = FilterParams::default().snapshot();

        assert_eq!(snapshot.cutoff_hz, 1000.0);
        assert_eq!(snapshot.mode, FilterMode::LowPass);
    }

    #[test]
    fn test_arp_defaults() {
        let snapshot = ArpParams::default().snapshot();

        assert_eq!(snapshot.division, NoteDivision::Sixteenth);
        assert_eq!(snapshot.direction, ArpDirection::Up);
    }

    #[test]
    fn test_meter_smoothing_default() {
        assert_eq!(
            DelayParams::default().meter.smoothing.value(),
            DEFAULT_SMOOTHING
        );
        assert_eq!(
            FilterParams::default().meter.smoothing.value(),
            DEFAULT_SMOOTHING
        );
    }

    /// The feedback knob can't reach the unstable region.
    #[test]
    fn test_feedback_range_matches_core_limit() {
        let params = DelayParams::default();
        assert_eq!(params.feedback.preview_plain(1.0), MAX_FEEDBACK);
    }
}
