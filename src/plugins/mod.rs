//! # Plugin Wrappers
//!
//! Each plugin here is the thin host-facing half of one DSP processor:
//! it reads a parameter snapshot per block, hands the audio (or MIDI) to
//! the processor in `crate::dsp`, and reports format metadata.

mod arpeggiator;
mod delay;
mod filter;
mod flanger;

pub use arpeggiator::LovelessArp;
pub use delay::LovelessDelay;
pub use filter::LovelessFilter;
pub use flanger::LovelessFlanger;

use nih_plug::prelude::*;

/// Log when the host hands us a sample rate the DSP code will replace
/// with its 44.1 kHz fallback.
fn warn_on_bad_sample_rate(plugin: &str, sample_rate: f32) {
    if crate::dsp::sanitize_sample_rate(sample_rate) != sample_rate {
        nih_warn!(
            "{plugin}: host reported a sample rate of {sample_rate} Hz, using {} Hz",
            crate::dsp::FALLBACK_SAMPLE_RATE
        );
    }
}
