//! # Loveless Delay
//!
//! Feedback echo with independent wet and dry levels. Mono tracks get one
//! delay line, stereo tracks get two that never mix.

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::delay::DelayProcessor;
use crate::dsp::meter::{MeterReadings, RmsMeter};
use crate::params::DelayParams;

/// The delay plugin.
///
/// Parameters (`DelayParams`) are shared with the host via `Arc` and can
/// be written from any thread. The delay lines are owned exclusively by
/// the audio thread and only touched in `initialize()`, `reset()` and
/// `process()`, which the host never runs concurrently.
pub struct LovelessDelay {
    params: Arc<DelayParams>,
    delay: DelayProcessor,
    /// Output level, measured after processing.
    meter: RmsMeter,
}

impl Default for LovelessDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(DelayParams::default()),
            // Empty until initialize() tells us the channel count and
            // sample rate.
            delay: DelayProcessor::new(),
            meter: RmsMeter::new(),
        }
    }
}

impl LovelessDelay {
    /// Live output levels for an editor or any other reader thread.
    pub fn meter_readings(&self) -> Arc<MeterReadings> {
        self.meter.readings()
    }
}

impl Plugin for LovelessDelay {
    const NAME: &'static str = "Loveless Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first: most DAW tracks are stereo.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            ..AudioIOLayout::const_default()
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            ..AudioIOLayout::const_default()
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate one delay line per channel, sized for the longest delay at
    /// this sample rate. Runs again on every sample-rate or layout change.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let Some(num_channels) = audio_io_layout.main_input_channels else {
            nih_error!("{} needs an audio input", Self::NAME);
            return false;
        };
        self.meter.ensure_channels(num_channels.get() as usize);

        super::warn_on_bad_sample_rate(Self::NAME, buffer_config.sample_rate);
        self.delay
            .prepare(buffer_config.sample_rate, num_channels.get() as usize);

        nih_log!(
            "{}: {} channel(s) @ {} Hz, {} samples per line",
            Self::NAME,
            num_channels,
            self.delay.sample_rate(),
            self.delay.capacity()
        );

        true
    }

    /// Playback stopped: drop pending echoes so they don't burst out when
    /// playback resumes.
    fn reset(&mut self) {
        self.delay.reset();
        self.meter.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        nih_debug_assert!(self.delay.is_prepared(), "process() before initialize()");
        let params = self.params.snapshot();

        self.delay.process_block(buffer.as_slice(), params);

        self.meter
            .set_smoothing(self.params.meter.smoothing.value());
        self.meter.process_block(buffer.as_slice_immutable());

        // Keep getting called after the input goes silent until the echoes
        // have decayed below -60 dB.
        ProcessStatus::Tail(self.delay.tail_samples(params))
    }
}

impl ClapPlugin for LovelessDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A feedback delay with separate wet and dry levels");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for LovelessDelay {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssDelay__v002";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}
