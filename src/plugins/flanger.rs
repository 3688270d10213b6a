//! # Loveless Flanger
//!
//! A short feedback delay swept by a sine LFO.

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::flanger::FlangerProcessor;
use crate::dsp::meter::{MeterReadings, RmsMeter};
use crate::params::FlangerParams;

pub struct LovelessFlanger {
    params: Arc<FlangerParams>,
    flanger: FlangerProcessor,
    /// Output level, measured after processing.
    meter: RmsMeter,
}

impl Default for LovelessFlanger {
    fn default() -> Self {
        Self {
            params: Arc::new(FlangerParams::default()),
            flanger: FlangerProcessor::new(),
            meter: RmsMeter::new(),
        }
    }
}

impl LovelessFlanger {
    /// Live output levels for an editor or any other reader thread.
    pub fn meter_readings(&self) -> Arc<MeterReadings> {
        self.meter.readings()
    }
}

impl Plugin for LovelessFlanger {
    const NAME: &'static str = "Loveless Flanger";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

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
        self.flanger
            .prepare(buffer_config.sample_rate, num_channels.get() as usize);

        nih_log!(
            "{}: {} channel(s) @ {} Hz, {} samples per line",
            Self::NAME,
            num_channels,
            self.flanger.sample_rate(),
            self.flanger.capacity()
        );

        true
    }

    fn reset(&mut self) {
        self.flanger.reset();
        self.meter.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        nih_debug_assert!(self.flanger.is_prepared(), "process() before initialize()");
        let params = self.params.snapshot();

        self.flanger.process_block(buffer.as_slice(), params);

        self.meter
            .set_smoothing(self.params.meter.smoothing.value());
        self.meter.process_block(buffer.as_slice_immutable());

        ProcessStatus::Tail(self.flanger.tail_samples(params))
    }
}

impl ClapPlugin for LovelessFlanger {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-flanger";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("An LFO-swept flanger with feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Flanger,
    ];
}

impl Vst3Plugin for LovelessFlanger {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssFlanger_v01";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Modulation];
}
