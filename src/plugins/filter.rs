//! # Loveless Filter
//!
//! One-pole low pass, or its complementary high pass.

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::filter::OnePoleFilter;
use crate::dsp::meter::{MeterReadings, RmsMeter};
use crate::params::FilterParams;

pub struct LovelessFilter {
    params: Arc<FilterParams>,
    sample_rate: f32,
    filter: OnePoleFilter,
    /// Output level, measured after processing.
    meter: RmsMeter,
}

impl Default for LovelessFilter {
    fn default() -> Self {
        Self {
            params: Arc::new(FilterParams::default()),
            sample_rate: crate::dsp::FALLBACK_SAMPLE_RATE,
            filter: OnePoleFilter::new(),
            meter: RmsMeter::new(),
        }
    }
}

impl LovelessFilter {
    /// Live output levels for an editor or any other reader thread.
    pub fn meter_readings(&self) -> Arc<MeterReadings> {
        self.meter.readings()
    }
}

impl Plugin for LovelessFilter {
    const NAME: &'static str = "Loveless Filter";
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
        self.sample_rate = buffer_config.sample_rate;

        // Grow the state here so process() never has to.
        self.filter.ensure_channels(num_channels.get() as usize);
        self.filter
            .set_cutoff(self.params.cutoff.value(), self.sample_rate);

        true
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.meter.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        nih_debug_assert!(
            self.filter.num_channels() >= buffer.channels(),
            "filter state should be sized in initialize()"
        );
        let settings = self.params.snapshot();

        // Only recomputes the coefficients when the cutoff moved.
        self.filter.set_cutoff(settings.cutoff_hz, self.sample_rate);
        self.filter.process_block(buffer.as_slice(), settings.mode);

        self.meter
            .set_smoothing(self.params.meter.smoothing.value());
        self.meter.process_block(buffer.as_slice_immutable());

        ProcessStatus::Normal
    }
}

impl ClapPlugin for LovelessFilter {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-filter";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A one-pole low pass / high pass filter");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Filter,
    ];
}

impl Vst3Plugin for LovelessFilter {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssFilter__v01";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Filter];
}
