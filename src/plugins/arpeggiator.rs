//! # Loveless Arp
//!
//! A MIDI effect: held chords come out as single notes stepped on the host
//! tempo grid. Audio is not touched; anything that isn't a note-on or
//! note-off (CCs, pitch bend, ...) passes straight through.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::arpeggiator::{ArpEvent, Arpeggiator, EventPort, HostEvent, DEFAULT_BPM};
use crate::params::ArpParams;

pub struct LovelessArp {
    params: Arc<ArpParams>,
    sample_rate: f32,
    arpeggiator: Arpeggiator,
}

impl Default for LovelessArp {
    fn default() -> Self {
        Self {
            params: Arc::new(ArpParams::default()),
            sample_rate: crate::dsp::FALLBACK_SAMPLE_RATE,
            arpeggiator: Arpeggiator::new(),
        }
    }
}

impl HostEvent for NoteEvent<()> {
    fn timing(&self) -> u32 {
        NoteEvent::timing(self)
    }

    fn into_arp_event(self) -> Result<ArpEvent, Self> {
        match self {
            NoteEvent::NoteOn {
                timing,
                channel,
                note,
                velocity,
                ..
            } => Ok(ArpEvent::NoteOn {
                timing,
                channel,
                note,
                velocity,
            }),
            NoteEvent::NoteOff {
                timing,
                channel,
                note,
                ..
            } => Ok(ArpEvent::NoteOff {
                timing,
                channel,
                note,
            }),
            other => Err(other),
        }
    }

    fn from_arp_event(event: ArpEvent) -> Self {
        match event {
            ArpEvent::NoteOn {
                timing,
                channel,
                note,
                velocity,
            } => NoteEvent::NoteOn {
                timing,
                voice_id: None,
                channel,
                note,
                velocity,
            },
            ArpEvent::NoteOff {
                timing,
                channel,
                note,
            } => NoteEvent::NoteOff {
                timing,
                voice_id: None,
                channel,
                note,
                velocity: 0.0,
            },
        }
    }
}

/// The process context seen as the arpeggiator's event queue and sink.
struct ContextPort<'a, C> {
    context: &'a mut C,
}

impl<C: ProcessContext<LovelessArp>> EventPort<NoteEvent<()>> for ContextPort<'_, C> {
    fn next_event(&mut self) -> Option<NoteEvent<()>> {
        self.context.next_event()
    }

    fn send_event(&mut self, event: NoteEvent<()>) {
        self.context.send_event(event);
    }
}

impl Plugin for LovelessArp {
    const NAME: &'static str = "Loveless Arp";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // No audio ports: this is a pure note effect.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: None,
        main_output_channels: None,
        ..AudioIOLayout::const_default()
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::Basic;
    const MIDI_OUTPUT: MidiConfig = MidiConfig::Basic;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        super::warn_on_bad_sample_rate(Self::NAME, buffer_config.sample_rate);
        self.sample_rate = buffer_config.sample_rate;

        let settings = self.params.snapshot();
        self.arpeggiator
            .set_timing(DEFAULT_BPM, self.sample_rate, settings.division);

        nih_log!(
            "{}: {} samples per step at {} BPM",
            Self::NAME,
            self.arpeggiator.samples_per_step(),
            DEFAULT_BPM
        );

        true
    }

    fn reset(&mut self) {
        self.arpeggiator.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let settings = self.params.snapshot();
        let bpm = context.transport().tempo.unwrap_or(DEFAULT_BPM);

        self.arpeggiator.set_direction(settings.direction);
        self.arpeggiator
            .set_timing(bpm, self.sample_rate, settings.division);

        let num_samples = buffer.samples() as u32;
        self.arpeggiator
            .process_block(num_samples, &mut ContextPort { context });

        ProcessStatus::Normal
    }
}

impl ClapPlugin for LovelessArp {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-arp";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A tempo-synced MIDI arpeggiator");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[ClapFeature::NoteEffect, ClapFeature::Utility];
}

impl Vst3Plugin for LovelessArp {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssArp_____v01";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Tools];
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::dsp::arpeggiator::{ArpDirection, NoteDivision};

    /// Stands in for the host: a queue of incoming events and a log of
    /// everything sent back.
    struct FakeHost {
        incoming: VecDeque<NoteEvent<()>>,
        sent: Vec<NoteEvent<()>>,
    }

    impl FakeHost {
        fn new(events: &[NoteEvent<()>]) -> Self {
            Self {
                incoming: events.iter().copied().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl EventPort<NoteEvent<()>> for FakeHost {
        fn next_event(&mut self) -> Option<NoteEvent<()>> {
            self.incoming.pop_front()
        }

        fn send_event(&mut self, event: NoteEvent<()>) {
            self.sent.push(event);
        }
    }

    /// One step every 4 samples.
    fn arpeggiator() -> Arpeggiator {
        let mut arp = Arpeggiator::new();
        arp.set_timing(60.0, 4.0, NoteDivision::Quarter);
        arp.set_direction(ArpDirection::Up);
        arp
    }

    fn key_down(timing: u32, note: u8) -> NoteEvent<()> {
        NoteEvent::NoteOn {
            timing,
            voice_id: None,
            channel: 0,
            note,
            velocity: 0.8,
        }
    }

    fn key_up(timing: u32, note: u8) -> NoteEvent<()> {
        NoteEvent::NoteOff {
            timing,
            voice_id: None,
            channel: 0,
            note,
            velocity: 0.0,
        }
    }

    fn mod_wheel(timing: u32) -> NoteEvent<()> {
        NoteEvent::MidiCC {
            timing,
            channel: 0,
            cc: 1,
            value: 0.5,
        }
    }

    #[test]
    fn test_note_events_survive_conversion() {
        let on = NoteEvent::NoteOn {
            timing: 12,
            voice_id: Some(3),
            channel: 2,
            note: 64,
            velocity: 0.7,
        };
        let arp_event = on.into_arp_event();
        assert_eq!(
            arp_event,
            Ok(ArpEvent::NoteOn {
                timing: 12,
                channel: 2,
                note: 64,
                velocity: 0.7
            })
        );

        let back = arp_event.map(<NoteEvent<()>>::from_arp_event);
        assert_eq!(
            back,
            Ok(NoteEvent::NoteOn {
                timing: 12,
                voice_id: None,
                channel: 2,
                note: 64,
                velocity: 0.7
            })
        );
    }

    #[test]
    fn test_other_events_are_handed_back() {
        assert_eq!(mod_wheel(0).into_arp_event(), Err(mod_wheel(0)));
    }

    /// A CC between two steps passes through at its own offset, in order
    /// with the generated notes.
    #[test]
    fn test_cc_passes_through_in_time_order() {
        let mut arp = arpeggiator();
        let mut host = FakeHost::new(&[key_down(0, 60), key_down(0, 64), mod_wheel(3)]);

        arp.process_block(8, &mut host);

        assert_eq!(
            host.sent,
            vec![
                key_down(0, 60),
                mod_wheel(3),
                key_up(4, 60),
                key_down(4, 64),
            ]
        );
    }

    /// A key pressed at the very end of a block is played at sample 0 of
    /// the next block.
    #[test]
    fn test_note_on_past_block_end_plays_next_block() {
        let mut arp = arpeggiator();

        let mut host = FakeHost::new(&[key_down(8, 67)]);
        arp.process_block(8, &mut host);
        assert!(host.sent.is_empty());

        let mut host = FakeHost::new(&[]);
        arp.process_block(8, &mut host);
        assert_eq!(host.sent.first(), Some(&key_down(0, 67)));
    }

    /// VST3 hosts must list the arpeggiator among effects, not instruments.
    #[test]
    fn test_vst3_category_is_effect() {
        let categories = LovelessArp::VST3_SUBCATEGORIES;

        assert!(categories.iter().any(|c| matches!(c, Vst3SubCategory::Fx)));
        assert!(!categories
            .iter()
            .any(|c| matches!(c, Vst3SubCategory::Instrument)));
    }
}
