//! # Arpeggiator Step Scheduler
//!
//! Turns a chord of held keys into a sequence of single notes played one
//! after another on a tempo grid.
//!
//! ## The Clock
//!
//! The scheduler counts samples. Every sample the countdown drops by one;
//! when it reaches zero a *step* fires:
//!
//! 1. the note currently sounding gets a note-off,
//! 2. the next held note is picked according to the direction,
//! 3. that note gets a note-on,
//! 4. the countdown restarts at `samples_per_step`.
//!
//! The step length follows the host tempo and the note division:
//!
//! ```text
//! samples_per_step = 60 / bpm * 4 / division * sample_rate
//!
//! 120 BPM, 1/16 notes, 48 kHz → 0.5 s * 0.25 * 48000 = 6000 samples
//! ```
//!
//! ## Picking the Next Note
//!
//! Held notes are kept sorted by pitch (then MIDI channel). Instead of
//! remembering an *index* into that list, we remember the last note we
//! played and look for its neighbour, so releasing a key mid-pattern just
//! makes the pattern skip it on the next pass.

use nih_plug::prelude::Enum;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::sanitize_sample_rate;

/// Most keys tracked at once. Storage for all of them is reserved up front
/// so pressing keys never allocates on the audio thread.
pub const MAX_HELD_NOTES: usize = 128;

/// Tempo used until (or whenever) the host doesn't report one.
pub const DEFAULT_BPM: f64 = 120.0;

const DEFAULT_SEED: u64 = 0x4C6F_7665_6C65_7373;

/// Order in which held notes are played.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpDirection {
    #[id = "up"]
    #[name = "Up"]
    Up,
    #[id = "down"]
    #[name = "Down"]
    Down,
    #[id = "updown"]
    #[name = "Up/Down"]
    UpDown,
    #[id = "random"]
    #[name = "Random"]
    Random,
}

/// Length of one arpeggio step as a fraction of a whole note.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDivision {
    #[id = "quarter"]
    #[name = "1/4"]
    Quarter,
    #[id = "eighth"]
    #[name = "1/8"]
    Eighth,
    #[id = "sixteenth"]
    #[name = "1/16"]
    Sixteenth,
    #[id = "thirtysecond"]
    #[name = "1/32"]
    ThirtySecond,
}

impl NoteDivision {
    /// Steps per whole note: 4, 8, 16 or 32.
    pub fn steps_per_whole_note(self) -> u32 {
        match self {
            NoteDivision::Quarter => 4,
            NoteDivision::Eighth => 8,
            NoteDivision::Sixteenth => 16,
            NoteDivision::ThirtySecond => 32,
        }
    }
}

/// A note event going into or coming out of the arpeggiator. `timing` is
/// the sample offset within the current block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArpEvent {
    NoteOn {
        timing: u32,
        channel: u8,
        note: u8,
        velocity: f32,
    },
    NoteOff {
        timing: u32,
        channel: u8,
        note: u8,
    },
}

impl ArpEvent {
    pub fn timing(&self) -> u32 {
        match self {
            ArpEvent::NoteOn { timing, .. } | ArpEvent::NoteOff { timing, .. } => *timing,
        }
    }

    /// The same event moved to another sample offset.
    pub fn with_timing(self, timing: u32) -> Self {
        match self {
            ArpEvent::NoteOn {
                channel,
                note,
                velocity,
                ..
            } => ArpEvent::NoteOn {
                timing,
                channel,
                note,
                velocity,
            },
            ArpEvent::NoteOff { channel, note, .. } => ArpEvent::NoteOff {
                timing,
                channel,
                note,
            },
        }
    }
}

/// An event type of the host's MIDI stream, which carries note-ons and
/// note-offs among other things.
pub trait HostEvent: Sized {
    /// Sample offset within the current block.
    fn timing(&self) -> u32;

    /// The note-on/note-off part of this event, or the event itself if the
    /// arpeggiator has no use for it.
    fn into_arp_event(self) -> Result<ArpEvent, Self>;

    fn from_arp_event(event: ArpEvent) -> Self;
}

impl HostEvent for ArpEvent {
    fn timing(&self) -> u32 {
        ArpEvent::timing(self)
    }

    fn into_arp_event(self) -> Result<ArpEvent, Self> {
        Ok(self)
    }

    fn from_arp_event(event: ArpEvent) -> Self {
        event
    }
}

/// The host side of one block: a time-ordered queue of incoming events and
/// a sink for outgoing ones.
pub trait EventPort<E> {
    fn next_event(&mut self) -> Option<E>;
    fn send_event(&mut self, event: E);
}

/// Sort key of a held note: pitch first, MIDI channel breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct NoteKey {
    note: u8,
    channel: u8,
}

#[derive(Debug, Clone, Copy)]
struct HeldNote {
    key: NoteKey,
    velocity: f32,
}

/// The arpeggiator state machine.
pub struct Arpeggiator {
    /// Keys currently held down, sorted by [`NoteKey`].
    held: Vec<HeldNote>,

    direction: ArpDirection,

    /// Travel direction of the Up/Down pattern.
    ascending: bool,

    /// The note the last step played, even if it has since been released.
    /// `None` means the pattern starts over.
    last_key: Option<NoteKey>,

    /// The note we have sent a note-on for and not yet a note-off.
    sounding: Option<NoteKey>,

    samples_per_step: u32,
    samples_until_next_step: u32,

    rng: SmallRng,
}

impl Default for Arpeggiator {
    fn default() -> Self {
        Self::new()
    }
}

impl Arpeggiator {
    /// A stopped arpeggiator playing 1/16 notes at 120 BPM and 44.1 kHz.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Same as [`new`](Self::new) with a chosen seed for Random mode.
    pub fn with_seed(seed: u64) -> Self {
        let mut arp = Self {
            held: Vec::with_capacity(MAX_HELD_NOTES),
            direction: ArpDirection::Up,
            ascending: true,
            last_key: None,
            sounding: None,
            samples_per_step: 1,
            samples_until_next_step: 1,
            rng: SmallRng::seed_from_u64(seed),
        };
        arp.set_timing(
            DEFAULT_BPM,
            super::FALLBACK_SAMPLE_RATE,
            NoteDivision::Sixteenth,
        );
        arp.samples_until_next_step = arp.samples_per_step;
        arp
    }

    pub fn set_direction(&mut self, direction: ArpDirection) {
        self.direction = direction;
    }

    pub fn direction(&self) -> ArpDirection {
        self.direction
    }

    /// Recompute the step length from tempo, sample rate and division.
    ///
    /// A missing or nonsensical tempo means 120 BPM; a bad sample rate
    /// means 44.1 kHz. If the step in progress is longer than the new step
    /// length it is shortened so a tempo jump takes effect right away.
    pub fn set_timing(&mut self, bpm: f64, sample_rate: f32, division: NoteDivision) {
        let bpm = if bpm.is_finite() && bpm > 0.0 {
            bpm
        } else {
            DEFAULT_BPM
        };
        let sample_rate = sanitize_sample_rate(sample_rate) as f64;

        let beat_seconds = 60.0 / bpm;
        let step_seconds = beat_seconds * 4.0 / division.steps_per_whole_note() as f64;
        self.samples_per_step = (step_seconds * sample_rate)
            .round()
            .clamp(1.0, u32::MAX as f64) as u32;

        if self.samples_until_next_step > self.samples_per_step {
            self.samples_until_next_step = self.samples_per_step;
        }
    }

    pub fn samples_per_step(&self) -> u32 {
        self.samples_per_step
    }

    /// Number of keys currently held.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// A key went down. Nothing is emitted here; the note is picked up by
    /// the next step. If nothing is sounding that step fires immediately
    /// instead of waiting for the grid.
    ///
    /// Repeated note-ons for a key that is already held are ignored, as are
    /// keys beyond [`MAX_HELD_NOTES`].
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        let key = NoteKey { note, channel };

        if let Err(position) = self.held.binary_search_by(|held| held.key.cmp(&key)) {
            if self.held.len() < MAX_HELD_NOTES {
                self.held.insert(position, HeldNote { key, velocity });
            }
        }

        if self.sounding.is_none() {
            self.samples_until_next_step = 0;
        }
    }

    /// A key went up. If it is the note sounding right now, its note-off is
    /// emitted at `timing`. Releasing the last key restarts the pattern.
    pub fn note_off(
        &mut self,
        timing: u32,
        channel: u8,
        note: u8,
        emit: &mut impl FnMut(ArpEvent),
    ) {
        let key = NoteKey { note, channel };

        if let Ok(position) = self.held.binary_search_by(|held| held.key.cmp(&key)) {
            self.held.remove(position);
        }

        if self.sounding == Some(key) {
            self.turn_off_sounding(timing, emit);
        }

        if self.held.is_empty() {
            self.last_key = None;
            self.ascending = true;
        }
    }

    /// Feed one incoming event. A note-on with zero velocity counts as a
    /// note-off, as in running-status MIDI.
    pub fn handle_event(&mut self, event: ArpEvent, emit: &mut impl FnMut(ArpEvent)) {
        match event {
            ArpEvent::NoteOn {
                timing,
                channel,
                note,
                velocity,
            } => {
                if velocity > 0.0 {
                    self.note_on(channel, note, velocity);
                } else {
                    self.note_off(timing, channel, note, emit);
                }
            }
            ArpEvent::NoteOff {
                timing,
                channel,
                note,
            } => self.note_off(timing, channel, note, emit),
        }
    }

    /// Advance the clock by one sample at offset `timing`, firing a step if
    /// the countdown runs out.
    pub fn tick(&mut self, timing: u32, emit: &mut impl FnMut(ArpEvent)) {
        self.samples_until_next_step = self.samples_until_next_step.saturating_sub(1);
        if self.samples_until_next_step > 0 {
            return;
        }
        self.samples_until_next_step = self.samples_per_step;

        let Some(index) = self.next_index() else {
            return;
        };
        let next = self.held[index];

        self.turn_off_sounding(timing, emit);
        emit(ArpEvent::NoteOn {
            timing,
            channel: next.key.channel,
            note: next.key.note,
            velocity: next.velocity,
        });
        self.sounding = Some(next.key);
        self.last_key = Some(next.key);
    }

    /// Run a whole block against the host's event stream.
    ///
    /// Incoming events are applied at their own sample offset, interleaved
    /// with the per-sample clock, so everything sent to `port` comes out
    /// in time order. Events the arpeggiator doesn't consume (CCs, pitch
    /// bend, ...) are passed through at their original timing.
    ///
    /// Note events timed at or after `num_samples` are applied after the
    /// last sample; a note-on among them starts playing at sample 0 of the
    /// next block.
    pub fn process_block<E: HostEvent>(&mut self, num_samples: u32, port: &mut impl EventPort<E>) {
        let mut pending = port.next_event();

        for sample in 0..num_samples {
            while let Some(event) = pending.take() {
                if event.timing() > sample {
                    pending = Some(event);
                    break;
                }
                self.route(event, None, port);
                pending = port.next_event();
            }

            self.tick(sample, &mut |out| port.send_event(E::from_arp_event(out)));
        }

        // Anything the host timed past the end of the block.
        let last_sample = num_samples.saturating_sub(1);
        while let Some(event) = pending {
            self.route(event, Some(last_sample), port);
            pending = port.next_event();
        }
    }

    /// Hand a note event to the scheduler or pass anything else through.
    /// With `late_timing` set, note events are moved to that offset first.
    fn route<E: HostEvent>(
        &mut self,
        event: E,
        late_timing: Option<u32>,
        port: &mut impl EventPort<E>,
    ) {
        match event.into_arp_event() {
            Ok(note) => {
                let note = match late_timing {
                    Some(timing) => note.with_timing(timing),
                    None => note,
                };
                self.handle_event(note, &mut |out| port.send_event(E::from_arp_event(out)));
            }
            Err(other) => port.send_event(other),
        }
    }

    /// Silence the sounding note and forget every held key, e.g. when the
    /// transport stops.
    pub fn all_notes_off(&mut self, timing: u32, emit: &mut impl FnMut(ArpEvent)) {
        self.turn_off_sounding(timing, emit);
        self.held.clear();
        self.last_key = None;
        self.ascending = true;
    }

    /// Forget all state without emitting anything. The host is expected to
    /// have silenced its own voices already.
    pub fn reset(&mut self) {
        self.held.clear();
        self.last_key = None;
        self.sounding = None;
        self.ascending = true;
        self.samples_until_next_step = self.samples_per_step;
    }

    fn turn_off_sounding(&mut self, timing: u32, emit: &mut impl FnMut(ArpEvent)) {
        if let Some(key) = self.sounding.take() {
            emit(ArpEvent::NoteOff {
                timing,
                channel: key.channel,
                note: key.note,
            });
        }
    }

    /// Index into `held` of the note the next step should play.
    fn next_index(&mut self) -> Option<usize> {
        let len = self.held.len();
        if len == 0 {
            return None;
        }

        if self.direction == ArpDirection::Random {
            return Some(self.rng.random_range(0..len));
        }

        let Some(last) = self.last_key else {
            return Some(match self.direction {
                ArpDirection::Down => len - 1,
                _ => {
                    self.ascending = true;
                    0
                }
            });
        };

        // Neighbours of the last played note. It may have been released,
        // so search by key rather than trusting any stored index.
        let first_above = self.held.partition_point(|held| held.key <= last);
        let above = (first_above < len).then_some(first_above);
        let below = self
            .held
            .partition_point(|held| held.key < last)
            .checked_sub(1);

        let index = match self.direction {
            ArpDirection::Up => above.unwrap_or(0),
            ArpDirection::Down => below.unwrap_or(len - 1),
            _ => {
                let (forward, backward) = if self.ascending {
                    (above, below)
                } else {
                    (below, above)
                };

                match (forward, backward) {
                    (Some(index), _) => index,
                    (None, Some(index)) => {
                        self.ascending = !self.ascending;
                        index
                    }
                    // Only the last note itself is left.
                    (None, None) => 0,
                }
            }
        };

        Some(index)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
