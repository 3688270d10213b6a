//! # Loveless FX: Delay, Flanger, Filter and Arpeggiator Plugins
//!
//! A small bundle of effect plugins built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug) for learning DSP
//! fundamentals. One library exports all four as CLAP and VST3, and as
//! Audio Units through clap-wrapper. Every algorithm is implemented from
//! scratch in [`dsp`]; the plugin wrappers only move parameters and
//! buffers around.
//!
//! | Plugin | Processor | What it does |
//! |---|---|---|
//! | Loveless Delay | `dsp::delay::DelayProcessor` | feedback echo, mono or stereo |
//! | Loveless Flanger | `dsp::flanger::FlangerProcessor` | LFO-swept short delay |
//! | Loveless Filter | `dsp::filter::OnePoleFilter` | one-pole low/high pass |
//! | Loveless Arp | `dsp::arpeggiator::Arpeggiator` | MIDI step sequencer |
//!
//! ## Delay Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────── × dry ───┐
//!         │                                                  │
//!         │    ┌──────────────── FEEDBACK LOOP ─────────┐    │
//!         │    │                                        │    │
//!         └──►(+)──► [Ring Buffer / Delay Line] ──┬─────┘    │
//!              ▲      (stores & retrieves past    │          │
//!              │       samples after N ms)        │          │
//!              └──────────── × feedback ◄─────────┤          │
//!                                                 │          │
//!                                                 └── × wet ►(+)──► Output
//! ```
//!
//! The flanger is the same loop with the delay time swept by an LFO.
//!
//! ## Threads
//!
//! Parameters are written by the host from any thread and read by the
//! audio thread once per block as a plain snapshot struct. All DSP state
//! (delay lines, filter memory, held notes) belongs to the audio thread
//! and is sized in `initialize()`, so `process()` never allocates.
//!
//! The audio plugins also meter their output. The smoothed RMS of each
//! channel is stored into atomics that any other thread can read through
//! `meter_readings()`.

pub mod dsp;
mod params;
pub mod plugins;

use nih_plug::prelude::*;
use plugins::{LovelessArp, LovelessDelay, LovelessFilter, LovelessFlanger};

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// These generate the C entry points the host uses to discover the
// plugins: `clap_entry` for CLAP and `GetPluginFactory` for VST3. Both
// factories list all four plugins.

nih_export_clap!(LovelessDelay, LovelessFlanger, LovelessFilter, LovelessArp);
nih_export_vst3!(LovelessDelay, LovelessFlanger, LovelessFilter, LovelessArp);

// Wrap the CLAP factory into AUv2 for Logic Pro, which only loads Audio
// Units.
clap_wrapper::export_auv2!();
