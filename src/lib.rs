//! propsynth — Real-time polyphonic synth for prop controllers
//!
//! Four-voice fixed-point synthesizer meant to run inside a periodic
//! timer interrupt:
//! - DDS oscillators (sine/square/triangle/saw/noise) in integer math
//! - Time-triggered ADSR envelopes, 16.16 fixed point
//! - Shared echo line, one-pole smoothing, complementary PWM output
//! - Tick-based sequencer with chords, built-in songs and cues
//! - no_std + alloc; the echo buffer is the only allocation
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod config;
pub mod cues;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod fixed;
pub mod notes;
pub mod oscillator;
pub mod output;
pub mod patch;
pub mod score;
pub mod sequencer;
pub mod shared;
pub mod songs;
pub mod synth;

pub use config::SynthConfig;
pub use cues::{Cue, CueSpec};
pub use effects::{Echo, EchoParams, Effect, Smoother};
pub use envelope::{Adsr, AdsrPhase, AdsrState};
pub use error::SynthError;
pub use fixed::Fx16;
pub use oscillator::{Oscillator, Waveform};
pub use output::{OutputStage, PwmPair};
pub use patch::{Patch, SoundPreset};
pub use score::{MusicNote, Song};
pub use sequencer::{NoteSink, Sequencer};
pub use shared::{SampleTimer, SharedSynth};
pub use synth::{Synth, Tone, Voice, VoiceBank, MAX_VOICES};
