//! Feedback cues — short fixed sounds for prop interactions
//!
//! Each cue carries its own waveform and envelope; playing one
//! replaces the current waveform/ADSR, so reselect a preset afterwards
//! if a song or melody should keep its own sound.
//!
//! Author: Moroya Sakamoto

use crate::envelope::Adsr;
use crate::notes::{A4, C4, C5, GS4, KEYPAD_SCALE};
use crate::oscillator::Waveform;

/// Built-in cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Selection accepted
    Confirm,
    /// Moved to the next option
    Cycle,
    /// Left a menu
    Exit,
    /// Neutral tick
    Beep,
    /// Rejected input
    Error,
    /// Keypad key, pitched along [`KEYPAD_SCALE`]; wraps past the last key
    Key(u8),
}

/// What a cue plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueSpec {
    pub waveform: Waveform,
    pub envelope: Adsr,
    pub pitch: u16,
    pub duration_ms: u32,
    pub volume: u8,
}

impl Cue {
    pub fn spec(self) -> CueSpec {
        let (waveform, envelope, pitch, duration_ms, volume) = match self {
            Cue::Confirm => (Waveform::Triangle, Adsr::new(10, 20, 250, 250), A4, 300, 250),
            Cue::Cycle => (Waveform::Triangle, Adsr::new(5, 120, 100, 180), GS4, 300, 250),
            Cue::Exit => (Waveform::Sine, Adsr::new(5, 50, 80, 100), C5, 100, 150),
            Cue::Beep => (Waveform::Square, Adsr::new(1, 10, 20, 20), A4, 50, 100),
            Cue::Error => (Waveform::Square, Adsr::new(1, 10, 20, 20), C4, 100, 100),
            Cue::Key(index) => (
                Waveform::Sine,
                Adsr::new(5, 50, 100, 100),
                KEYPAD_SCALE[index as usize % KEYPAD_SCALE.len()],
                150,
                100,
            ),
        };
        CueSpec {
            waveform,
            envelope,
            pitch,
            duration_ms,
            volume,
        }
    }
}
