//! Compact score format
//!
//! A song is a static list of notes plus a tempo. Time is counted in
//! ticks of one sixteenth note. Each note says how long it sounds and
//! how long to wait before the next one starts; a wait of 0 makes the
//! next note start in the same tick (a chord).
//!
//! Author: Moroya Sakamoto

use crate::patch::SoundPreset;

/// Note lengths in ticks
pub const SIXTEENTH: u16 = 1;
pub const EIGHTH: u16 = 2;
pub const QUARTER: u16 = 4;
pub const HALF: u16 = 8;
pub const WHOLE: u16 = 16;

/// One score entry, 8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MusicNote {
    /// Frequency in Hz, 0 = rest
    pub pitch: u16,
    /// Sounding length in ticks
    pub duration: u16,
    /// Ticks to wait before the next entry (0 = chord with the next)
    pub advance: u16,
    /// Instrument for this note
    pub preset: SoundPreset,
}

impl MusicNote {
    pub const fn new(pitch: u16, duration: u16, advance: u16, preset: SoundPreset) -> Self {
        Self {
            pitch,
            duration,
            advance,
            preset,
        }
    }

    /// Silence that still holds the sequencer for `advance` ticks
    pub const fn rest(advance: u16) -> Self {
        Self::new(0, advance, advance, SoundPreset::Default)
    }

    pub const fn is_rest(&self) -> bool {
        self.pitch == 0
    }
}

/// Complete song: notes + tempo
#[derive(Debug, Clone, Copy)]
pub struct Song {
    pub notes: &'static [MusicNote],
    /// Tempo in beats per minute
    pub bpm: u8,
}

impl Song {
    pub const fn new(notes: &'static [MusicNote], bpm: u8) -> Self {
        Self { notes, bpm }
    }

    pub const fn len(&self) -> usize {
        self.notes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total length in ticks, i.e. the sum of all advances
    pub fn total_ticks(&self) -> u32 {
        self.notes.iter().map(|n| n.advance as u32).sum()
    }

    /// Approximate length in milliseconds at the song's own tempo
    pub fn duration_ms(&self) -> u32 {
        if self.bpm == 0 {
            return 0;
        }
        self.total_ticks() * 15_000 / self.bpm as u32
    }
}
