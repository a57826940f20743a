//! Sequencer — walks a [`Song`] in sixteenth-note ticks
//!
//! Advanced once per audio sample from the same interrupt that runs
//! the mixer. Tick length is derived from the tempo once, when the
//! tempo changes, so the per-sample path never divides.
//!
//! Author: Moroya Sakamoto

use crate::config::DEFAULT_SAMPLE_RATE;
use crate::error::SynthError;
use crate::patch::SoundPreset;
use crate::score::{MusicNote, Song};

/// Where the sequencer sends its notes
pub trait NoteSink {
    /// Select `preset` and start a note with it
    fn play_preset_note(&mut self, preset: SoundPreset, pitch: u16, duration_ms: u32);

    /// Cut every sounding voice
    fn stop_all(&mut self);
}

/// Note player state
///
/// Size: 40 bytes
#[derive(Debug, Clone)]
pub struct Sequencer {
    notes: &'static [MusicNote],
    index: usize,
    playing: bool,
    sample_rate: u32,
    bpm: u8,
    /// Samples per sixteenth note
    samples_per_tick: u32,
    /// Milliseconds per sixteenth note, rounded
    ms_per_tick: u32,
    tick_counter: u32,
    ticks_until_next_step: u16,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl Sequencer {
    pub const DEFAULT_BPM: u8 = 120;

    pub fn new(sample_rate: u32) -> Self {
        let mut seq = Self {
            notes: &[],
            index: 0,
            playing: false,
            sample_rate,
            bpm: Self::DEFAULT_BPM,
            samples_per_tick: 0,
            ms_per_tick: 0,
            tick_counter: 0,
            ticks_until_next_step: 0,
        };
        seq.apply_tempo(Self::DEFAULT_BPM);
        seq
    }

    /// Start `song` from its first note at its own tempo
    pub fn play(&mut self, song: &'static Song) -> Result<(), SynthError> {
        self.play_notes(song.notes, song.bpm)
    }

    /// Start a bare note list at `bpm`
    ///
    /// Restarts from the first note even if the same list is already
    /// playing. The first note sounds on the next sample.
    pub fn play_notes(&mut self, notes: &'static [MusicNote], bpm: u8) -> Result<(), SynthError> {
        self.set_tempo(bpm)?;
        self.notes = notes;
        self.index = 0;
        self.tick_counter = self.samples_per_tick;
        self.ticks_until_next_step = 0;
        self.playing = !notes.is_empty();
        log::debug!("sequencer: play {} notes at {} bpm", notes.len(), bpm);
        Ok(())
    }

    /// Stop playback and cut all voices
    pub fn stop(&mut self, sink: &mut impl NoteSink) {
        self.halt();
        sink.stop_all();
    }

    /// Stop playback, leaving sounding notes to finish
    pub fn halt(&mut self) {
        if self.playing {
            log::debug!("sequencer: stopped at note {}", self.index);
        }
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Change tempo; takes effect from the next tick
    pub fn set_tempo(&mut self, bpm: u8) -> Result<(), SynthError> {
        if bpm == 0 {
            return Err(SynthError::InvalidTempo);
        }
        self.apply_tempo(bpm);
        Ok(())
    }

    fn apply_tempo(&mut self, bpm: u8) {
        let bpm32 = bpm as u32;
        self.bpm = bpm;
        self.samples_per_tick = (self.sample_rate.saturating_mul(15) / bpm32).max(1);
        self.ms_per_tick = (15_000 + bpm32 / 2) / bpm32;
    }

    /// Re-derive tick length for a new engine rate
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
        self.apply_tempo(self.bpm);
    }

    pub fn bpm(&self) -> u8 {
        self.bpm
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    pub fn ms_per_tick(&self) -> u32 {
        self.ms_per_tick
    }

    /// Index of the next note to be played
    pub fn position(&self) -> usize {
        self.index
    }

    /// Advance one sample; interrupt context
    ///
    /// On a tick boundary, plays every note due now. A run of notes
    /// with `advance == 0` all start in the same tick. The loop is
    /// bounded by the song length.
    #[inline]
    pub fn advance(&mut self, sink: &mut impl NoteSink) {
        if !self.playing {
            return;
        }

        self.tick_counter += 1;
        if self.tick_counter < self.samples_per_tick {
            return;
        }
        self.tick_counter = 0;

        if self.ticks_until_next_step > 0 {
            self.ticks_until_next_step -= 1;
        }

        while self.ticks_until_next_step == 0 && self.playing {
            let Some(note) = self.notes.get(self.index) else {
                self.playing = false;
                break;
            };

            if !note.is_rest() {
                let duration_ms = note.duration as u32 * self.ms_per_tick;
                sink.play_preset_note(note.preset, note.pitch, duration_ms);
            }

            self.ticks_until_next_step = note.advance;
            self.index += 1;
        }
    }
}
