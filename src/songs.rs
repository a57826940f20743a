//! Built-in songs
//!
//! Author: Moroya Sakamoto

use crate::notes::*;
use crate::patch::SoundPreset::{self, Flute, Organ, Piano, Pluck, SynthLead};
use crate::score::{MusicNote, Song, EIGHTH, HALF, QUARTER, SIXTEENTH, WHOLE};

const fn n(pitch: u16, duration: u16, advance: u16, preset: SoundPreset) -> MusicNote {
    MusicNote::new(pitch, duration, advance, preset)
}

/// Startup jingle: rising C major arpeggio
pub static INTRO: Song = Song::new(
    &[
        n(C4, EIGHTH, EIGHTH, Pluck),
        n(E4, EIGHTH, EIGHTH, Pluck),
        n(G4, EIGHTH, EIGHTH, Pluck),
        n(C5, HALF, HALF, Flute),
    ],
    120,
);

/// Puzzle solved: fanfare, a breath, then a C major chord
pub static SUCCESS: Song = Song::new(
    &[
        n(C5, SIXTEENTH, SIXTEENTH, SynthLead),
        n(E5, SIXTEENTH, SIXTEENTH, SynthLead),
        n(G5, SIXTEENTH, SIXTEENTH, SynthLead),
        n(C6, QUARTER, QUARTER, SynthLead),
        n(REST, QUARTER, 0, SoundPreset::Default),
        n(C4, HALF, 0, Piano),
        n(E4, HALF, 0, Piano),
        n(G4, HALF, HALF, Piano),
    ],
    150,
);

/// Wrong answer: falling tritone
pub static ERROR: Song = Song::new(
    &[n(G3, QUARTER, QUARTER, Organ), n(CS3, HALF, HALF, Organ)],
    100,
);

/// Three bars of chords under a flute line, ending on C major
pub static DEMO: Song = Song::new(
    &[
        // C major under an ascending line
        n(C3, WHOLE, 0, Piano),
        n(E3, WHOLE, 0, Piano),
        n(G3, WHOLE, 0, Piano),
        n(C5, QUARTER, QUARTER, Flute),
        n(D5, QUARTER, QUARTER, Flute),
        n(E5, QUARTER, QUARTER, Flute),
        n(F5, QUARTER, QUARTER, Flute),
        // G major, line falls back
        n(G2, WHOLE, 0, Piano),
        n(B2, WHOLE, 0, Piano),
        n(D3, WHOLE, 0, Piano),
        n(G5, QUARTER, QUARTER, Flute),
        n(F5, QUARTER, QUARTER, Flute),
        n(E5, QUARTER, QUARTER, Flute),
        n(D5, QUARTER, QUARTER, Flute),
        // A minor with an eighth-note run
        n(A2, WHOLE, 0, Piano),
        n(C3, WHOLE, 0, Piano),
        n(E3, WHOLE, 0, Piano),
        n(C6, EIGHTH, EIGHTH, Flute),
        n(B5, EIGHTH, EIGHTH, Flute),
        n(A5, EIGHTH, EIGHTH, Flute),
        n(G5, EIGHTH, EIGHTH, Flute),
        n(F5, EIGHTH, EIGHTH, Flute),
        n(E5, EIGHTH, EIGHTH, Flute),
        n(D5, EIGHTH, EIGHTH, Flute),
        n(C5, EIGHTH, EIGHTH, Flute),
        // Final chord
        n(C3, HALF, 0, Piano),
        n(E3, HALF, 0, Piano),
        n(G3, HALF, 0, Piano),
        n(C4, HALF, HALF, Piano),
        n(REST, QUARTER, QUARTER, SoundPreset::Default),
    ],
    100,
);

pub static ALL: [&Song; 4] = [&INTRO, &SUCCESS, &ERROR, &DEMO];
