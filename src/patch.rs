//! Instrument patch definitions
//!
//! A patch is a named bundle of waveform, ADSR template and echo-send
//! default. The table is immutable and indexed by [`SoundPreset`];
//! selecting a preset only changes what the *next* note sounds like.
//!
//! Author: Moroya Sakamoto

use crate::envelope::Adsr;
use crate::error::SynthError;
use crate::oscillator::Waveform;

/// Built-in instrument id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SoundPreset {
    #[default]
    Default = 0,
    Pluck = 1,
    Flute = 2,
    SynthLead = 3,
    Piano = 4,
    Organ = 5,
    Percussion = 6,
}

impl SoundPreset {
    pub const ALL: [SoundPreset; 7] = [
        Self::Default,
        Self::Pluck,
        Self::Flute,
        Self::SynthLead,
        Self::Piano,
        Self::Organ,
        Self::Percussion,
    ];

    /// Patch parameters for this preset
    ///
    /// Infallible: the enum can only name rows that exist.
    #[inline(always)]
    pub fn params(self) -> &'static Patch {
        &PATCHES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.params().name
    }
}

impl TryFrom<u8> for SoundPreset {
    type Error = SynthError;

    /// Checked lookup for ids arriving from outside (bus frames, config)
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(SynthError::UnknownPreset(id))
    }
}

/// One row of the preset table
///
/// Size: 16 bytes + name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub name: &'static str,
    /// Oscillator waveform
    pub waveform: Waveform,
    /// Amplitude envelope
    pub envelope: Adsr,
    /// Whether notes feed the echo unit by default
    pub echo_send: bool,
}

impl Patch {
    pub const fn new(name: &'static str, waveform: Waveform, envelope: Adsr, echo_send: bool) -> Self {
        Self {
            name,
            waveform,
            envelope,
            echo_send,
        }
    }
}

/// Rows in [`SoundPreset`] discriminant order
static PATCHES: [Patch; 7] = [
    Patch::new("default", Waveform::Sine, Adsr::new(10, 50, 200, 100), false),
    Patch::new("pluck", Waveform::Triangle, Adsr::new(2, 150, 40, 80), true),
    Patch::new("flute", Waveform::Sine, Adsr::new(60, 80, 180, 150), true),
    Patch::new("synth lead", Waveform::Sawtooth, Adsr::new(5, 60, 170, 120), true),
    Patch::new("piano", Waveform::Triangle, Adsr::new(3, 250, 90, 200), false),
    Patch::new("organ", Waveform::Square, Adsr::organ(), false),
    Patch::new("percussion", Waveform::Noise, Adsr::percussive(1, 60), false),
];
