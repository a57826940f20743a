//! ADSR Envelope generator
//!
//! Time-triggered Attack-Decay-Sustain-Release envelope. The caller
//! supplies the note length up front; sustain counts it down and the
//! envelope releases on its own. There is no note-off.
//!
//! All levels are 16.16 fixed point in `[0, 255 << 16]`; per-sample
//! deltas are derived once at note start so the interrupt path only
//! adds and subtracts.
//!
//! Author: Moroya Sakamoto

use crate::config::samples_for_ms;
use crate::fixed::Fx16;

/// ADSR envelope template
///
/// Times are in milliseconds, sustain is an 8-bit level. Copied into a
/// voice's precomputed rates when a note starts; changing it later does
/// not touch notes already sounding.
///
/// Size: 8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adsr {
    /// Attack time in milliseconds
    pub attack_ms: u16,
    /// Decay time in milliseconds
    pub decay_ms: u16,
    /// Sustain level (0-255)
    pub sustain: u8,
    /// Release time in milliseconds
    pub release_ms: u16,
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(10, 50, 200, 100)
    }
}

impl Adsr {
    pub const fn new(attack_ms: u16, decay_ms: u16, sustain: u8, release_ms: u16) -> Self {
        Self {
            attack_ms,
            decay_ms,
            sustain,
            release_ms,
        }
    }

    /// Quick percussive envelope (good for clicks and hits)
    pub const fn percussive(attack_ms: u16, decay_ms: u16) -> Self {
        Self::new(attack_ms, decay_ms, 0, decay_ms)
    }

    /// Organ-style envelope (instant attack, full sustain)
    pub const fn organ() -> Self {
        Self::new(1, 1, 255, 10)
    }
}

/// Per-sample deltas derived from an [`Adsr`] for one note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeRates {
    pub attack: Fx16,
    pub decay: Fx16,
    pub release: Fx16,
    pub sustain_level: Fx16,
    /// Samples spent in sustain before release starts
    pub hold_samples: u32,
}

impl EnvelopeRates {
    /// Derive the rates for a note of `duration_ms` at `sample_rate`
    ///
    /// Every stage length is floored at one sample.
    pub fn derive(params: &Adsr, duration_ms: u32, sample_rate: u32) -> Self {
        let stage = |ms: u16| samples_for_ms(ms as u32, sample_rate).max(1);
        let sustain_level = Fx16::from_level(params.sustain);

        Self {
            attack: Fx16::MAX_LEVEL.per_sample(stage(params.attack_ms)),
            decay: Fx16::MAX_LEVEL
                .saturating_sub(sustain_level)
                .per_sample(stage(params.decay_ms)),
            release: sustain_level.per_sample(stage(params.release_ms)),
            sustain_level,
            hold_samples: samples_for_ms(duration_ms, sample_rate),
        }
    }
}

/// ADSR envelope state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrPhase {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Envelope state for one voice
///
/// Size: 28 bytes
#[derive(Debug, Clone)]
pub struct AdsrState {
    /// Current phase
    phase: AdsrPhase,
    /// Current output level
    level: Fx16,
    /// Deltas for the note being played
    rates: EnvelopeRates,
    /// Remaining sustain samples
    samples_until_release: u32,
}

impl Default for AdsrState {
    fn default() -> Self {
        Self::new()
    }
}

impl AdsrState {
    pub const fn new() -> Self {
        Self {
            phase: AdsrPhase::Idle,
            level: Fx16::ZERO,
            rates: EnvelopeRates {
                attack: Fx16::ZERO,
                decay: Fx16::ZERO,
                release: Fx16::ZERO,
                sustain_level: Fx16::ZERO,
                hold_samples: 0,
            },
            samples_until_release: 0,
        }
    }

    /// Start a new note from level 0
    pub fn trigger(&mut self, rates: EnvelopeRates) {
        self.rates = rates;
        self.samples_until_release = rates.hold_samples;
        self.level = Fx16::ZERO;
        self.phase = AdsrPhase::Attack;
    }

    /// Drop straight to idle, no release
    pub fn kill(&mut self) {
        self.phase = AdsrPhase::Idle;
        self.level = Fx16::ZERO;
    }

    /// Is this envelope still producing output?
    pub fn is_active(&self) -> bool {
        self.phase != AdsrPhase::Idle
    }

    /// Current output level
    pub fn level(&self) -> Fx16 {
        self.level
    }

    /// Current phase
    pub fn phase(&self) -> AdsrPhase {
        self.phase
    }

    pub fn rates(&self) -> &EnvelopeRates {
        &self.rates
    }

    /// Advance envelope by one sample
    ///
    /// Returns the new level. Reaches [`AdsrPhase::Idle`] exactly once
    /// per note, on the sample where release hits zero.
    #[inline(always)]
    pub fn next(&mut self) -> Fx16 {
        match self.phase {
            AdsrPhase::Idle => {}
            AdsrPhase::Attack => {
                self.level = self.level.saturating_add(self.rates.attack);
                if self.level >= Fx16::MAX_LEVEL {
                    self.level = Fx16::MAX_LEVEL;
                    self.phase = AdsrPhase::Decay;
                }
            }
            AdsrPhase::Decay => {
                let floor = self.rates.sustain_level.saturating_add(self.rates.decay);
                if self.level > floor {
                    self.level = self.level.saturating_sub(self.rates.decay);
                } else {
                    self.level = self.rates.sustain_level;
                    self.phase = AdsrPhase::Sustain;
                }
            }
            AdsrPhase::Sustain => {
                self.level = self.rates.sustain_level;
                self.samples_until_release = self.samples_until_release.saturating_sub(1);
                if self.samples_until_release == 0 {
                    self.phase = AdsrPhase::Release;
                }
            }
            AdsrPhase::Release => {
                if self.level > self.rates.release {
                    self.level = self.level.saturating_sub(self.rates.release);
                } else {
                    self.level = Fx16::ZERO;
                    self.phase = AdsrPhase::Idle;
                }
            }
        }
        self.level
    }
}
