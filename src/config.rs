//! Engine configuration
//!
//! Author: Moroya Sakamoto

use crate::error::SynthError;
use crate::patch::SoundPreset;

/// Lowest sample rate the timer seam is expected to honour
pub const MIN_SAMPLE_RATE: u32 = 1_000;
/// Highest sample rate; beyond this the per-sample budget is unrealistic
pub const MAX_SAMPLE_RATE: u32 = 96_000;

/// Sample rate assumed when nothing else is known (25 µs per sample)
pub const DEFAULT_SAMPLE_RATE: u32 = 40_000;
/// Echo buffer length in samples (200 ms at the default rate)
pub const DEFAULT_ECHO_CAPACITY: usize = 8_000;

/// Static engine settings, fixed for the lifetime of a [`Synth`](crate::Synth)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    /// Audio sample rate in Hz; also the timer interrupt rate
    pub sample_rate: u32,
    /// Capacity of the echo delay line in samples
    pub echo_capacity: usize,
    /// Preset selected at init
    pub default_preset: SoundPreset,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            echo_capacity: DEFAULT_ECHO_CAPACITY,
            default_preset: SoundPreset::Default,
        }
    }
}

impl SynthConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_echo_capacity(mut self, echo_capacity: usize) -> Self {
        self.echo_capacity = echo_capacity;
        self
    }

    pub fn with_default_preset(mut self, preset: SoundPreset) -> Self {
        self.default_preset = preset;
        self
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        if self.echo_capacity == 0 {
            return Err(SynthError::EmptyEchoBuffer);
        }
        Ok(())
    }

    /// Timer period in microseconds
    #[inline]
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.sample_rate.max(1)
    }

    /// Convert milliseconds to a sample count at this rate
    #[inline]
    pub fn samples_for_ms(&self, ms: u32) -> u32 {
        samples_for_ms(ms, self.sample_rate)
    }
}

/// `ms * sample_rate / 1000` with a wide intermediate, saturating at `u32::MAX`
#[inline]
pub fn samples_for_ms(ms: u32, sample_rate: u32) -> u32 {
    let samples = ms as u64 * sample_rate as u64 / 1000;
    samples.min(u32::MAX as u64) as u32
}
