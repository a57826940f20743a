//! DSP effects — integer, allocation-free after construction
//!
//! Echo = one shared circular buffer of 8-bit samples fed by the voices
//! that opted into the echo send. Smoother = one-pole low-pass on the
//! final output to take the edge off 8-bit steps and power-up clicks.
//!
//! Author: Moroya Sakamoto

use alloc::vec;
use alloc::vec::Vec;

use crate::config::samples_for_ms;
use crate::oscillator::CENTER;

/// Effect trait
pub trait Effect {
    /// Process one signed sample (mono)
    fn process(&mut self, input: i32) -> i32;

    /// Reset internal state
    fn reset(&mut self);
}

/// Clip to the signed 8-bit range
#[inline(always)]
pub fn clip_i8(x: i32) -> i32 {
    x.clamp(i8::MIN as i32, i8::MAX as i32)
}

/// Echo parameters as set by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoParams {
    pub enabled: bool,
    pub delay_ms: u16,
    /// Feedback amount, 0-255 of 256
    pub feedback: u8,
    /// Wet level, 0-255 of 256
    pub mix: u8,
}

/// Echo effect: circular buffer with feedback
///
/// Samples are stored offset by 128. The input to [`Effect::process`] is
/// the echo send sum for the current sample; the output is the wet
/// contribution to add to the dry mix.
///
/// Size: 16 bytes params + buffer
pub struct Echo {
    buffer: Vec<u8>,
    write_pos: usize,
    params: EchoParams,
    /// `delay_ms` converted once at configure time, in `[1, capacity]`
    delay_samples: usize,
}

impl Echo {
    /// Allocate the delay line; the only allocation the engine makes
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![CENTER; capacity.max(1)],
            write_pos: 0,
            params: EchoParams::default(),
            delay_samples: 1,
        }
    }

    pub fn configure(&mut self, params: EchoParams, sample_rate: u32) {
        let samples = samples_for_ms(params.delay_ms as u32, sample_rate) as usize;
        self.delay_samples = samples.clamp(1, self.capacity());
        self.params = params;
    }

    pub fn params(&self) -> EchoParams {
        self.params
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enabled
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Slot holding the sample written `delay_samples` ago
    #[inline(always)]
    pub fn read_index(&self) -> usize {
        let capacity = self.capacity();
        (self.write_pos + capacity - self.delay_samples) % capacity
    }

    /// Raw delay line contents
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl Effect for Echo {
    #[inline(always)]
    fn process(&mut self, send: i32) -> i32 {
        if !self.params.enabled {
            return 0;
        }

        let delayed = self.buffer[self.read_index()] as i32 - CENTER as i32;
        let feedback = clip_i8(send + delayed * self.params.feedback as i32 / 256);
        self.buffer[self.write_pos] = (feedback + CENTER as i32) as u8;
        self.write_pos = (self.write_pos + 1) % self.capacity();

        delayed * self.params.mix as i32 / 256
    }

    fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = CENTER);
        self.write_pos = 0;
    }
}

/// One-pole smoothing filter
///
/// y[n] = (7 * y[n-1] + x[n]) / 8
/// Size: 1 byte
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    value: u8,
}

impl Default for Smoother {
    fn default() -> Self {
        Self { value: CENTER }
    }
}

impl Smoother {
    /// Jump straight to `value`, used when output comes back from silence
    #[inline(always)]
    pub fn seed(&mut self, value: u8) {
        self.value = value;
    }

    #[inline(always)]
    pub fn value(&self) -> u8 {
        self.value
    }

    #[inline(always)]
    pub fn smooth(&mut self, input: u8) -> u8 {
        self.value = ((self.value as u16 * 7 + input as u16) >> 3) as u8;
        self.value
    }
}

impl Effect for Smoother {
    #[inline(always)]
    fn process(&mut self, input: i32) -> i32 {
        self.smooth(input.clamp(0, 255) as u8) as i32
    }

    fn reset(&mut self) {
        self.value = CENTER;
    }
}
