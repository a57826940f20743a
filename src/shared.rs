//! Interrupt sharing — one engine, one lock, no global ISR pointer
//!
//! The engine sits in a `critical_section::Mutex` so that every
//! background call and every sample tick see a consistent voice bank.
//! A [`SharedSynth`] lives in a `static`; [`SharedSynth::init`] hands
//! the timer a closure that captures it by reference.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;

use critical_section::Mutex;

use crate::output::PwmPair;
use crate::synth::Synth;

/// Periodic timer that drives the sample interrupt
pub trait SampleTimer {
    /// Call `on_tick` every `period_us` microseconds until stopped
    fn start(&mut self, period_us: u32, on_tick: impl FnMut() + Send + 'static);

    fn stop(&mut self);
}

/// Engine cell shared between background code and the sample interrupt
pub struct SharedSynth<O: PwmPair> {
    inner: Mutex<RefCell<Option<Synth<O>>>>,
}

impl<O: PwmPair> Default for SharedSynth<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: PwmPair> SharedSynth<O> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install `synth` and start `timer` at its sample rate
    ///
    /// Replaces any engine installed earlier.
    pub fn init(&'static self, synth: Synth<O>, timer: &mut impl SampleTimer)
    where
        O: Send + 'static,
    {
        let period_us = synth.config().period_us();
        critical_section::with(|cs| {
            self.inner.replace(cs, Some(synth));
        });
        log::debug!("sample timer started, period {period_us} us");
        timer.start(period_us, move || self.on_sample());
    }

    /// Stop `timer` and take the engine back out
    pub fn shutdown(&self, timer: &mut impl SampleTimer) -> Option<Synth<O>> {
        timer.stop();
        critical_section::with(|cs| self.inner.replace(cs, None))
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Run `f` on the engine inside one critical section
    ///
    /// Returns `None` before [`SharedSynth::init`]. Must not be nested.
    pub fn with<R>(&self, f: impl FnOnce(&mut Synth<O>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Sample interrupt body
    #[inline]
    pub fn on_sample(&self) {
        critical_section::with(|cs| {
            if let Some(synth) = self.inner.borrow_ref_mut(cs).as_mut() {
                synth.next_sample();
            }
        });
    }
}
