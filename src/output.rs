//! Output stage — smoothed 8-bit sample onto a complementary PWM pair
//!
//! The primary pin carries the sample, the secondary its complement,
//! so a speaker across both sees twice the swing. When nothing is
//! sounding the PWM is detached and both pins are held low.
//!
//! Author: Moroya Sakamoto

use crate::effects::Smoother;

/// Two PWM channels driven in opposition
///
/// Implemented by the board support code; every method is called from
/// the sample interrupt and must not block.
pub trait PwmPair {
    /// Attach the PWM peripheral to both pins
    fn connect(&mut self);

    /// Set both duty cycles
    fn write(&mut self, primary: u8, secondary: u8);

    /// Detach the PWM and drive both pins low
    fn park_low(&mut self);
}

/// Smoothing filter plus power state in front of a [`PwmPair`]
pub struct OutputStage<O: PwmPair> {
    pins: O,
    smoother: Smoother,
    live: bool,
}

impl<O: PwmPair> OutputStage<O> {
    /// Take the pins and start parked
    pub fn new(mut pins: O) -> Self {
        pins.park_low();
        Self {
            pins,
            smoother: Smoother::default(),
            live: false,
        }
    }

    /// Is the PWM currently attached?
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Last smoothed value written
    pub fn level(&self) -> u8 {
        self.smoother.value()
    }

    pub fn pins(&self) -> &O {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut O {
        &mut self.pins
    }

    /// Smooth and write one sample, waking the PWM if it was parked
    #[inline(always)]
    pub fn drive(&mut self, sample: u8) {
        if !self.live {
            self.pins.connect();
            self.smoother.seed(sample);
            self.live = true;
        }
        let smoothed = self.smoother.smooth(sample);
        self.pins.write(smoothed, 255 - smoothed);
    }

    /// Park the pins; no-op if already parked
    #[inline(always)]
    pub fn silence(&mut self) {
        if self.live {
            self.pins.park_low();
            self.live = false;
        }
    }
}
