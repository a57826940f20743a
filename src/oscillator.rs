//! Core oscillator — direct digital synthesis in integer math
//!
//! A 32-bit phase accumulator advances by a precomputed increment
//! every sample. The top 8 bits index the waveform, which is produced
//! as an unsigned 8-bit sample centred on 128.
//!
//! Author: Moroya Sakamoto

/// Centre (silent) value of an unsigned 8-bit sample
pub const CENTER: u8 = 128;

/// Waveform type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Waveform {
    Sine = 0,
    Square = 1,
    Triangle = 2,
    Sawtooth = 3,
    Noise = 4,
}

impl Waveform {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Sine,
            1 => Self::Square,
            2 => Self::Triangle,
            3 => Self::Sawtooth,
            4 => Self::Noise,
            _ => Self::Sine,
        }
    }
}

/// One full sine cycle, 256 steps, centred on 128
pub static SINE_TABLE: [u8; 256] = make_sine_table();

/// Bhaskara I approximation evaluated in integers over each half cycle
///
/// With the half cycle mapped to `x in 0..128` (π = 128):
/// `sin ≈ 16x(π-x) / (5π² - 4x(π-x))`.
const fn make_sine_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let x = (i & 127) as u32;
        let span = x * (128 - x);
        let num = 16 * span;
        let den = 5 * 128 * 128 - 4 * span;
        let amp = (127 * num + den / 2) / den;
        table[i] = if i < 128 { 128 + amp as u8 } else { 128 - amp as u8 };
        i += 1;
    }
    table
}

/// Per-sample phase step for `freq_hz` at `sample_rate`
///
/// `round(freq * 2^32 / sample_rate)`. Frequencies above the sample
/// rate wrap modulo 2^32, which is the same aliasing the accumulator
/// would produce anyway.
#[inline]
pub const fn phase_increment(freq_hz: u16, sample_rate: u32) -> u32 {
    if sample_rate == 0 {
        return 0;
    }
    let sr = sample_rate as u64;
    ((((freq_hz as u64) << 32) + sr / 2) / sr) as u32
}

/// Phase-accumulator oscillator
///
/// Total state: 13 bytes (phase, increment, noise state, waveform).
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Running phase, wraps modulo 2^32
    phase: u32,
    /// Phase step per sample
    phase_increment: u32,
    /// Waveform type
    pub waveform: Waveform,
    /// xorshift state for noise generation
    noise_state: u32,
}

impl Oscillator {
    pub const fn new(waveform: Waveform) -> Self {
        Self {
            phase: 0,
            phase_increment: 0,
            waveform,
            noise_state: 0xACE1u32,
        }
    }

    /// Reset phase to zero
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    pub fn set_frequency(&mut self, freq_hz: u16, sample_rate: u32) {
        self.phase_increment = phase_increment(freq_hz, sample_rate);
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn phase_increment(&self) -> u32 {
        self.phase_increment
    }

    /// Advance one sample and return the waveform value
    ///
    /// A stopped oscillator (increment 0, i.e. frequency 0) always
    /// returns [`CENTER`], whatever the waveform.
    #[inline(always)]
    pub fn next_sample(&mut self) -> u8 {
        if self.phase_increment == 0 {
            return CENTER;
        }
        self.phase = self.phase.wrapping_add(self.phase_increment);
        self.sample_at((self.phase >> 24) as u8)
    }

    /// Evaluate waveform at 8-bit phase index `p`
    #[inline(always)]
    fn sample_at(&mut self, p: u8) -> u8 {
        match self.waveform {
            Waveform::Sine => SINE_TABLE[p as usize],
            Waveform::Square => {
                if p < 128 {
                    255
                } else {
                    0
                }
            }
            Waveform::Triangle => {
                if p < 128 {
                    2 * p
                } else {
                    2 * (255 - p)
                }
            }
            Waveform::Sawtooth => p,
            Waveform::Noise => {
                // xorshift32, one fresh byte per sample
                let mut x = self.noise_state;
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                self.noise_state = x;
                (x >> 8) as u8
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_table_shape() {
        assert_eq!(SINE_TABLE[0], 128);
        assert_eq!(SINE_TABLE[64], 255);
        assert_eq!(SINE_TABLE[128], 128);
        assert_eq!(SINE_TABLE[192], 1);

        // Point symmetry about the centre line
        for p in 0..128 {
            assert_eq!(SINE_TABLE[p] as u16 + SINE_TABLE[p + 128] as u16, 256, "p={p}");
        }
    }

    #[test]
    fn test_sine_table_monotonic_quarters() {
        for quarter in 0..4 {
            let start = quarter * 64;
            let rising = quarter == 0 || quarter == 3;
            for p in start..start + 63 {
                let (a, b) = (SINE_TABLE[p], SINE_TABLE[p + 1]);
                if rising {
                    assert!(b >= a, "quarter {quarter} should rise at {p}");
                } else {
                    assert!(b <= a, "quarter {quarter} should fall at {p}");
                }
            }
        }
    }

    #[test]
    fn test_phase_increment_rounding() {
        // 440 * 2^32 / 40000 = 47244640.256
        assert_eq!(phase_increment(440, 40_000), 47_244_640);
        assert_eq!(phase_increment(0, 40_000), 0);
        assert_eq!(phase_increment(440, 0), 0);
        // Half the sample rate is exactly half a turn
        assert_eq!(phase_increment(20_000, 40_000), 1 << 31);
    }

    #[test]
    fn test_frequency_accuracy_over_one_second() {
        let mut osc = Oscillator::new(Waveform::Sine);
        osc.set_frequency(440, 40_000);
        for _ in 0..40_000 {
            osc.next_sample();
        }
        // 440 whole turns leaves the phase at 0 (mod 2^32), give or take
        // the rounding of the increment accumulated over one second
        let drift = osc.phase().min(osc.phase().wrapping_neg());
        assert!(drift <= 20_000, "phase drift too large: {drift}");
        assert_eq!(osc.phase(), osc.phase_increment().wrapping_mul(40_000));
    }

    #[test]
    fn test_square_and_saw() {
        let mut osc = Oscillator::new(Waveform::Square);
        // Quarter turn per sample: phase indices 64, 128, 192, 0
        osc.set_frequency(10_000, 40_000);
        let samples = [osc.next_sample(), osc.next_sample(), osc.next_sample(), osc.next_sample()];
        assert_eq!(samples, [255, 0, 0, 255]);

        let mut osc = Oscillator::new(Waveform::Sawtooth);
        osc.set_frequency(10_000, 40_000);
        let samples = [osc.next_sample(), osc.next_sample(), osc.next_sample(), osc.next_sample()];
        assert_eq!(samples, [64, 128, 192, 0]);
    }

    #[test]
    fn test_triangle() {
        let mut osc = Oscillator::new(Waveform::Triangle);
        osc.set_frequency(10_000, 40_000);
        let samples = [osc.next_sample(), osc.next_sample(), osc.next_sample(), osc.next_sample()];
        assert_eq!(samples, [128, 2 * (255 - 128), 2 * (255 - 192), 0]);
    }

    #[test]
    fn test_stopped_oscillator_is_silent() {
        for w in 0..5 {
            let mut osc = Oscillator::new(Waveform::from_u8(w));
            osc.set_frequency(0, 40_000);
            for _ in 0..64 {
                assert_eq!(osc.next_sample(), CENTER);
            }
        }
    }

    #[test]
    fn test_oscillator_noise() {
        let mut osc = Oscillator::new(Waveform::Noise);
        osc.set_frequency(440, 40_000);
        let mut samples = [0u8; 256];
        for s in samples.iter_mut() {
            *s = osc.next_sample();
        }
        let min = samples.iter().copied().min().unwrap_or(0);
        let max = samples.iter().copied().max().unwrap_or(0);
        assert!(max - min > 128, "noise should have spread");
    }
}
