//! 16.16 unsigned fixed-point envelope levels
//!
//! Levels live in `[0, 255 << 16]`: the integer part is an 8-bit
//! amplitude, the low 16 bits carry sub-step precision so that slow
//! envelopes still move every sample.
//!
//! Author: Moroya Sakamoto

/// Unsigned 16.16 fixed-point value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fx16(u32);

impl Fx16 {
    pub const FRAC_BITS: u32 = 16;
    pub const ZERO: Self = Self(0);
    /// Full-scale envelope level, `255 << 16`
    pub const MAX_LEVEL: Self = Self(255 << Self::FRAC_BITS);

    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Integer amplitude `0..=255` promoted to fixed point
    #[inline(always)]
    pub const fn from_level(level: u8) -> Self {
        Self((level as u32) << Self::FRAC_BITS)
    }

    #[inline(always)]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Integer part, clamped to 8 bits
    #[inline(always)]
    pub const fn high8(self) -> u8 {
        let hi = self.0 >> Self::FRAC_BITS;
        if hi > 255 { 255 } else { hi as u8 }
    }

    #[inline(always)]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline(always)]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Spread this span over `samples` steps
    ///
    /// A zero span stays zero; a non-zero span never rounds down to a
    /// zero step, which would stall the envelope.
    #[inline]
    pub const fn per_sample(self, samples: u32) -> Self {
        if self.0 == 0 {
            return Self::ZERO;
        }
        let samples = if samples == 0 { 1 } else { samples };
        let step = self.0 / samples;
        Self(if step == 0 { 1 } else { step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_conversion() {
        assert_eq!(Fx16::from_level(255), Fx16::MAX_LEVEL);
        assert_eq!(Fx16::from_level(200).high8(), 200);
        assert_eq!(Fx16::from_raw(0x00C8_FFFF).high8(), 200);
        assert_eq!(Fx16::from_raw(u32::MAX).high8(), 255);
    }

    #[test]
    fn test_saturation() {
        let near_top = Fx16::from_raw(u32::MAX - 1);
        assert_eq!(near_top.saturating_add(Fx16::from_raw(10)).raw(), u32::MAX);
        assert_eq!(Fx16::from_level(1).saturating_sub(Fx16::from_level(2)), Fx16::ZERO);
    }

    #[test]
    fn test_per_sample() {
        assert_eq!(Fx16::MAX_LEVEL.per_sample(400).raw(), (255 << 16) / 400);
        assert_eq!(Fx16::ZERO.per_sample(400), Fx16::ZERO);
        // Tiny span over a huge count still moves
        assert_eq!(Fx16::from_raw(3).per_sample(1_000_000).raw(), 1);
        // Zero sample count is treated as one step
        assert_eq!(Fx16::from_level(10).per_sample(0), Fx16::from_level(10));
    }
}
