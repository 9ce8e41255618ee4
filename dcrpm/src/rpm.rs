// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use derive_more::{Add, AddAssign, Sub, SubAssign};

/// Motor speed in revolutions per minute.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Add, AddAssign, Sub, SubAssign)]
pub struct Rpm(pub i32);

impl Rpm {
    pub const fn new(rpm: i32) -> Self {
        Self(rpm)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Truncating integer division of two speeds.
    pub const fn ratio(self, other: Self) -> i32 {
        self.0 / other.0
    }

    /// Saturated to the 0..=0xFFFF range of the debug registry.
    pub const fn to_u16_sat(self) -> u16 {
        if self.0 < 0 {
            0
        } else if self.0 > u16::MAX as i32 {
            u16::MAX
        } else {
            self.0 as u16
        }
    }
}

impl Default for Rpm {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ops() {
        let a = Rpm::new(1000);
        let b = Rpm::new(250);
        assert_eq!(a - b, Rpm::new(750));
        assert_eq!(b - a, Rpm::new(-750));
        assert_eq!(a + b, Rpm::new(1250));
        let mut c = a;
        c -= b;
        assert_eq!(c, Rpm::new(750));
        c += b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_ratio_truncates() {
        assert_eq!(Rpm::new(750).ratio(Rpm::new(1000)), 0);
        assert_eq!(Rpm::new(-750).ratio(Rpm::new(1000)), 0);
        assert_eq!(Rpm::new(2500).ratio(Rpm::new(1000)), 2);
        assert_eq!(Rpm::new(-2500).ratio(Rpm::new(1000)), -2);
    }

    #[test]
    fn test_to_u16_sat() {
        assert_eq!(Rpm::new(-1).to_u16_sat(), 0);
        assert_eq!(Rpm::new(1000).to_u16_sat(), 1000);
        assert_eq!(Rpm::new(0x12345).to_u16_sat(), 0xFFFF);
    }
}

// vim: ts=4 sw=4 expandtab
