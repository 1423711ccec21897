//! Integer newtype that prevents unchecked arithmetic.
//!
//! Script integers are signed 64-bit machine words and every arithmetic
//! operator reports overflow as an error. `ScalarInt` wraps `i64` and does
//! NOT implement `Add`, `Sub`, `Mul`, `Div`, `Rem` or `Neg`, so all arithmetic
//! goes through checked methods returning `Option<ScalarInt>`.
//!
//! Bitwise traits (`BitAnd`, `BitOr`, `BitXor`, `Not`) are implemented because
//! they cannot overflow.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A 64-bit signed script integer.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ScalarInt(i64);

impl ScalarInt {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Extract the raw `i64` value.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_mul(self, rhs: Self) -> Option<Self> {
        match self.0.checked_mul(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked negation. Returns `None` for `i64::MIN`.
    #[inline]
    pub const fn checked_neg(self) -> Option<Self> {
        match self.0.checked_neg() {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Floor division: rounds towards negative infinity.
    ///
    /// - `7 // 2 == 3`
    /// - `-7 // 2 == -4`
    /// - `7 // -2 == -4`
    ///
    /// Returns `None` on division by zero and for `i64::MIN // -1`.
    pub fn checked_floor_div(self, rhs: Self) -> Option<Self> {
        let div = self.0.checked_div(rhs.0)?;
        let rem = self.0.checked_rem(rhs.0)?;
        if rem != 0 && (rem < 0) != (rhs.0 < 0) {
            div.checked_sub(1).map(Self)
        } else {
            Some(Self(div))
        }
    }

    /// Floor modulo: the result takes the sign of the divisor, so that
    /// `(a // b) * b + a % b == a`.
    ///
    /// - `7 % -2 == -1`
    /// - `-7 % 2 == 1`
    ///
    /// Returns `None` only on division by zero.
    pub fn checked_floor_mod(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        if rhs.0 == -1 {
            return Some(Self::ZERO);
        }
        let rem = self.0.wrapping_rem(rhs.0);
        if rem != 0 && (rem < 0) != (rhs.0 < 0) {
            Some(Self(rem.wrapping_add(rhs.0)))
        } else {
            Some(Self(rem))
        }
    }

    /// Left shift by a non-negative count.
    ///
    /// Overflow is detected by shifting the result back and comparing with
    /// the input. Counts of 64 or more overflow unless the value is zero.
    /// Returns `None` on overflow and for negative counts.
    pub fn checked_shl(self, count: i64) -> Option<Self> {
        if count < 0 {
            return None;
        }
        if count >= 64 {
            return if self.0 == 0 { Some(Self::ZERO) } else { None };
        }
        let shift = u32::try_from(count).ok()?;
        let result = self.0.wrapping_shl(shift);
        if result.wrapping_shr(shift) == self.0 {
            Some(Self(result))
        } else {
            None
        }
    }

    /// Arithmetic right shift by a non-negative count. Counts of 64 or more
    /// yield `-1` for negative values and `0` otherwise. Returns `None` for
    /// negative counts.
    pub fn checked_shr(self, count: i64) -> Option<Self> {
        if count < 0 {
            return None;
        }
        if count >= 64 {
            return Some(Self(if self.0 < 0 { -1 } else { 0 }));
        }
        Some(Self(self.0.wrapping_shr(u32::try_from(count).ok()?)))
    }
}

// Bitwise Traits (cannot overflow)

impl BitAnd for ScalarInt {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for ScalarInt {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for ScalarInt {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for ScalarInt {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<i64> for ScalarInt {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ScalarInt> for i64 {
    #[inline]
    fn from(value: ScalarInt) -> Self {
        value.0
    }
}

impl fmt::Debug for ScalarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ScalarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn int(v: i64) -> ScalarInt {
        ScalarInt::new(v)
    }

    #[test]
    fn floor_div_rounds_down() {
        assert_eq!(int(7).checked_floor_div(int(2)), Some(int(3)));
        assert_eq!(int(7).checked_floor_div(int(-2)), Some(int(-4)));
        assert_eq!(int(-7).checked_floor_div(int(2)), Some(int(-4)));
        assert_eq!(int(-7).checked_floor_div(int(-2)), Some(int(3)));
        assert_eq!(int(6).checked_floor_div(int(-2)), Some(int(-3)));
    }

    #[test]
    fn floor_div_failures() {
        assert_eq!(int(1).checked_floor_div(ScalarInt::ZERO), None);
        assert_eq!(ScalarInt::MIN.checked_floor_div(int(-1)), None);
    }

    #[test]
    fn floor_mod_takes_divisor_sign() {
        assert_eq!(int(7).checked_floor_mod(int(-2)), Some(int(-1)));
        assert_eq!(int(-7).checked_floor_mod(int(2)), Some(int(1)));
        assert_eq!(int(7).checked_floor_mod(int(2)), Some(int(1)));
        assert_eq!(int(-7).checked_floor_mod(int(-2)), Some(int(-1)));
        assert_eq!(int(6).checked_floor_mod(int(3)), Some(ScalarInt::ZERO));
        assert_eq!(ScalarInt::MIN.checked_floor_mod(int(-1)), Some(ScalarInt::ZERO));
        assert_eq!(int(1).checked_floor_mod(ScalarInt::ZERO), None);
    }

    #[test]
    fn shift_left_detects_overflow_by_shifting_back() {
        assert_eq!(int(1).checked_shl(62), Some(int(1 << 62)));
        assert_eq!(int(1).checked_shl(63), None);
        assert_eq!(int(-1).checked_shl(63), Some(ScalarInt::MIN));
        assert_eq!(int(3).checked_shl(62), None);
        assert_eq!(int(0).checked_shl(100), Some(ScalarInt::ZERO));
        assert_eq!(int(1).checked_shl(64), None);
        assert_eq!(int(1).checked_shl(-1), None);
    }

    #[test]
    fn shift_right_saturates() {
        assert_eq!(int(-8).checked_shr(1), Some(int(-4)));
        assert_eq!(int(-8).checked_shr(64), Some(int(-1)));
        assert_eq!(int(8).checked_shr(99), Some(ScalarInt::ZERO));
        assert_eq!(int(8).checked_shr(-1), None);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(ScalarInt::MAX.checked_add(ScalarInt::ONE), None);
        assert_eq!(ScalarInt::MIN.checked_sub(ScalarInt::ONE), None);
        assert_eq!(ScalarInt::MAX.checked_mul(int(2)), None);
        assert_eq!(ScalarInt::MIN.checked_neg(), None);
    }

    #[test]
    fn bitwise_ops() {
        assert_eq!(int(0b1100) & int(0b1010), int(0b1000));
        assert_eq!(int(0b1100) | int(0b1010), int(0b1110));
        assert_eq!(int(0b1100) ^ int(0b1010), int(0b0110));
        assert_eq!(!int(0), int(-1));
    }

    proptest! {
        #[test]
        fn floor_div_mod_identity(a in -1_000_000i64..1_000_000, b in -1000i64..1000) {
            prop_assume!(b != 0);
            let q = int(a).checked_floor_div(int(b)).map(ScalarInt::raw);
            let r = int(a).checked_floor_mod(int(b)).map(ScalarInt::raw);
            let (q, r) = (q.unwrap_or_default(), r.unwrap_or_default());
            prop_assert_eq!(q * b + r, a);
            prop_assert!(r == 0 || (r < 0) == (b < 0));
            prop_assert!(r.abs() < b.abs());
        }

        #[test]
        fn shl_agrees_with_wide_arithmetic(a in any::<i64>(), n in 0i64..70) {
            let wide = i128::from(a) << n;
            let fits = n < 64 && i64::try_from(wide).is_ok();
            prop_assert_eq!(int(a).checked_shl(n).is_some(), fits || a == 0);
        }
    }
}
