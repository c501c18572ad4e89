//! Numeric precision policies for sample values.
//!
//! Generalizers are written once against [`Precision`] and work with either exact
//! decimals or plain floating point:
//!
//! - [`Decimal`]: 128-bit exact decimal with 28 significant digits. Sums over large
//!   buckets do not accumulate binary rounding error. This is the default.
//! - `f64`: binary floating point, for callers that already hold lossy values and
//!   prefer speed.
//!
//! Geometry (distances, triangle areas) is always evaluated in `f64`; only value
//! accumulation, differences and averaging go through the policy.
//!
//! Arithmetic never saturates silently. Sums report overflow through
//! [`Precision::checked_add`] so callers can switch to a scaled computation, and
//! differences that leave the value range fall back to `f64`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;

/// Arithmetic needed by the generalizers on sample values.
pub trait Precision: Copy + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// The additive identity.
    const ZERO: Self;

    /// Adds two values, returning `None` on overflow.
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// The difference `self - rhs` as `f64`.
    fn delta(self, rhs: Self) -> f64;

    /// Divides an accumulated sum by a sample count.
    ///
    /// Returns [`Self::ZERO`] for a count of zero.
    fn mean(sum: Self, count: usize) -> Self;

    /// Converts to `f64` for geometric calculations.
    fn to_f64(self) -> f64;
}

impl Precision for Decimal {
    const ZERO: Self = Decimal::ZERO;

    fn checked_add(self, rhs: Self) -> Option<Self> {
        Decimal::checked_add(self, rhs)
    }

    fn delta(self, rhs: Self) -> f64 {
        match Decimal::checked_sub(self, rhs) {
            Some(difference) => Precision::to_f64(difference),
            None => Precision::to_f64(self) - Precision::to_f64(rhs),
        }
    }

    fn mean(sum: Self, count: usize) -> Self {
        if count == 0 {
            return Decimal::ZERO;
        }
        // Decimal division rounds to the 28 significant digits the type can hold,
        // so non-terminating quotients (1/3) never fail.
        sum.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO)
    }

    fn to_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }
}

impl Precision for f64 {
    const ZERO: Self = 0.0;

    fn checked_add(self, rhs: Self) -> Option<Self> {
        let sum = self + rhs;
        sum.is_finite().then_some(sum)
    }

    fn delta(self, rhs: Self) -> f64 {
        self - rhs
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(sum: Self, count: usize) -> Self {
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_mean_non_terminating() {
        let mean = <Decimal as Precision>::mean(Decimal::ONE, 3);
        assert_eq!(mean.to_string(), "0.3333333333333333333333333333");
    }

    #[test]
    fn test_decimal_mean_zero_count() {
        assert_eq!(<Decimal as Precision>::mean(Decimal::TEN, 0), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        // 0.1 added ten times is exactly one in decimal, not in binary.
        let tenth = Decimal::new(1, 1);
        let sum = (0..10).try_fold(Decimal::ZERO, |acc, _| Precision::checked_add(acc, tenth));
        assert_eq!(sum, Some(Decimal::ONE));

        let float_sum = (0..10).try_fold(0.0f64, |acc, _| Precision::checked_add(acc, 0.1));
        assert_ne!(float_sum, Some(1.0));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(Precision::checked_add(Decimal::MAX, Decimal::ONE), None);
        assert_eq!(Precision::checked_add(f64::MAX, f64::MAX), None);
        assert_eq!(Precision::checked_add(Decimal::ONE, Decimal::ONE), Some(Decimal::from(2)));
    }

    #[test]
    fn test_delta_beyond_value_range() {
        // MIN - MAX does not fit a Decimal; the f64 fallback keeps the magnitude.
        let delta = Precision::delta(Decimal::MIN, Decimal::MAX);
        assert!(delta < -1.5e29);
        assert_eq!(Precision::delta(Decimal::new(25, 1), Decimal::ONE), 1.5);
        assert_eq!(Precision::delta(2.5f64, 1.0), 1.5);
    }

    #[test]
    fn test_float_mean() {
        assert_eq!(<f64 as Precision>::mean(9.0, 3), 3.0);
        assert_eq!(<f64 as Precision>::mean(9.0, 0), 0.0);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Precision::to_f64(Decimal::new(25, 1)), 2.5);
        assert_eq!(Precision::to_f64(2.5f64), 2.5);
    }
}
