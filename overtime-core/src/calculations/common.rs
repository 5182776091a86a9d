//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the withholding and
//! overtime calculations: output rounding and clamping helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use overtime_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate (fraction) to three decimal places, half-up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use overtime_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(0.4325)), dec!(0.433));
/// assert_eq!(round_rate(dec!(0.4324)), dec!(0.432));
/// ```
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use overtime_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Clamps `value` into `[floor, ceiling]`. Callers guarantee `floor <= ceiling`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use overtime_core::calculations::common::clamp;
///
/// assert_eq!(clamp(dec!(50), dec!(100), dec!(200)), dec!(100));
/// assert_eq!(clamp(dec!(150), dec!(100), dec!(200)), dec!(150));
/// assert_eq!(clamp(dec!(250), dec!(100), dec!(200)), dec!(200));
/// ```
pub fn clamp(
    value: Decimal,
    floor: Decimal,
    ceiling: Decimal,
) -> Decimal {
    min(max(value, floor), ceiling)
}
