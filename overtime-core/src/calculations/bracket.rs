//! Progressive bracket tax ("trinnskatt").

use rust_decimal::Decimal;

use crate::calculations::common::{max, min};
use crate::models::{BracketCeiling, TaxBracket};

/// Computes the progressive bracket tax on `annual_income`.
///
/// Tiers are walked in ascending order. Each tier taxes only the slice of
/// income between the previous ceiling (exclusive) and its own ceiling
/// (inclusive), so income exactly at a ceiling never reaches the next rate.
/// Brackets must be ordered as [`crate::TaxYearRates::validate`] requires.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use overtime_core::calculations::bracket_tax;
/// use overtime_core::TaxBracket;
///
/// let brackets = vec![
///     TaxBracket::capped(dec!(200000), dec!(0)),
///     TaxBracket::capped(dec!(300000), dec!(0.02)),
///     TaxBracket::open_ended(dec!(0.10)),
/// ];
///
/// // 100 000 at 2 % plus 50 000 at 10 %
/// assert_eq!(bracket_tax(dec!(350000), &brackets), dec!(7000));
/// ```
pub fn bracket_tax(
    annual_income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut previous_ceiling = Decimal::ZERO;

    for bracket in brackets {
        if annual_income <= previous_ceiling {
            break;
        }

        let slice_top = match bracket.ceiling {
            BracketCeiling::Capped(ceiling) => min(annual_income, ceiling),
            BracketCeiling::OpenEnded => annual_income,
        };
        tax += bracket.rate * max(slice_top - previous_ceiling, Decimal::ZERO);

        match bracket.ceiling {
            BracketCeiling::Capped(ceiling) => previous_ceiling = ceiling,
            BracketCeiling::OpenEnded => break,
        }
    }

    tax
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    /// 2026 step tax schedule.
    fn test_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::capped(dec!(226100), dec!(0)),
            TaxBracket::capped(dec!(318300), dec!(0.017)),
            TaxBracket::capped(dec!(725050), dec!(0.040)),
            TaxBracket::capped(dec!(980100), dec!(0.137)),
            TaxBracket::capped(dec!(1467200), dec!(0.167)),
            TaxBracket::open_ended(dec!(0.177)),
        ]
    }

    #[test]
    fn zero_income_has_no_tax() {
        assert_eq!(bracket_tax(dec!(0), &test_brackets()), dec!(0));
    }

    #[test]
    fn negative_income_has_no_tax() {
        assert_eq!(bracket_tax(dec!(-5000), &test_brackets()), dec!(0));
    }

    #[test]
    fn income_inside_zero_rate_tier_has_no_tax() {
        assert_eq!(bracket_tax(dec!(226100), &test_brackets()), dec!(0));
    }

    #[test]
    fn income_just_above_first_ceiling_is_taxed_at_second_rate() {
        let result = bracket_tax(dec!(226200), &test_brackets());

        assert_eq!(result, dec!(1.7));
    }

    #[test]
    fn income_at_ceiling_stays_in_lower_tiers() {
        let result = bracket_tax(dec!(318300), &test_brackets());

        // 92 200 × 1.7 %
        assert_eq!(result, dec!(1567.4));
    }

    #[test]
    fn income_one_krone_over_ceiling_uses_next_rate_for_that_krone() {
        let at = bracket_tax(dec!(318300), &test_brackets());
        let over = bracket_tax(dec!(318301), &test_brackets());

        assert_eq!(over - at, dec!(0.040));
    }

    #[test]
    fn mid_income_accumulates_lower_tiers() {
        let result = bracket_tax(dec!(900000), &test_brackets());

        // 1 567.40 + 406 750 × 4 % + 174 950 × 13.7 %
        assert_eq!(result, dec!(41805.55));
    }

    #[test]
    fn top_tier_has_no_upper_bound() {
        let result = bracket_tax(dec!(10000000), &test_brackets());

        // every capped tier in full, then 8 532 800 × 17.7 %
        let capped = dec!(1567.4) + dec!(16270) + dec!(34941.85) + dec!(81345.7);
        assert_eq!(result, capped + dec!(8532800) * dec!(0.177));
    }

    #[test]
    fn single_open_ended_tier_is_flat_tax() {
        let brackets = vec![TaxBracket::open_ended(dec!(0.25))];

        assert_eq!(bracket_tax(dec!(1000), &brackets), dec!(250));
    }

    #[test]
    fn empty_schedule_has_no_tax() {
        assert_eq!(bracket_tax(dec!(500000), &[]), dec!(0));
    }
}
