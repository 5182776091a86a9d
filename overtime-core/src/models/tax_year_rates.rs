use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BracketCeiling, StandardDeduction, TaxBracket};

/// Errors raised when a rate table is internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatesError {
    #[error("tax year {0} has no bracket tiers")]
    NoBrackets(i32),

    #[error("tax year {year}: bracket ceiling {ceiling} is not above the previous ceiling")]
    CeilingNotAscending { year: i32, ceiling: Decimal },

    #[error("tax year {0}: only the last bracket tier may be open-ended")]
    OpenEndedNotLast(i32),

    #[error("tax year {0}: the last bracket tier must be open-ended")]
    MissingOpenEndedTier(i32),

    #[error("tax year {year}: {name} must be in [0, 1), got {value}")]
    RateOutOfRange {
        year: i32,
        name: &'static str,
        value: Decimal,
    },

    #[error("tax year {year}: {name} must be non-negative, got {value}")]
    NegativeAmount {
        year: i32,
        name: &'static str,
        value: Decimal,
    },

    #[error("tax year {year}: standard deduction floor {floor} exceeds ceiling {ceiling}")]
    DeductionBoundsInverted {
        year: i32,
        floor: Decimal,
        ceiling: Decimal,
    },

    #[error("tax year {year}: withholding periods must be in (0, 12], got {periods}")]
    InvalidWithholdingPeriods { year: i32, periods: Decimal },
}

/// Flat national insurance contribution ("trygdeavgift").
///
/// Charged on the whole gross income once it exceeds the exemption threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalInsurance {
    pub rate: Decimal,
    pub exemption_threshold: Decimal,
}

/// Flat tax on general income ("skatt på alminnelig inntekt").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralIncomeTax {
    pub rate: Decimal,
}

/// Every constant the withholding engine needs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearRates {
    pub tax_year: i32,
    pub brackets: Vec<TaxBracket>,
    pub national_insurance: NationalInsurance,
    pub general_income_tax: GeneralIncomeTax,
    pub standard_deduction: StandardDeduction,
    pub personal_allowance: Decimal,
    /// Number of pay periods annual withholding is spread over. Fewer than
    /// twelve because June is taxed at half rate and December is tax-free.
    pub withholding_periods: Decimal,
}

impl TaxYearRates {
    /// Checks the table for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError`] if:
    /// - there are no bracket tiers, ceilings are not strictly ascending, or
    ///   the open-ended tier is missing or not last
    /// - any rate is outside `[0, 1)`
    /// - a threshold, floor, ceiling or allowance is negative
    /// - the deduction floor exceeds its ceiling
    /// - `withholding_periods` is not in `(0, 12]`
    pub fn validate(&self) -> Result<(), RatesError> {
        let year = self.tax_year;

        self.validate_brackets()?;

        check_rate(year, "national insurance rate", self.national_insurance.rate)?;
        check_rate(year, "general income tax rate", self.general_income_tax.rate)?;
        check_rate(year, "standard deduction rate", self.standard_deduction.rate)?;

        check_non_negative(
            year,
            "national insurance threshold",
            self.national_insurance.exemption_threshold,
        )?;
        check_non_negative(year, "standard deduction floor", self.standard_deduction.floor)?;
        check_non_negative(year, "personal allowance", self.personal_allowance)?;

        if self.standard_deduction.floor > self.standard_deduction.ceiling {
            return Err(RatesError::DeductionBoundsInverted {
                year,
                floor: self.standard_deduction.floor,
                ceiling: self.standard_deduction.ceiling,
            });
        }

        if self.withholding_periods <= Decimal::ZERO || self.withholding_periods > Decimal::from(12)
        {
            return Err(RatesError::InvalidWithholdingPeriods {
                year,
                periods: self.withholding_periods,
            });
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), RatesError> {
        let year = self.tax_year;
        let Some(last) = self.brackets.last() else {
            return Err(RatesError::NoBrackets(year));
        };
        if !last.ceiling.is_open_ended() {
            return Err(RatesError::MissingOpenEndedTier(year));
        }

        let mut previous = Decimal::ZERO;
        let capped_tiers = &self.brackets[..self.brackets.len() - 1];
        for bracket in capped_tiers {
            match bracket.ceiling {
                BracketCeiling::Capped(ceiling) if ceiling > previous => previous = ceiling,
                BracketCeiling::Capped(ceiling) => {
                    return Err(RatesError::CeilingNotAscending { year, ceiling });
                }
                BracketCeiling::OpenEnded => return Err(RatesError::OpenEndedNotLast(year)),
            }
        }

        for bracket in &self.brackets {
            check_rate(year, "bracket rate", bracket.rate)?;
        }

        Ok(())
    }
}

fn check_rate(
    year: i32,
    name: &'static str,
    value: Decimal,
) -> Result<(), RatesError> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(RatesError::RateOutOfRange { year, name, value });
    }
    Ok(())
}

fn check_non_negative(
    year: i32,
    name: &'static str,
    value: Decimal,
) -> Result<(), RatesError> {
    if value < Decimal::ZERO {
        return Err(RatesError::NegativeAmount { year, name, value });
    }
    Ok(())
}
