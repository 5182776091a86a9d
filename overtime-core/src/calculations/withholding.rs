//! Annual tax and monthly withholding ("tabelltrekk").
//!
//! Annual tax is the sum of three components computed from one year's rates:
//!
//! | Component          | Base                                   |
//! |--------------------|----------------------------------------|
//! | Bracket tax        | Gross income, progressive tiers        |
//! | National insurance | Gross income, flat above a threshold   |
//! | General income tax | Taxable general income, flat           |
//!
//! Taxable general income is gross income less the standard deduction and
//! the personal allowance, shifted by the table code's adjustment, and never
//! below zero.
//!
//! Monthly withholding annualises one month's pay, taxes it, and spreads the
//! annual amount over the year's withholding periods (10.5, not 12).
//!
//! Incomes above [`MAX_ANNUAL_INCOME`] are refused with
//! [`CalculationError::AmountTooLarge`] instead of overflowing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::CalculationError;
use crate::calculations::bracket::bracket_tax;
use crate::calculations::common::max;
use crate::models::{TableCode, TaxYearRates};
use crate::registry::RateRegistry;

/// Months a single month's pay is multiplied by when annualising.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Largest annual income, in either sign, the engine will tax (10^18).
pub const MAX_ANNUAL_INCOME: Decimal =
    Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

fn ensure_in_range(income: Decimal) -> Result<Decimal, CalculationError> {
    if income.abs() > MAX_ANNUAL_INCOME {
        return Err(CalculationError::AmountTooLarge(income));
    }
    Ok(income)
}

/// Unrounded components of one annual tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTaxBreakdown {
    pub gross_income: Decimal,
    pub standard_deduction: Decimal,
    /// Signed table-code adjustment applied to taxable general income.
    pub table_adjustment: Decimal,
    pub taxable_general_income: Decimal,
    pub bracket_tax: Decimal,
    pub national_insurance: Decimal,
    pub general_income_tax: Decimal,
}

impl AnnualTaxBreakdown {
    pub fn total(&self) -> Decimal {
        self.bracket_tax + self.national_insurance + self.general_income_tax
    }

    /// True when deductions exceeded income and taxable general income was
    /// floored at zero.
    pub fn general_income_floored(&self) -> bool {
        self.taxable_general_income.is_zero()
    }
}

/// Computes every component of annual tax for an already-resolved rate table.
///
/// # Errors
///
/// [`CalculationError::AmountTooLarge`] if the income exceeds
/// [`MAX_ANNUAL_INCOME`].
pub fn annual_tax_breakdown(
    rates: &TaxYearRates,
    annual_gross_income: Decimal,
    table_code: TableCode,
) -> Result<AnnualTaxBreakdown, CalculationError> {
    let annual_gross_income = ensure_in_range(annual_gross_income)?;
    let standard_deduction = rates.standard_deduction.amount_for(annual_gross_income);
    let table_adjustment = table_code.adjustment();
    let taxable_general_income = max(
        annual_gross_income - standard_deduction - rates.personal_allowance + table_adjustment,
        Decimal::ZERO,
    );

    let national_insurance =
        if annual_gross_income > rates.national_insurance.exemption_threshold {
            rates.national_insurance.rate * annual_gross_income
        } else {
            Decimal::ZERO
        };

    Ok(AnnualTaxBreakdown {
        gross_income: annual_gross_income,
        standard_deduction,
        table_adjustment,
        taxable_general_income,
        bracket_tax: bracket_tax(annual_gross_income, &rates.brackets),
        national_insurance,
        general_income_tax: rates.general_income_tax.rate * taxable_general_income,
    })
}

/// Annual tax for an already-resolved rate table.
///
/// # Errors
///
/// See [`annual_tax_breakdown`].
pub fn annual_tax_for(
    rates: &TaxYearRates,
    annual_gross_income: Decimal,
    table_code: TableCode,
) -> Result<Decimal, CalculationError> {
    Ok(annual_tax_breakdown(rates, annual_gross_income, table_code)?.total())
}

/// Monthly withholding for an already-resolved rate table.
///
/// # Errors
///
/// [`CalculationError::AmountTooLarge`] if the annualised income exceeds
/// [`MAX_ANNUAL_INCOME`].
pub fn monthly_withholding_for(
    rates: &TaxYearRates,
    monthly_gross_income: Decimal,
    table_code: TableCode,
) -> Result<Decimal, CalculationError> {
    let annualised = monthly_gross_income
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or(CalculationError::AmountTooLarge(monthly_gross_income))?;
    let annual_tax = annual_tax_for(rates, annualised, table_code)?;
    annual_tax
        .checked_div(rates.withholding_periods)
        .ok_or(CalculationError::AmountTooLarge(annual_tax))
}

/// Year-aware front end to the withholding functions.
///
/// Borrows a [`RateRegistry`]; holds no other state, so it is `Copy` and can
/// be shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct WithholdingEngine<'a> {
    registry: &'a RateRegistry,
}

impl<'a> WithholdingEngine<'a> {
    pub fn new(registry: &'a RateRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the rate table for `tax_year`.
    ///
    /// # Errors
    ///
    /// [`CalculationError::UnsupportedYear`] if the year is not registered.
    pub fn rates_for(
        &self,
        tax_year: i32,
    ) -> Result<&'a TaxYearRates, CalculationError> {
        Ok(self.registry.rates_for(tax_year)?)
    }

    /// Annual tax on `annual_gross_income`, unrounded.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::UnsupportedYear`] if the year is not registered.
    /// * [`CalculationError::AmountTooLarge`] if the income exceeds
    ///   [`MAX_ANNUAL_INCOME`].
    pub fn annual_tax(
        &self,
        annual_gross_income: Decimal,
        table_code: TableCode,
        tax_year: i32,
    ) -> Result<Decimal, CalculationError> {
        Ok(self
            .annual_tax_breakdown(annual_gross_income, table_code, tax_year)?
            .total())
    }

    /// Annual tax with its components, unrounded.
    ///
    /// # Errors
    ///
    /// See [`Self::annual_tax`].
    pub fn annual_tax_breakdown(
        &self,
        annual_gross_income: Decimal,
        table_code: TableCode,
        tax_year: i32,
    ) -> Result<AnnualTaxBreakdown, CalculationError> {
        let rates = self.rates_for(tax_year)?;
        let breakdown = annual_tax_breakdown(rates, annual_gross_income, table_code)?;
        debug!(
            tax_year,
            table_code = table_code.code(),
            gross_income = %annual_gross_income,
            taxable_general_income = %breakdown.taxable_general_income,
            total = %breakdown.total(),
            "computed annual tax"
        );
        Ok(breakdown)
    }

    /// Tax withheld from one month's pay, unrounded.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::UnsupportedYear`] if the year is not registered.
    /// * [`CalculationError::AmountTooLarge`] if the annualised income exceeds
    ///   [`MAX_ANNUAL_INCOME`].
    pub fn monthly_withholding(
        &self,
        monthly_gross_income: Decimal,
        table_code: TableCode,
        tax_year: i32,
    ) -> Result<Decimal, CalculationError> {
        let rates = self.rates_for(tax_year)?;
        monthly_withholding_for(rates, monthly_gross_income, table_code)
    }

    /// Same as [`Self::monthly_withholding`] but takes the raw table number,
    /// as a pay-slip form would supply it.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::InvalidTableCode`] if `table_code` is in neither band.
    /// * [`CalculationError::UnsupportedYear`] if the year is not registered.
    /// * [`CalculationError::AmountTooLarge`] if the income is out of range.
    pub fn monthly_withholding_for_code(
        &self,
        monthly_gross_income: Decimal,
        table_code: i32,
        tax_year: i32,
    ) -> Result<Decimal, CalculationError> {
        let table_code =
            TableCode::parse(table_code).ok_or(CalculationError::InvalidTableCode(table_code))?;
        self.monthly_withholding(monthly_gross_income, table_code, tax_year)
    }
}
