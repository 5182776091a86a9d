//! Overtime pay and the tax attributable to it.
//!
//! The tax on overtime is isolated with a marginal difference: tax on
//! (normal pay + overtime) minus tax on normal pay alone. It is computed
//! twice.
//!
//! * **Withholding**: the employer's pay-slip view. The month's overtime is
//!   treated as if it recurred every month, so both monthly amounts are
//!   annualised and spread over the withholding periods.
//! * **Actual**: the overtime as a one-off addition to the annual salary,
//!   taxed at the true annual marginal rate.
//!
//! The difference between the two is what the employee can expect back at
//! the year-end settlement.
//!
//! Because the table-code adjustment enters both terms of each difference
//! identically, it cancels out unless the zero floor on taxable general
//! income is reached by one of the terms.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use overtime_core::calculations::OvertimeCalculator;
//! use overtime_core::{OvertimeScenario, RateRegistry, TableCode};
//!
//! let registry = RateRegistry::builtin();
//! let calculator = OvertimeCalculator::with_default_policy(&registry);
//!
//! let scenario = OvertimeScenario {
//!     annual_salary: dec!(1000000),
//!     overtime_hours: dec!(10),
//!     table_code: TableCode::parse(8115).unwrap(),
//!     tax_year: 2026,
//! };
//!
//! let result = calculator.calculate(&scenario).unwrap();
//!
//! assert_eq!(result.gross_overtime_pay, dec!(7179.49));
//! assert!(result.take_home_actual > result.take_home_withholding);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::CalculationError;
use crate::calculations::common::{round_half_up, round_rate};
use crate::calculations::withholding::{
    MONTHS_PER_YEAR, WithholdingEngine, annual_tax_breakdown, monthly_withholding_for,
};
use crate::models::{OvertimeResult, OvertimeScenario, ScenarioInput, TableCode};
use crate::registry::RateRegistry;

/// Errors raised by an inconsistent [`OvertimePolicy`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("standard annual hours must be positive, got {0}")]
    InvalidStandardHours(Decimal),

    #[error("overtime premium must be at least 1, got {0}")]
    InvalidPremium(Decimal),
}

/// How hourly and overtime pay are derived from an annual salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertimePolicy {
    /// Hours in a full-time year (37.5 hours × 52 weeks).
    pub standard_annual_hours: Decimal,
    /// Multiplier on the base hourly rate for overtime hours.
    pub overtime_premium: Decimal,
}

impl Default for OvertimePolicy {
    fn default() -> Self {
        Self {
            standard_annual_hours: Decimal::from(1950),
            overtime_premium: Decimal::new(14, 1),
        }
    }
}

impl OvertimePolicy {
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the standard hours are not positive or the
    /// premium is below 1.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.standard_annual_hours <= Decimal::ZERO {
            return Err(PolicyError::InvalidStandardHours(
                self.standard_annual_hours,
            ));
        }
        if self.overtime_premium < Decimal::ONE {
            return Err(PolicyError::InvalidPremium(self.overtime_premium));
        }
        Ok(())
    }
}

/// Unrounded marginal taxes on one overtime amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarginalTax {
    withholding: Decimal,
    actual: Decimal,
}

/// Computes [`OvertimeResult`]s against a borrowed [`RateRegistry`].
#[derive(Debug, Clone)]
pub struct OvertimeCalculator<'a> {
    engine: WithholdingEngine<'a>,
    policy: OvertimePolicy,
}

impl<'a> OvertimeCalculator<'a> {
    /// # Errors
    ///
    /// Returns [`PolicyError`] if `policy` fails validation.
    pub fn new(
        registry: &'a RateRegistry,
        policy: OvertimePolicy,
    ) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            engine: WithholdingEngine::new(registry),
            policy,
        })
    }

    /// Calculator using 1950 standard hours and a 40 % premium.
    pub fn with_default_policy(registry: &'a RateRegistry) -> Self {
        Self {
            engine: WithholdingEngine::new(registry),
            policy: OvertimePolicy::default(),
        }
    }

    /// Parses the table code of a loose input, then calculates.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::InvalidTableCode`] if the code is in neither band.
    /// * [`CalculationError::UnsupportedYear`] if the year is not registered.
    /// * [`CalculationError::AmountTooLarge`] if pay is out of range.
    pub fn calculate_input(
        &self,
        input: &ScenarioInput,
    ) -> Result<OvertimeResult, CalculationError> {
        let scenario = OvertimeScenario::try_from(input)?;
        self.calculate(&scenario)
    }

    /// Calculates gross overtime pay and the tax on it.
    ///
    /// The rate table is resolved before anything else, so an unknown year
    /// fails even when no overtime was worked.
    ///
    /// # Errors
    ///
    /// * [`CalculationError::UnsupportedYear`] if the year is not registered.
    /// * [`CalculationError::AmountTooLarge`] if the salary, the overtime pay
    ///   or their sum exceeds
    ///   [`MAX_ANNUAL_INCOME`](crate::calculations::MAX_ANNUAL_INCOME) once
    ///   annualised.
    pub fn calculate(
        &self,
        scenario: &OvertimeScenario,
    ) -> Result<OvertimeResult, CalculationError> {
        let rates = self.engine.rates_for(scenario.tax_year)?;

        let base_hourly_rate = checked(
            scenario
                .annual_salary
                .checked_div(self.policy.standard_annual_hours),
            scenario.annual_salary,
        )?;
        let overtime_hourly_rate = checked(
            base_hourly_rate.checked_mul(self.policy.overtime_premium),
            base_hourly_rate,
        )?;

        if scenario.overtime_hours.is_zero() {
            return Ok(Self::zero_result(
                scenario,
                base_hourly_rate,
                overtime_hourly_rate,
            ));
        }

        let gross_overtime_pay = checked(
            scenario.overtime_hours.checked_mul(overtime_hourly_rate),
            scenario.overtime_hours,
        )?;

        let normal_monthly = scenario.annual_salary / MONTHS_PER_YEAR;
        let combined_monthly = checked(
            normal_monthly.checked_add(gross_overtime_pay),
            gross_overtime_pay,
        )?;
        let withholding = monthly_withholding_for(rates, combined_monthly, scenario.table_code)?
            - monthly_withholding_for(rates, normal_monthly, scenario.table_code)?;

        let annual_with_overtime = checked(
            scenario.annual_salary.checked_add(gross_overtime_pay),
            gross_overtime_pay,
        )?;
        let with_overtime =
            annual_tax_breakdown(rates, annual_with_overtime, scenario.table_code)?;
        let without_overtime =
            annual_tax_breakdown(rates, scenario.annual_salary, scenario.table_code)?;
        if with_overtime.general_income_floored() != without_overtime.general_income_floored() {
            warn!(
                annual_salary = %scenario.annual_salary,
                table_code = scenario.table_code.code(),
                "overtime lifts taxable general income off its zero floor"
            );
        }
        let actual = with_overtime.total() - without_overtime.total();

        let marginal = MarginalTax {
            withholding,
            actual,
        };
        let result = Self::build_result(
            scenario,
            base_hourly_rate,
            overtime_hourly_rate,
            gross_overtime_pay,
            marginal,
        );

        debug!(
            tax_year = scenario.tax_year,
            table_code = scenario.table_code.code(),
            gross_overtime_pay = %result.gross_overtime_pay,
            tax_actual = %result.tax_on_overtime_actual,
            tax_withholding = %result.tax_on_overtime_withholding,
            "computed overtime"
        );
        if result.estimated_refund < Decimal::ZERO {
            warn!(
                annual_salary = %scenario.annual_salary,
                overtime_hours = %scenario.overtime_hours,
                estimated_refund = %result.estimated_refund,
                "withholding on overtime is below the actual tax; expect to pay at settlement"
            );
        }

        Ok(result)
    }

    fn build_result(
        scenario: &OvertimeScenario,
        base_hourly_rate: Decimal,
        overtime_hourly_rate: Decimal,
        gross_overtime_pay: Decimal,
        marginal: MarginalTax,
    ) -> OvertimeResult {
        OvertimeResult {
            tax_year: scenario.tax_year,
            table_code: scenario.table_code,
            gross_overtime_pay: round_half_up(gross_overtime_pay),
            base_hourly_rate: round_half_up(base_hourly_rate),
            overtime_hourly_rate: round_half_up(overtime_hourly_rate),
            tax_on_overtime_actual: round_half_up(marginal.actual),
            take_home_actual: round_half_up(gross_overtime_pay - marginal.actual),
            effective_rate_actual: effective_rate(marginal.actual, gross_overtime_pay),
            tax_on_overtime_withholding: round_half_up(marginal.withholding),
            take_home_withholding: round_half_up(gross_overtime_pay - marginal.withholding),
            effective_rate_withholding: effective_rate(marginal.withholding, gross_overtime_pay),
            estimated_refund: round_half_up(marginal.withholding - marginal.actual),
        }
    }

    fn zero_result(
        scenario: &OvertimeScenario,
        base_hourly_rate: Decimal,
        overtime_hourly_rate: Decimal,
    ) -> OvertimeResult {
        Self::build_result(
            scenario,
            base_hourly_rate,
            overtime_hourly_rate,
            Decimal::ZERO,
            MarginalTax {
                withholding: Decimal::ZERO,
                actual: Decimal::ZERO,
            },
        )
    }
}

fn checked(
    value: Option<Decimal>,
    operand: Decimal,
) -> Result<Decimal, CalculationError> {
    value.ok_or(CalculationError::AmountTooLarge(operand))
}

/// Share of `gross` taken by `tax`, or zero when there is no gross pay.
fn effective_rate(
    tax: Decimal,
    gross: Decimal,
) -> Decimal {
    if gross.is_zero() {
        return Decimal::ZERO;
    }
    round_rate(tax / gross)
}

/// Convenience wrapper: one scenario against the built-in policy.
///
/// # Errors
///
/// See [`OvertimeCalculator::calculate`].
pub fn compute_overtime(
    registry: &RateRegistry,
    scenario: &OvertimeScenario,
) -> Result<OvertimeResult, CalculationError> {
    OvertimeCalculator::with_default_policy(registry).calculate(scenario)
}

/// Looks up a raw table number.
///
/// # Errors
///
/// [`CalculationError::InvalidTableCode`] if `code` is in neither band.
pub fn parse_table_code(code: i32) -> Result<TableCode, CalculationError> {
    TableCode::parse(code).ok_or(CalculationError::InvalidTableCode(code))
}
