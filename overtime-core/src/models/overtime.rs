use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TableCode;
use crate::calculations::CalculationError;

/// Loose, caller-side shape of an overtime request.
///
/// This is what a form, a CSV row or stored settings produce before any
/// checking; see [`crate::validation::validate_scenario`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub annual_salary: Decimal,
    pub overtime_hours: Decimal,
    pub table_code: i32,
    pub tax_year: i32,
}

/// A single overtime calculation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeScenario {
    pub annual_salary: Decimal,
    pub overtime_hours: Decimal,
    pub table_code: TableCode,
    pub tax_year: i32,
}

impl TryFrom<&ScenarioInput> for OvertimeScenario {
    type Error = CalculationError;

    fn try_from(input: &ScenarioInput) -> Result<Self, Self::Error> {
        let table_code = TableCode::parse(input.table_code)
            .ok_or(CalculationError::InvalidTableCode(input.table_code))?;
        Ok(Self {
            annual_salary: input.annual_salary,
            overtime_hours: input.overtime_hours,
            table_code,
            tax_year: input.tax_year,
        })
    }
}

impl TryFrom<ScenarioInput> for OvertimeScenario {
    type Error = CalculationError;

    fn try_from(input: ScenarioInput) -> Result<Self, Self::Error> {
        Self::try_from(&input)
    }
}

impl From<&OvertimeScenario> for ScenarioInput {
    fn from(scenario: &OvertimeScenario) -> Self {
        Self {
            annual_salary: scenario.annual_salary,
            overtime_hours: scenario.overtime_hours,
            table_code: scenario.table_code.code(),
            tax_year: scenario.tax_year,
        }
    }
}

/// Outcome of an overtime calculation.
///
/// Currency fields are rounded to two decimals and rate fields to three;
/// nothing upstream of this struct is rounded.
///
/// With zero overtime hours every amount is zero except `base_hourly_rate`
/// and `overtime_hourly_rate`, which still describe the salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeResult {
    pub tax_year: i32,
    pub table_code: TableCode,

    pub gross_overtime_pay: Decimal,
    pub base_hourly_rate: Decimal,
    pub overtime_hourly_rate: Decimal,

    /// Tax owed on the overtime if it is a one-off, from the annual tax
    /// difference.
    pub tax_on_overtime_actual: Decimal,
    pub take_home_actual: Decimal,
    pub effective_rate_actual: Decimal,

    /// Tax withheld on the pay slip, assuming the overtime recurs monthly.
    pub tax_on_overtime_withholding: Decimal,
    pub take_home_withholding: Decimal,
    pub effective_rate_withholding: Decimal,

    /// Over-withholding expected back at year-end settlement. Not clamped:
    /// a negative value means withholding undershoots the actual tax.
    pub estimated_refund: Decimal,
}
