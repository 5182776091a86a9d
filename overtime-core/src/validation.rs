//! Soft validation of caller input before it reaches the calculator.
//!
//! The calculator only refuses what it cannot compute (unknown year, invalid
//! table code). This layer also rejects implausible salaries and negative
//! hours, and flags unusually high hours without rejecting them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{ScenarioInput, TableCode};
use crate::registry::RateRegistry;

/// Bounds applied by [`validate_scenario`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub min_annual_salary: Decimal,
    pub max_annual_salary: Decimal,
    /// Overtime hours above this produce a warning.
    pub high_overtime_hours: Decimal,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_annual_salary: Decimal::from(100_000),
            max_annual_salary: Decimal::from(5_000_000),
            high_overtime_hours: Decimal::from(100),
        }
    }
}

/// Outcome of [`validate_scenario`]. `valid` is true iff `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_findings(
        errors: Vec<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Checks `input` against `limits` and the years known to `registry`.
///
/// Every check runs; the report lists all problems found, not just the first.
pub fn validate_scenario(
    registry: &RateRegistry,
    input: &ScenarioInput,
    limits: &ValidationLimits,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if input.annual_salary < limits.min_annual_salary
        || input.annual_salary > limits.max_annual_salary
    {
        errors.push(format!(
            "annual salary {} is outside {}..={}",
            input.annual_salary, limits.min_annual_salary, limits.max_annual_salary
        ));
    }

    if input.overtime_hours < Decimal::ZERO {
        errors.push(format!(
            "overtime hours must not be negative, got {}",
            input.overtime_hours
        ));
    } else if input.overtime_hours > limits.high_overtime_hours {
        warn!(overtime_hours = %input.overtime_hours, "unusually high overtime hours");
        warnings.push(format!(
            "{} overtime hours is unusually high (more than {})",
            input.overtime_hours, limits.high_overtime_hours
        ));
    }

    if TableCode::parse(input.table_code).is_none() {
        errors.push(format!(
            "table code {} is outside the deduction (8000-8400) and addition (9010-9400) bands",
            input.table_code
        ));
    }

    if !registry.contains(input.tax_year) {
        errors.push(format!(
            "tax year {} is not supported (available: {:?})",
            input.tax_year,
            registry.years()
        ));
    }

    ValidationReport::from_findings(errors, warnings)
}
