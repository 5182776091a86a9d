use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ScenarioInput;

/// User preferences kept between sessions.
///
/// `table_code` is stored as entered; it is checked when a scenario is built
/// from it, not when it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeSettings {
    pub annual_salary: Decimal,
    pub table_code: i32,
    pub tax_year: i32,
    /// Show the pay-slip withholding figures instead of the actual tax.
    pub use_withholding_display: bool,
}

impl OvertimeSettings {
    /// Combines the stored settings with a number of overtime hours.
    pub fn scenario_input(
        &self,
        overtime_hours: Decimal,
    ) -> ScenarioInput {
        ScenarioInput {
            annual_salary: self.annual_salary,
            overtime_hours,
            table_code: self.table_code,
            tax_year: self.tax_year,
        }
    }
}

/// Settings as read back from a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSettings {
    pub settings: OvertimeSettings,
    pub updated_at: DateTime<Utc>,
}
