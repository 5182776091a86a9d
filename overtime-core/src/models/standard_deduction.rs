use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::clamp;

/// Standard deduction on wage income ("minstefradrag").
///
/// A percentage of gross income, clamped to `[floor, ceiling]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeduction {
    pub rate: Decimal,
    pub floor: Decimal,
    pub ceiling: Decimal,
}

impl StandardDeduction {
    /// Deduction granted for the given annual gross income.
    pub fn amount_for(
        &self,
        annual_gross_income: Decimal,
    ) -> Decimal {
        clamp(annual_gross_income * self.rate, self.floor, self.ceiling)
    }
}
