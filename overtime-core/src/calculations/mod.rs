//! Tax calculations for overtime pay.
//!
//! Everything here is a pure function of its inputs and a borrowed
//! [`RateRegistry`](crate::registry::RateRegistry). Nothing is rounded until
//! a value leaves the crate in an [`OvertimeResult`](crate::models::OvertimeResult).

pub mod bracket;
pub mod common;
mod error;
pub mod overtime;
pub mod withholding;

pub use bracket::bracket_tax;
pub use error::CalculationError;
pub use overtime::{
    OvertimeCalculator, OvertimePolicy, PolicyError, compute_overtime, parse_table_code,
};
pub use withholding::{
    AnnualTaxBreakdown, MAX_ANNUAL_INCOME, MONTHS_PER_YEAR, WithholdingEngine, annual_tax_breakdown, annual_tax_for,
    monthly_withholding_for,
};
