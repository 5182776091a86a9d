use rust_decimal::Decimal;
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors that stop a withholding or overtime calculation.
///
/// There is never a partial result.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// No rate table is registered for the requested tax year.
    #[error("no rate table registered for tax year {0}")]
    UnsupportedYear(i32),

    /// The table code lies outside both the deduction and addition bands.
    #[error("table code {0} is outside the deduction and addition bands")]
    InvalidTableCode(i32),

    /// An amount is too large to calculate with exactly.
    #[error("amount {0} is too large to calculate with")]
    AmountTooLarge(Decimal),
}

impl From<RegistryError> for CalculationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnsupportedYear(year) => Self::UnsupportedYear(year),
        }
    }
}
