//! Per-year rate tables.
//!
//! A [`RateRegistry`] is assembled once at start-up, either from the
//! built-in tables or from data files, and is read-only afterwards. The
//! calculators borrow it, so one registry can serve any number of threads.

mod builtin;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::models::{RatesError, TaxYearRates};

pub use builtin::{rates_2025, rates_2026};

/// Lookup failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no rate table registered for tax year {0}")]
    UnsupportedYear(i32),
}

/// Failure while assembling a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("tax year {0} is already registered")]
    DuplicateYear(i32),

    #[error(transparent)]
    InvalidRates(#[from] RatesError),
}

/// Read-only map from tax year to [`TaxYearRates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateRegistry {
    tables: BTreeMap<i32, TaxYearRates>,
}

impl RateRegistry {
    /// Starts an empty registry.
    pub fn builder() -> RateRegistryBuilder {
        RateRegistryBuilder::default()
    }

    /// Registry holding every table shipped with the crate.
    pub fn builtin() -> Self {
        let tables = [rates_2025(), rates_2026()]
            .into_iter()
            .map(|rates| (rates.tax_year, rates))
            .collect();
        Self { tables }
    }

    /// Rates for `year`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedYear`] if no table is registered for `year`.
    pub fn rates_for(
        &self,
        year: i32,
    ) -> Result<&TaxYearRates, RegistryError> {
        self.tables
            .get(&year)
            .ok_or(RegistryError::UnsupportedYear(year))
    }

    pub fn contains(
        &self,
        year: i32,
    ) -> bool {
        self.tables.contains_key(&year)
    }

    /// Registered years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.tables.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxYearRates> {
        self.tables.values()
    }
}

/// Collects validated tables before freezing them into a [`RateRegistry`].
#[derive(Debug, Default)]
pub struct RateRegistryBuilder {
    tables: BTreeMap<i32, TaxYearRates>,
}

impl RateRegistryBuilder {
    /// Adds a table after validating it.
    ///
    /// # Errors
    ///
    /// * [`RegistrationError::InvalidRates`] if [`TaxYearRates::validate`] fails.
    /// * [`RegistrationError::DuplicateYear`] if the year is already present.
    pub fn register(
        mut self,
        rates: TaxYearRates,
    ) -> Result<Self, RegistrationError> {
        rates.validate()?;
        if self.tables.contains_key(&rates.tax_year) {
            return Err(RegistrationError::DuplicateYear(rates.tax_year));
        }
        debug!(tax_year = rates.tax_year, tiers = rates.brackets.len(), "registered rate table");
        self.tables.insert(rates.tax_year, rates);
        Ok(self)
    }

    pub fn build(self) -> RateRegistry {
        RateRegistry {
            tables: self.tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        for rates in RateRegistry::builtin().iter() {
            assert_eq!(rates.validate(), Ok(()), "tax year {}", rates.tax_year);
        }
    }

    #[test]
    fn builtin_lists_years_ascending() {
        assert_eq!(RateRegistry::builtin().years(), vec![2025, 2026]);
    }

    #[test]
    fn rates_for_returns_registered_year() {
        let registry = RateRegistry::builtin();

        let rates = registry.rates_for(2026).unwrap();

        assert_eq!(rates.tax_year, 2026);
        assert_eq!(rates.withholding_periods, dec!(10.5));
    }

    #[test]
    fn rates_for_unknown_year_fails() {
        let registry = RateRegistry::builtin();

        assert_eq!(
            registry.rates_for(1999),
            Err(RegistryError::UnsupportedYear(1999))
        );
    }

    #[test]
    fn builder_registers_valid_table() {
        let registry = RateRegistry::builder()
            .register(rates_2026())
            .unwrap()
            .build();

        assert!(registry.contains(2026));
        assert!(!registry.contains(2025));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn builder_rejects_duplicate_year() {
        let result = RateRegistry::builder()
            .register(rates_2026())
            .and_then(|builder| builder.register(rates_2026()));

        assert_eq!(result.err(), Some(RegistrationError::DuplicateYear(2026)));
    }

    #[test]
    fn builder_rejects_invalid_table() {
        let rates = TaxYearRates {
            withholding_periods: dec!(0),
            ..rates_2026()
        };

        let result = RateRegistry::builder().register(rates);

        assert_eq!(
            result.err(),
            Some(RegistrationError::InvalidRates(
                RatesError::InvalidWithholdingPeriods {
                    year: 2026,
                    periods: dec!(0),
                }
            ))
        );
    }

    #[test]
    fn empty_registry_supports_nothing() {
        let registry = RateRegistry::builder().build();

        assert!(registry.is_empty());
        assert_eq!(
            registry.rates_for(2026),
            Err(RegistryError::UnsupportedYear(2026))
        );
    }
}
