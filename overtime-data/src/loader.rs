use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use overtime_core::registry::RegistrationError;
use overtime_core::{
    GeneralIncomeTax, NationalInsurance, RateRegistry, StandardDeduction, TaxBracket,
    TaxYearRates,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// File holding bracket tiers inside a rates directory.
pub const BRACKETS_FILE: &str = "brackets.csv";
/// File holding the per-year constants inside a rates directory.
pub const YEARS_FILE: &str = "years.csv";

/// Errors that can occur when loading rate tables.
#[derive(Debug, Error)]
pub enum RateTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to open {path}: {message}")]
    Io { path: String, message: String },

    #[error("Brackets given for tax year {0} but no year constants")]
    MissingYearConstants(i32),

    #[error("Year constants given for tax year {0} but no brackets")]
    MissingBrackets(i32),

    #[error("Invalid rate table: {0}")]
    Registration(#[from] RegistrationError),
}

impl From<csv::Error> for RateTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RateTableLoaderError::CsvParse(err.to_string())
    }
}

/// One row of `brackets.csv`.
///
/// Rows for a year are tiers in ascending order; an empty `ceiling` marks
/// the open-ended top tier.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub ceiling: Option<Decimal>,
    pub rate: Decimal,
}

impl BracketRecord {
    fn to_bracket(&self) -> TaxBracket {
        match self.ceiling {
            Some(ceiling) => TaxBracket::capped(ceiling, self.rate),
            None => TaxBracket::open_ended(self.rate),
        }
    }
}

/// One row of `years.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct YearRecord {
    pub tax_year: i32,
    pub national_insurance_rate: Decimal,
    pub national_insurance_threshold: Decimal,
    pub general_income_rate: Decimal,
    pub deduction_rate: Decimal,
    pub deduction_floor: Decimal,
    pub deduction_ceiling: Decimal,
    pub personal_allowance: Decimal,
    pub withholding_periods: Decimal,
}

impl YearRecord {
    fn into_rates(
        self,
        brackets: Vec<TaxBracket>,
    ) -> TaxYearRates {
        TaxYearRates {
            tax_year: self.tax_year,
            brackets,
            national_insurance: NationalInsurance {
                rate: self.national_insurance_rate,
                exemption_threshold: self.national_insurance_threshold,
            },
            general_income_tax: GeneralIncomeTax {
                rate: self.general_income_rate,
            },
            standard_deduction: StandardDeduction {
                rate: self.deduction_rate,
                floor: self.deduction_floor,
                ceiling: self.deduction_ceiling,
            },
            personal_allowance: self.personal_allowance,
            withholding_periods: self.withholding_periods,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_records<R, T>(reader: R) -> Result<Vec<T>, RateTableLoaderError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        records.push(result?);
    }

    Ok(records)
}

/// Builds a [`RateRegistry`] from CSV rate tables.
pub struct RateTableLoader;

impl RateTableLoader {
    /// Parse bracket rows from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, RateTableLoaderError> {
        parse_records(reader)
    }

    /// Parse per-year constant rows from a CSV reader.
    pub fn parse_years<R: Read>(reader: R) -> Result<Vec<YearRecord>, RateTableLoaderError> {
        parse_records(reader)
    }

    /// Combine parsed rows into a validated registry.
    ///
    /// Brackets are grouped by year in file order. Every year must appear in
    /// both inputs, and each assembled table must pass
    /// [`TaxYearRates::validate`].
    pub fn build_registry(
        brackets: &[BracketRecord],
        years: &[YearRecord],
    ) -> Result<RateRegistry, RateTableLoaderError> {
        let mut tiers: BTreeMap<i32, Vec<TaxBracket>> = BTreeMap::new();
        for record in brackets {
            tiers
                .entry(record.tax_year)
                .or_default()
                .push(record.to_bracket());
        }

        if let Some(orphan) = tiers
            .keys()
            .find(|year| !years.iter().any(|record| record.tax_year == **year))
        {
            return Err(RateTableLoaderError::MissingYearConstants(*orphan));
        }

        let mut builder = RateRegistry::builder();
        for record in years {
            let year_brackets = tiers
                .remove(&record.tax_year)
                .ok_or(RateTableLoaderError::MissingBrackets(record.tax_year))?;
            debug!(tax_year = record.tax_year, tiers = year_brackets.len(), "assembled rate table");
            builder = builder.register(record.clone().into_rates(year_brackets))?;
        }

        Ok(builder.build())
    }

    /// Load `brackets.csv` and `years.csv` from `dir`.
    pub fn load_dir(dir: &Path) -> Result<RateRegistry, RateTableLoaderError> {
        let brackets = Self::parse_brackets(open(&dir.join(BRACKETS_FILE))?)?;
        let years = Self::parse_years(open(&dir.join(YEARS_FILE))?)?;
        let registry = Self::build_registry(&brackets, &years)?;

        info!(dir = %dir.display(), years = ?registry.years(), "loaded rate tables");
        Ok(registry)
    }
}

fn open(path: &Path) -> Result<File, RateTableLoaderError> {
    File::open(path).map_err(|e| RateTableLoaderError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
