//! CSV inputs for the overtime calculator: rate tables and scenario batches.

mod loader;
mod scenarios;

pub use loader::{
    BRACKETS_FILE, BracketRecord, RateTableLoader, RateTableLoaderError, YEARS_FILE, YearRecord,
};
pub use scenarios::{ScenarioLoader, ScenarioLoaderError};
