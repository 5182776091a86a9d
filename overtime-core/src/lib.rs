pub mod calculations;
pub mod db;
pub mod models;
pub mod registry;
pub mod validation;

pub use calculations::{CalculationError, OvertimeCalculator, OvertimePolicy, WithholdingEngine};
pub use db::repository::{RepositoryError, SettingsRepository};
pub use models::*;
pub use registry::{RateRegistry, RegistrationError, RegistryError};
pub use validation::{ValidationLimits, ValidationReport, validate_scenario};
