mod overtime;
mod settings;
mod standard_deduction;
mod table_code;
mod tax_bracket;
mod tax_year_rates;

pub use overtime::{OvertimeResult, OvertimeScenario, ScenarioInput};
pub use settings::{OvertimeSettings, StoredSettings};
pub use standard_deduction::StandardDeduction;
pub use table_code::{
    ADDITION_BAND_BASE, ADDITION_BAND_END, ADDITION_BAND_START, DEDUCTION_BAND_END,
    DEDUCTION_BAND_START, ParseTableCodeError, TableCode, TableKind,
};
pub use tax_bracket::{BracketCeiling, TaxBracket};
pub use tax_year_rates::{GeneralIncomeTax, NationalInsurance, RatesError, TaxYearRates};
