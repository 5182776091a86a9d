//! Norwegian withholding constants shipped with the crate.

use rust_decimal_macros::dec;

use crate::models::{
    GeneralIncomeTax, NationalInsurance, StandardDeduction, TaxBracket, TaxYearRates,
};

/// Rates for income year 2025.
pub fn rates_2025() -> TaxYearRates {
    TaxYearRates {
        tax_year: 2025,
        brackets: vec![
            TaxBracket::capped(dec!(217400), dec!(0)),
            TaxBracket::capped(dec!(306050), dec!(0.017)),
            TaxBracket::capped(dec!(697150), dec!(0.040)),
            TaxBracket::capped(dec!(942400), dec!(0.137)),
            TaxBracket::capped(dec!(1410750), dec!(0.167)),
            TaxBracket::open_ended(dec!(0.177)),
        ],
        national_insurance: NationalInsurance {
            rate: dec!(0.077),
            exemption_threshold: dec!(99650),
        },
        general_income_tax: GeneralIncomeTax { rate: dec!(0.22) },
        standard_deduction: StandardDeduction {
            rate: dec!(0.46),
            floor: dec!(4000),
            ceiling: dec!(92000),
        },
        personal_allowance: dec!(108550),
        withholding_periods: dec!(10.5),
    }
}

/// Rates for income year 2026.
pub fn rates_2026() -> TaxYearRates {
    TaxYearRates {
        tax_year: 2026,
        brackets: vec![
            TaxBracket::capped(dec!(226100), dec!(0)),
            TaxBracket::capped(dec!(318300), dec!(0.017)),
            TaxBracket::capped(dec!(725050), dec!(0.040)),
            TaxBracket::capped(dec!(980100), dec!(0.137)),
            TaxBracket::capped(dec!(1467200), dec!(0.167)),
            TaxBracket::open_ended(dec!(0.177)),
        ],
        national_insurance: NationalInsurance {
            rate: dec!(0.076),
            exemption_threshold: dec!(99650),
        },
        general_income_tax: GeneralIncomeTax { rate: dec!(0.22) },
        standard_deduction: StandardDeduction {
            rate: dec!(0.46),
            floor: dec!(4000),
            ceiling: dec!(95700),
        },
        personal_allowance: dec!(114540),
        withholding_periods: dec!(10.5),
    }
}
