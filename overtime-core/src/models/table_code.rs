use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// First code of the deduction band; also the base its amounts count from.
pub const DEDUCTION_BAND_START: i32 = 8000;
/// Last code of the deduction band.
pub const DEDUCTION_BAND_END: i32 = 8400;
/// Base the addition band's amounts count from. Not itself a valid code.
pub const ADDITION_BAND_BASE: i32 = 9000;
/// First valid code of the addition band.
pub const ADDITION_BAND_START: i32 = 9010;
/// Last code of the addition band.
pub const ADDITION_BAND_END: i32 = 9400;

const AMOUNT_PER_STEP: i64 = 1000;

/// Which band a table code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Fixed amount subtracted from the taxable base.
    Deduction,
    /// Fixed amount added to the taxable base.
    Addition,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deduction => "deduction",
            Self::Addition => "addition",
        }
    }
}

/// A withholding table number ("tabellnummer").
///
/// Deduction tables run from 8000 to 8400 with amount `(code - 8000) * 1000`.
/// Addition tables run from 9010 to 9400 with amount `(code - 9000) * 1000`;
/// codes 9000 through 9009 are not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableCode {
    code: i32,
    kind: TableKind,
}

impl TableCode {
    /// Classifies `code`, returning `None` for codes outside both bands.
    pub fn parse(code: i32) -> Option<Self> {
        let kind = match code {
            DEDUCTION_BAND_START..=DEDUCTION_BAND_END => TableKind::Deduction,
            ADDITION_BAND_START..=ADDITION_BAND_END => TableKind::Addition,
            _ => return None,
        };
        Some(Self { code, kind })
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Unsigned amount encoded by the code.
    pub fn amount(&self) -> Decimal {
        let base = match self.kind {
            TableKind::Deduction => DEDUCTION_BAND_START,
            TableKind::Addition => ADDITION_BAND_BASE,
        };
        Decimal::from(i64::from(self.code - base) * AMOUNT_PER_STEP)
    }

    /// Signed change to the taxable general income: negative for deduction
    /// tables, positive for addition tables.
    pub fn adjustment(&self) -> Decimal {
        match self.kind {
            TableKind::Deduction => -self.amount(),
            TableKind::Addition => self.amount(),
        }
    }

    /// Every valid code, deduction band first.
    pub fn all() -> impl Iterator<Item = TableCode> {
        (DEDUCTION_BAND_START..=DEDUCTION_BAND_END)
            .chain(ADDITION_BAND_START..=ADDITION_BAND_END)
            .filter_map(Self::parse)
    }
}

impl fmt::Display for TableCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Error returned when a string is not a supported table code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a supported table code")]
pub struct ParseTableCodeError(String);

impl FromStr for TableCode {
    type Err = ParseTableCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .ok()
            .and_then(Self::parse)
            .ok_or_else(|| ParseTableCodeError(s.to_string()))
    }
}

impl Serialize for TableCode {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code)
    }
}

impl<'de> Deserialize<'de> for TableCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i32::deserialize(deserializer)?;
        Self::parse(code).ok_or_else(|| {
            serde::de::Error::custom(format!("table code {code} is outside the supported bands"))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_deduction_band_start() {
        let code = TableCode::parse(8000).unwrap();

        assert_eq!(code.kind(), TableKind::Deduction);
        assert_eq!(code.amount(), dec!(0));
    }

    #[test]
    fn parse_deduction_code_encodes_thousands() {
        let code = TableCode::parse(8115).unwrap();

        assert_eq!(code.kind(), TableKind::Deduction);
        assert_eq!(code.amount(), dec!(115000));
        assert_eq!(code.adjustment(), dec!(-115000));
    }

    #[test]
    fn parse_deduction_band_end() {
        let code = TableCode::parse(8400).unwrap();

        assert_eq!(code.amount(), dec!(400000));
    }

    #[test]
    fn parse_addition_band_starts_at_9010() {
        let code = TableCode::parse(9010).unwrap();

        assert_eq!(code.kind(), TableKind::Addition);
        assert_eq!(code.amount(), dec!(10000));
        assert_eq!(code.adjustment(), dec!(10000));
    }

    #[test]
    fn parse_addition_band_end() {
        let code = TableCode::parse(9400).unwrap();

        assert_eq!(code.amount(), dec!(400000));
    }

    #[test]
    fn kind_names_match_serde_names() {
        for kind in [TableKind::Deduction, TableKind::Addition] {
            let json = serde_json::to_string(&kind).unwrap();

            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn parse_rejects_addition_band_floor() {
        for code in 9000..9010 {
            assert_eq!(TableCode::parse(code), None, "code {code}");
        }
    }

    #[test]
    fn parse_rejects_codes_outside_both_bands() {
        for code in [0, 7150, 7999, 8401, 8999, 9401, -8100, i32::MAX] {
            assert_eq!(TableCode::parse(code), None, "code {code}");
        }
    }

    #[test]
    fn all_yields_both_bands() {
        let codes: Vec<_> = TableCode::all().collect();

        assert_eq!(codes.len(), 401 + 391);
        assert_eq!(codes.first().map(TableCode::code), Some(8000));
        assert_eq!(codes.last().map(TableCode::code), Some(9400));
    }

    #[test]
    fn from_str_trims_input() {
        let code: TableCode = " 9100 ".parse().unwrap();

        assert_eq!(code.code(), 9100);
    }

    #[test]
    fn from_str_rejects_unsupported_code() {
        let result = "7150".parse::<TableCode>();

        assert_eq!(result, Err(ParseTableCodeError("7150".to_string())));
    }

    #[test]
    fn serde_uses_plain_integer() {
        let code = TableCode::parse(8115).unwrap();

        let json = serde_json::to_string(&code).unwrap();
        let back: TableCode = serde_json::from_str(&json).unwrap();

        assert_eq!(json, "8115");
        assert_eq!(back, code);
    }

    #[test]
    fn deserialize_rejects_unsupported_code() {
        let result = serde_json::from_str::<TableCode>("7150");

        assert!(result.is_err());
    }
}
