use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound of a bracket tier.
///
/// The top tier of every schedule is [`BracketCeiling::OpenEnded`]; all other
/// tiers carry a cumulative income ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketCeiling {
    Capped(Decimal),
    OpenEnded,
}

impl BracketCeiling {
    /// Returns the ceiling amount, or `None` for the open-ended top tier.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Capped(amount) => Some(*amount),
            Self::OpenEnded => None,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        matches!(self, Self::OpenEnded)
    }
}

/// One tier of the progressive bracket tax ("trinnskatt").
///
/// Income between the previous tier's ceiling (exclusive) and this tier's
/// ceiling (inclusive) is taxed at `rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub ceiling: BracketCeiling,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn capped(
        ceiling: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            ceiling: BracketCeiling::Capped(ceiling),
            rate,
        }
    }

    pub fn open_ended(rate: Decimal) -> Self {
        Self {
            ceiling: BracketCeiling::OpenEnded,
            rate,
        }
    }
}
