//! Unit of measure for catalog products.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit of measure a product is sold by.
///
/// Serialized in lowercase to match the backend's `unit` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Sold per piece.
    #[default]
    Piece,
    /// Sold per kilogram.
    Kg,
    /// Sold per gram.
    G,
    /// Sold per liter.
    L,
    /// Sold per milliliter.
    Ml,
}

/// Error returned when parsing an unknown unit value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown unit: {0}")]
pub struct UnknownUnit(pub String);

impl Unit {
    /// All units, in the order the admin form presents them.
    pub const ALL: [Self; 5] = [Self::Piece, Self::Kg, Self::G, Self::L, Self::Ml];

    /// Short code used on the wire and in price displays (e.g. "$2.50 / kg").
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Piece => "piece",
            Self::Kg => "kg",
            Self::G => "g",
            Self::L => "l",
            Self::Ml => "ml",
        }
    }

    /// Human-readable label for form options.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Piece => "Piece",
            Self::Kg => "Kilogram",
            Self::G => "Gram",
            Self::L => "Liter",
            Self::Ml => "Milliliter",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.code() == s)
            .ok_or_else(|| UnknownUnit(s.to_owned()))
    }
}
