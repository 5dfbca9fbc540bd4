//! Unit-of-measure enumeration and free-text normalization.
//!
//! # Responsibility
//! - Define the closed set of measurement units an item can carry.
//! - Classify messy upstream unit labels into that set.
//!
//! # Invariants
//! - `Unit::to_unit` is total: unknown, empty or missing text yields
//!   `Unit::Unknown`, never an error.
//! - Matching is exact and case-sensitive after trimming surrounding
//!   whitespace; no substring or fuzzy matching.

use serde::{Deserialize, Serialize};

/// Accepted spellings per unit kind, as they appear in vendor price feeds.
const UNIT_ALIASES: &[(Unit, &[&str])] = &[
    (Unit::Kg, &["קג", "קילוגרם", "קילוגרמים", "ק\"ג"]),
    (Unit::Gr, &["גר", "גרמים", "גר'"]),
    (Unit::Liter, &["ליטר", "ליטרים", "ל'"]),
    (Unit::Ml, &["מ\"ל", "מיליליטרים", "מיליליטר", "מל"]),
    (Unit::Unit, &["יחידה"]),
    (Unit::Meter, &["מטר", "מטרים", "מ", "מ'"]),
];

/// Measurement unit of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Label missing or not recognized.
    #[default]
    Unknown,
    Kg,
    Gr,
    Liter,
    Ml,
    /// Sold per piece.
    Unit,
    /// Stored as `m`.
    #[serde(rename = "m")]
    Meter,
}

impl Unit {
    /// Normalizes a free-text unit label.
    ///
    /// `None` behaves like an empty label. Surrounding whitespace is ignored.
    pub fn to_unit(text: Option<&str>) -> Unit {
        let label = text.map(str::trim).unwrap_or_default();
        UNIT_ALIASES
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| *alias == label))
            .map_or(Unit::Unknown, |(unit, _)| *unit)
    }

    /// Returns the accepted spellings for this unit (empty for `Unknown`).
    pub fn aliases(self) -> &'static [&'static str] {
        UNIT_ALIASES
            .iter()
            .find(|(unit, _)| *unit == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Kg => 1,
            Self::Gr => 2,
            Self::Liter => 3,
            Self::Ml => 4,
            Self::Unit => 5,
            Self::Meter => 6,
        }
    }

    /// Storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Kg => "kg",
            Self::Gr => "gr",
            Self::Liter => "liter",
            Self::Ml => "ml",
            Self::Unit => "unit",
            Self::Meter => "m",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unknown" => Some(Self::Unknown),
            "kg" => Some(Self::Kg),
            "gr" => Some(Self::Gr),
            "liter" => Some(Self::Liter),
            "ml" => Some(Self::Ml),
            "unit" => Some(Self::Unit),
            "m" => Some(Self::Meter),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Unit, UNIT_ALIASES};

    #[test]
    fn every_alias_maps_to_its_declared_unit() {
        for (unit, aliases) in UNIT_ALIASES {
            for alias in *aliases {
                assert_eq!(Unit::to_unit(Some(*alias)), *unit, "alias `{alias}`");
            }
        }
    }

    #[test]
    fn aliases_are_not_shared_between_units() {
        let mut seen = std::collections::HashSet::new();
        for (_, aliases) in UNIT_ALIASES {
            for alias in *aliases {
                assert!(seen.insert(*alias), "duplicate alias `{alias}`");
            }
        }
    }

    #[test]
    fn storage_names_roundtrip() {
        for unit in [
            Unit::Unknown,
            Unit::Kg,
            Unit::Gr,
            Unit::Liter,
            Unit::Ml,
            Unit::Unit,
            Unit::Meter,
        ] {
            assert_eq!(Unit::parse(unit.as_str()), Some(unit));
        }
        assert_eq!(Unit::parse("meter"), None);
    }

    #[test]
    fn unknown_has_no_aliases() {
        assert!(Unit::Unknown.aliases().is_empty());
        assert_eq!(Unit::Unit.aliases(), &["יחידה"]);
    }
}
