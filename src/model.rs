//! Core data types: family configurations, expense categories, and the
//! per-location record produced by the extractor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Household composition keying every per-location figure.
///
/// Declaration order is the canonical column order of the source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FamilyConfig {
    #[serde(rename = "1a0c")]
    One0,
    #[serde(rename = "1a1c")]
    One1,
    #[serde(rename = "1a2c")]
    One2,
    #[serde(rename = "1a3c")]
    One3,
    #[serde(rename = "2a1w0c")]
    OneWorking0,
    #[serde(rename = "2a1w1c")]
    OneWorking1,
    #[serde(rename = "2a1w2c")]
    OneWorking2,
    #[serde(rename = "2a1w3c")]
    OneWorking3,
    #[serde(rename = "2a2w0c")]
    BothWorking0,
    #[serde(rename = "2a2w1c")]
    BothWorking1,
    #[serde(rename = "2a2w2c")]
    BothWorking2,
    #[serde(rename = "2a2w3c")]
    BothWorking3,
}

impl FamilyConfig {
    pub const ALL: [FamilyConfig; 12] = [
        Self::One0,
        Self::One1,
        Self::One2,
        Self::One3,
        Self::OneWorking0,
        Self::OneWorking1,
        Self::OneWorking2,
        Self::OneWorking3,
        Self::BothWorking0,
        Self::BothWorking1,
        Self::BothWorking2,
        Self::BothWorking3,
    ];

    /// Short command-line key, e.g. `2a1w3c`.
    pub fn key(self) -> &'static str {
        match self {
            Self::One0 => "1a0c",
            Self::One1 => "1a1c",
            Self::One2 => "1a2c",
            Self::One3 => "1a3c",
            Self::OneWorking0 => "2a1w0c",
            Self::OneWorking1 => "2a1w1c",
            Self::OneWorking2 => "2a1w2c",
            Self::OneWorking3 => "2a1w3c",
            Self::BothWorking0 => "2a2w0c",
            Self::BothWorking1 => "2a2w1c",
            Self::BothWorking2 => "2a2w2c",
            Self::BothWorking3 => "2a2w3c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One0 => "1 Adult, 0 Children",
            Self::One1 => "1 Adult, 1 Child",
            Self::One2 => "1 Adult, 2 Children",
            Self::One3 => "1 Adult, 3 Children",
            Self::OneWorking0 => "2 Adults (1 Working), 0 Children",
            Self::OneWorking1 => "2 Adults (1 Working), 1 Child",
            Self::OneWorking2 => "2 Adults (1 Working), 2 Children",
            Self::OneWorking3 => "2 Adults (1 Working), 3 Children",
            Self::BothWorking0 => "2 Adults (Both Working), 0 Children",
            Self::BothWorking1 => "2 Adults (Both Working), 1 Child",
            Self::BothWorking2 => "2 Adults (Both Working), 2 Children",
            Self::BothWorking3 => "2 Adults (Both Working), 3 Children",
        }
    }

    pub fn children(self) -> u8 {
        (self.index() % 4) as u8
    }

    /// Position in the canonical column order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for FamilyConfig {
    fn default() -> Self { Self::One0 }
}

impl fmt::Display for FamilyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FamilyConfig {
    type Err = String;

    /// Accepts the short key (`2a2w1c`) or the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(s) || f.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|f| f.key()).collect();
                format!("Unknown family configuration '{}'. Use one of: {}", s, keys.join(", "))
            })
    }
}

/// Annual expense category as reported by the source tables.
///
/// Declaration order is the order rows are classified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    #[serde(rename = "Child Care")]
    ChildCare,
    Medical,
    Housing,
    Transportation,
    Civic,
    #[serde(rename = "Internet & Mobile")]
    InternetMobile,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        Self::Food,
        Self::ChildCare,
        Self::Medical,
        Self::Housing,
        Self::Transportation,
        Self::Civic,
        Self::InternetMobile,
        Self::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::ChildCare => "Child Care",
            Self::Medical => "Medical",
            Self::Housing => "Housing",
            Self::Transportation => "Transportation",
            Self::Civic => "Civic",
            Self::InternetMobile => "Internet & Mobile",
            Self::Other => "Other",
        }
    }

    /// Extra substrings that identify this category's row label.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Food => &["food"],
            Self::ChildCare => &["child care", "childcare"],
            Self::Medical => &["medical"],
            Self::Housing => &["housing"],
            Self::Transportation => &["transportation"],
            Self::Civic => &["civic"],
            Self::InternetMobile => &["broadband", "internet", "telephone"],
            Self::Other => &["other necessities", "other"],
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                format!(
                    "Unknown expense category '{}'. Available categories: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}

pub type FamilyValues = BTreeMap<FamilyConfig, f64>;

/// Structured figures for one location, built from one document.
///
/// A missing key means the value was not found in the source; it is never
/// the same as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    /// Hourly living wage.
    pub wages: FamilyValues,
    /// Annual expenses per category.
    pub expenses: BTreeMap<ExpenseCategory, FamilyValues>,
    pub income_before_tax: FamilyValues,
    pub income_after_tax: FamilyValues,
    pub taxes: FamilyValues,
    /// Extraction fallbacks and structural warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl LocationRecord {
    pub fn expense(&self, category: ExpenseCategory, family: FamilyConfig) -> Option<f64> {
        self.expenses.get(&category)?.get(&family).copied()
    }

    /// Pre-tax required annual income, the anchor for equivalence models.
    pub fn anchor(&self, family: FamilyConfig) -> Option<f64> {
        self.income_before_tax.get(&family).copied()
    }

    pub fn wage(&self, family: FamilyConfig) -> Option<f64> {
        self.wages.get(&family).copied()
    }
}
