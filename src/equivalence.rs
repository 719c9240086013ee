//! Income equivalence between two locations.
//!
//! Every model is anchored on the pre-tax required annual income of each
//! location. Degenerate inputs never fail: they return the original income
//! unchanged, and the Engel model drops to the square-root model when
//! per-category data is missing.

use crate::model::{ExpenseCategory, FamilyConfig, LocationRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Constant elasticity used by the log-linear model.
const ELASTICITY: f64 = 0.75;
/// Exponent of the housing share decay with income.
const ENGEL_EXPONENT: f64 = 0.3;
/// Housing share assumed when no expense totals are available.
const DEFAULT_HOUSING_SHARE: f64 = 0.3;

/// How income at the first location translates to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquivalenceMethod {
    /// Plain ratio of anchors.
    Linear,
    /// Living-wage portion scales fully, the excess by the square root.
    Sqrt,
    /// Constant elasticity transfer.
    LogLinear,
    /// Non-homothetic split between housing and everything else.
    Engel,
}

impl Default for EquivalenceMethod {
    fn default() -> Self { Self::Sqrt }
}

impl EquivalenceMethod {
    pub const ALL: [EquivalenceMethod; 4] = [Self::Linear, Self::Sqrt, Self::LogLinear, Self::Engel];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sqrt => "sqrt",
            Self::LogLinear => "log-linear",
            Self::Engel => "engel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear Ratio",
            Self::Sqrt => "Blended Square Root",
            Self::LogLinear => "Constant Elasticity (e=0.75)",
            Self::Engel => "Engel Curve (Non-Homothetic)",
        }
    }

    /// Strict lookup by name, case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Lenient lookup: unknown names select the square-root model.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or(Self::Sqrt)
    }
}

impl fmt::Display for EquivalenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An equivalence computation: model, household, exclusions, and the
/// optional per-category records of both locations.
#[derive(Debug, Clone, Default)]
pub struct Equivalence<'a> {
    method: EquivalenceMethod,
    family: FamilyConfig,
    excluded: BTreeSet<ExpenseCategory>,
    records: Option<(&'a LocationRecord, &'a LocationRecord)>,
}

impl<'a> Equivalence<'a> {
    pub fn new(method: EquivalenceMethod) -> Self {
        Self { method, ..Default::default() }
    }

    pub fn with_family(mut self, family: FamilyConfig) -> Self {
        self.family = family;
        self
    }

    pub fn with_excluded(mut self, excluded: BTreeSet<ExpenseCategory>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Attach both locations' records. Either side may be missing.
    pub fn with_records(mut self, a: Option<&'a LocationRecord>, b: Option<&'a LocationRecord>) -> Self {
        self.records = a.zip(b);
        self
    }

    /// Income at location B equivalent to `income_a` at location A.
    pub fn compute(&self, income_a: f64, anchor_a: f64, anchor_b: f64) -> f64 {
        if !income_a.is_finite() {
            return income_a;
        }

        let (adj_a, adj_b) = match self.records {
            Some((a, b)) if !self.excluded.is_empty() => (
                anchor_a - self.excluded_total(a),
                anchor_b - self.excluded_total(b),
            ),
            _ => (anchor_a, anchor_b),
        };

        // Also rejects NaN anchors.
        if !(adj_a > 0.0 && adj_b > 0.0) {
            return income_a;
        }
        let ratio = adj_b / adj_a;

        let result = match self.method {
            EquivalenceMethod::Linear => income_a * ratio,
            EquivalenceMethod::Sqrt => sqrt_model(income_a, adj_a, adj_b, ratio),
            EquivalenceMethod::LogLinear => income_a * ratio.powf(ELASTICITY),
            EquivalenceMethod::Engel => match self.records {
                Some((a, b)) => self.engel_model(income_a, adj_a, ratio, a, b),
                None => sqrt_model(income_a, adj_a, adj_b, ratio),
            },
        };

        if result.is_finite() { result } else { income_a }
    }

    fn excluded_total(&self, record: &LocationRecord) -> f64 {
        self.excluded
            .iter()
            .map(|cat| record.expense(*cat, self.family).unwrap_or(0.0))
            .sum()
    }

    /// (housing, non-housing) annual totals for the active categories.
    fn split_totals(&self, record: &LocationRecord) -> (f64, f64) {
        let mut housing = 0.0;
        let mut other = 0.0;
        for cat in ExpenseCategory::ALL {
            if self.excluded.contains(&cat) {
                continue;
            }
            let v = record.expense(cat, self.family).unwrap_or(0.0);
            if cat == ExpenseCategory::Housing {
                housing += v;
            } else {
                other += v;
            }
        }
        (housing, other)
    }

    fn engel_model(
        &self,
        income_a: f64,
        adj_a: f64,
        ratio: f64,
        a: &LocationRecord,
        b: &LocationRecord,
    ) -> f64 {
        let (housing_a, non_housing_a) = self.split_totals(a);
        let (housing_b, non_housing_b) = self.split_totals(b);

        let housing_ratio = if housing_a > 0.0 { housing_b / housing_a } else { ratio };
        let non_housing_ratio = if non_housing_a > 0.0 { non_housing_b / non_housing_a } else { ratio };

        let total_a = housing_a + non_housing_a;
        let share_at_anchor = if total_a > 0.0 { housing_a / total_a } else { DEFAULT_HOUSING_SHARE };

        let housing_share = if adj_a > 0.0 && income_a > 0.0 {
            share_at_anchor * (adj_a / income_a).powf(ENGEL_EXPONENT)
        } else {
            share_at_anchor
        };

        income_a * (housing_share * housing_ratio + (1.0 - housing_share) * non_housing_ratio)
    }
}

fn sqrt_model(income_a: f64, adj_a: f64, adj_b: f64, ratio: f64) -> f64 {
    if income_a <= adj_a {
        income_a * ratio
    } else {
        adj_b + (income_a - adj_a) * ratio.sqrt()
    }
}
