//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The namespace a location code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Metro,
    County,
    State,
}

impl LocationKind {
    pub const ALL: [LocationKind; 3] = [Self::Metro, Self::County, Self::State];

    /// URL path segment of the source endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Metro => "metros",
            Self::County => "counties",
            Self::State => "states",
        }
    }

    /// Command-line flag that addresses this namespace by code.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Metro => "--metros",
            Self::County => "--counties",
            Self::State => "--states",
        }
    }

    pub fn group_label(self) -> &'static str {
        match self {
            Self::Metro => "Metro Areas",
            Self::County => "Counties",
            Self::State => "States",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metro => write!(f, "metro"),
            Self::County => write!(f, "county"),
            Self::State => write!(f, "state"),
        }
    }
}

/// A location identified by namespace and code (CBSA or FIPS).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDescriptor {
    pub kind: LocationKind,
    pub code: String,
    pub name: String,
}

impl LocationDescriptor {
    pub fn new(kind: LocationKind, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind, code: code.into(), name: name.into() }
    }
}

/// Candidates grouped by namespace, in metro, county, state order.
/// Empty groups are omitted.
pub fn group_by_kind(candidates: &[LocationDescriptor]) -> Vec<(LocationKind, Vec<&LocationDescriptor>)> {
    LocationKind::ALL
        .iter()
        .map(|kind| (*kind, candidates.iter().filter(|c| c.kind == *kind).collect::<Vec<_>>()))
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Location resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No location found matching '{term}'.\nUse --list to see available locations, or provide codes directly.")]
    NotFound { term: String },
    /// The disambiguation policy could not narrow the matches to one.
    #[error("{}", render_ambiguous(.term, .candidates))]
    Ambiguous {
        term: String,
        candidates: Vec<LocationDescriptor>,
    },
}

impl ResolveError {
    /// Ambiguous candidates, empty for `NotFound`.
    pub fn candidates(&self) -> &[LocationDescriptor] {
        match self {
            Self::NotFound { .. } => &[],
            Self::Ambiguous { candidates, .. } => candidates,
        }
    }
}

fn render_ambiguous(term: &str, candidates: &[LocationDescriptor]) -> String {
    let mut out = format!("Multiple locations match '{}':\n", term);
    for (kind, group) in group_by_kind(candidates) {
        out.push_str(&format!("\n  {}:\n", kind.group_label()));
        for c in group {
            out.push_str(&format!("    {} {}  {}\n", kind.flag(), c.code, c.name));
        }
    }
    out.push_str("\nTip: use --metros, --counties, or --states with the codes above.");
    out
}

/// Name table loading errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Database file not found: {path}")]
    NotFound { path: String },
    #[error("Cannot read database file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in database file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Document retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Connection error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("Error fetching {url}: HTTP {code}")]
    Status { url: String, code: u16 },
    #[error("Unreadable response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
