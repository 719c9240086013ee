//! Static code → name tables for metros, counties and states.
//!
//! Loaded once at startup from a JSON file shaped like
//! `{"metros": {code: name}, "counties": {...}, "states": {...}}` and
//! read-only afterwards. Missing sections default to empty.

use super::types::{LocationKind, TableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DATABASE_FILE: &str = "locations_v1.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameTables {
    #[serde(default)]
    pub metros: BTreeMap<String, String>,
    #[serde(default)]
    pub counties: BTreeMap<String, String>,
    #[serde(default)]
    pub states: BTreeMap<String, String>,
}

impl NameTables {
    /// Load tables from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, TableError> {
        let display = path.display().to_string();
        let data = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TableError::NotFound { path: display.clone() },
            _ => TableError::Io { path: display.clone(), source: e },
        })?;
        serde_json::from_str(&data).map_err(|e| TableError::Parse { path: display, source: e })
    }

    /// `~/.col-compare/locations_v1.json` when present, otherwise
    /// `database/locations_v1.json` under the working directory.
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().map(|h| h.join(".col-compare").join(DATABASE_FILE));
        match home {
            Some(p) if p.is_file() => p,
            _ => PathBuf::from("database").join(DATABASE_FILE),
        }
    }

    pub fn entries(&self, kind: LocationKind) -> &BTreeMap<String, String> {
        match kind {
            LocationKind::Metro => &self.metros,
            LocationKind::County => &self.counties,
            LocationKind::State => &self.states,
        }
    }

    pub fn name_of(&self, kind: LocationKind, code: &str) -> Option<&str> {
        self.entries(kind).get(code).map(String::as_str)
    }

    /// Entries of one namespace sorted by display name.
    pub fn sorted_by_name(&self, kind: LocationKind) -> Vec<(&str, &str)> {
        let mut v: Vec<(&str, &str)> = self
            .entries(kind)
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
            .collect();
        v.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
        v
    }

    pub fn len(&self) -> usize {
        self.metros.len() + self.counties.len() + self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
