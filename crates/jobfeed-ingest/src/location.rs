//! Location code resolution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use jobfeed_core::error::{AppError, ErrorKind};
use jobfeed_core::result::AppResult;

use crate::text::standalone_matches;

/// Letter prefix followed by digits, e.g. `C12` or `sh3`.
static CODE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z]+[0-9]+").expect("location code regex is valid"));

/// Read-only mapping from location codes (e.g. `C12`) to display names.
///
/// Keys are stored upper-cased so lookups ignore the case the exporter
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTable {
    entries: HashMap<String, String>,
}

impl LocationTable {
    /// Load the table from a JSON object file such as `{"C12": "Shanghai"}`.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to read location table '{}'", path.display()),
                e,
            )
        })?;
        let table = Self::from_json(&raw)?;
        debug!(path = %path.display(), entries = table.len(), "Loaded location table");
        Ok(table)
    }

    /// Parse the table from JSON text.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(entries.into_iter().collect())
    }

    /// Display name for `code`, if the table knows it.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.entries
            .get(&code.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Resolve a raw location string.
    ///
    /// Only the first standalone code token is considered; hits glued to an
    /// ASCII letter or digit are skipped, so `ABC12D C12` resolves `C12`.
    /// When the table
    /// knows it, the whole string is replaced by the table value; otherwise
    /// the raw string is returned unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        standalone_matches(&CODE_TOKEN, raw)
            .next()
            .and_then(|token| self.lookup(token.as_str()))
            .map_or_else(|| raw.to_string(), str::to_string)
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for LocationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_ascii_uppercase(), v.into()))
                .collect(),
        }
    }
}
