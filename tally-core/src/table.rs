//! Per-institution header and category lookup tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Static lookups for one institution, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationTable {
    /// Source column name -> canonical column name
    #[serde(default, alias = "headerNormalization")]
    pub header_normalization: BTreeMap<String, String>,
    /// Free-text category -> canonical category
    #[serde(default)]
    pub categorize: BTreeMap<String, String>,
}

impl NormalizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style header mapping, mostly for tests and defaults.
    pub fn with_header(mut self, source: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.header_normalization.insert(source.into(), canonical.into());
        self
    }

    pub fn with_category(mut self, raw: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.categorize.insert(raw.into(), canonical.into());
        self
    }

    pub fn canonical_key(&self, source: &str) -> Option<&str> {
        self.header_normalization.get(source).map(String::as_str)
    }

    /// Canonical key for `source`, or `source` itself when unmapped.
    pub fn canonical_key_or_source<'a>(&'a self, source: &'a str) -> &'a str {
        self.canonical_key(source).unwrap_or(source)
    }

    pub fn category(&self, raw: &str) -> Option<&str> {
        self.categorize.get(raw).map(String::as_str)
    }

    /// Categorized value, falling back to the raw value.
    pub fn categorize_or_raw<'a>(&'a self, raw: &'a str) -> &'a str {
        self.category(raw).unwrap_or(raw)
    }
}
