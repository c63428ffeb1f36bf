//! Rule tables: ordered keyword rules plus the weight and sector lookups.
//!
//! Tables are plain immutable values built once at start-up (built-in or from
//! a TOML/JSON file) and handed to the taggers and the risk calculator.
//! Keyword tables are arrays, never maps, so declared order survives loading.
//!
//! TOML shape:
//! ```toml
//! default_category_risk = 10
//! default_country_risk = 6
//!
//! [[countries]]
//! label = "Russia"
//! keywords = ["Russia", "Putin", "Moscow"]
//!
//! [[categories]]
//! label = "Conflict / War"
//! keywords = ["strike", "war"]
//!
//! [sectors]
//! "Conflict / War" = "Defense, Oil & Gas"
//!
//! [category_risk]
//! "Conflict / War" = 50
//!
//! [country_risk]
//! Russia = 15
//! ```

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const GENERAL_SECTOR: &str = "General";

pub const DEFAULT_CATEGORY_RISK: u32 = 10;
pub const DEFAULT_COUNTRY_RISK: u32 = 6;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("reading rules from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing rules from {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("{table} table has a rule with an empty label")]
    EmptyLabel { table: &'static str },
    #[error("{table} rule `{label}` has no usable keywords")]
    EmptyKeywords { table: &'static str, label: String },
    #[error("category keyword `{keyword}` of `{label}` does not compile: {source}")]
    Pattern {
        label: String,
        keyword: String,
        #[source]
        source: regex::Error,
    },
}

/// One label with the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, S>(label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_category_risk() -> u32 {
    DEFAULT_CATEGORY_RISK
}

fn default_country_risk() -> u32 {
    DEFAULT_COUNTRY_RISK
}

/// Process-wide classification and weighting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    /// Weight for categories missing from `category_risk`.
    #[serde(default = "default_category_risk")]
    pub default_category_risk: u32,
    /// Weight for countries missing from `country_risk`.
    #[serde(default = "default_country_risk")]
    pub default_country_risk: u32,
    /// Country rules, first match wins (substring matching).
    pub countries: Vec<KeywordRule>,
    /// Category rules, first match wins (whole-word matching).
    pub categories: Vec<KeywordRule>,
    #[serde(default)]
    pub sectors: HashMap<String, String>,
    #[serde(default)]
    pub category_risk: HashMap<String, u32>,
    #[serde(default)]
    pub country_risk: HashMap<String, u32>,
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleTables {
    /// Load tables from a file. `.json` is parsed as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, RulesError> {
        let content = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str::<RuleTables>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<RuleTables>(&content).map_err(|e| e.to_string())
        };
        let tables = parsed.map_err(|reason| RulesError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        tables.validate()?;

        info!(
            path = %path.display(),
            countries = tables.countries.len(),
            categories = tables.categories.len(),
            "loaded rule tables"
        );
        Ok(tables)
    }

    /// Load from `path` when given, otherwise use the built-in tables.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, RulesError> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Reject rules that could never match or would match everything.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_table("country", &self.countries)?;
        check_table("category", &self.categories)
    }

    pub fn sector_for(&self, category: &str) -> &str {
        self.sectors
            .get(category)
            .map(String::as_str)
            .unwrap_or(GENERAL_SECTOR)
    }

    pub fn category_risk_for(&self, category: &str) -> u32 {
        self.category_risk
            .get(category)
            .copied()
            .unwrap_or(self.default_category_risk)
    }

    pub fn country_risk_for(&self, country: &str) -> u32 {
        self.country_risk
            .get(country)
            .copied()
            .unwrap_or(self.default_country_risk)
    }
}

fn check_table(table: &'static str, rules: &[KeywordRule]) -> Result<(), RulesError> {
    for rule in rules {
        if rule.label.trim().is_empty() {
            return Err(RulesError::EmptyLabel { table });
        }
        // An empty keyword is a substring of every text.
        if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(RulesError::EmptyKeywords {
                table,
                label: rule.label.clone(),
            });
        }
    }
    Ok(())
}
