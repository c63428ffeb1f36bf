// src/config/app.rs
//! Application configuration (`config/geo_risk.toml`).
//!
//! Lookup order:
//! 1) `$GEO_RISK_CONFIG_PATH` (must exist)
//! 2) `config/geo_risk.toml`
//! 3) built-in defaults
//!
//! `GEO_RISK_PORT` and `GEO_RISK_RULES_PATH` override the file afterwards.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::pipeline::FailurePolicy;
use crate::report::{ReportOptions, DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS};
use crate::sentiment::ModelKind;

pub const ENV_CONFIG_PATH: &str = "GEO_RISK_CONFIG_PATH";
pub const ENV_PORT: &str = "GEO_RISK_PORT";
pub const ENV_RULES_PATH: &str = "GEO_RISK_RULES_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/geo_risk.toml";

/// Upper bound for `report.window_days` (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// Placeholder in `paths.input` replaced by the run date (`YYYY-MM-DD`).
const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub sentiment: SentimentConfig,
    pub rules: RulesConfig,
    pub report: ReportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw articles from the fetch step; may contain `{date}`.
    pub input: String,
    pub tagged: PathBuf,
    pub scored: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: "news_data/geopolitical_news_{date}.csv".to_string(),
            tagged: PathBuf::from("news_data/geopolitical_news_tagged.csv"),
            scored: PathBuf::from("news_data/geopolitical_news_scored.csv"),
        }
    }
}

impl PathsConfig {
    pub fn input_for(&self, date: NaiveDate) -> PathBuf {
        PathBuf::from(
            self.input
                .replace(DATE_PLACEHOLDER, &date.format("%Y-%m-%d").to_string()),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub model: ModelKind,
    pub on_failure: FailurePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Optional TOML/JSON rule tables replacing the built-in ones.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub window_days: u32,
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl From<ReportConfig> for ReportOptions {
    fn from(c: ReportConfig) -> Self {
        ReportOptions {
            window_days: c.window_days,
            top_n: c.top_n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve the config file (explicit path, env, default file, defaults)
    /// and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = match explicit {
            Some(p) => Self::load_from(p)?,
            None => Self::load_default()?,
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = env::var(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
        }
        if let Ok(p) = env::var(ENV_RULES_PATH) {
            if !p.trim().is_empty() {
                self.rules.path = Some(PathBuf::from(p));
            }
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        if self.report.window_days == 0 {
            self.report.window_days = DEFAULT_WINDOW_DAYS;
        }
        self.report.window_days = self.report.window_days.min(MAX_WINDOW_DAYS);
        if self.report.top_n == 0 {
            self.report.top_n = DEFAULT_TOP_N;
        }
    }
}
