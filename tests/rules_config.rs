// tests/rules_config.rs
//
// Shipped config files parse, and an override rule file changes tagging.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo_risk::config::AppConfig;
use geo_risk::{calculate_risk_score, Classifier, FailurePolicy, RuleTables, RulesError};

fn repo_file(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

#[test]
fn shipped_app_config_matches_defaults() {
    // The sample config spells out the built-in defaults.
    let cfg = AppConfig::load_from(&repo_file("config/geo_risk.toml")).expect("config parses");
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.sentiment.on_failure, FailurePolicy::Neutral);
    assert_eq!(cfg.server.port, 8000);
}

#[test]
fn example_rules_override_tagging_and_weights() {
    let tables = RuleTables::load_from(&repo_file("config/rules.example.toml")).expect("rules parse");
    let c = Classifier::new(Arc::new(tables.clone())).unwrap();

    let labels = c.classify("Russia launches missile strike amid ceasefire talks");
    assert_eq!(labels.country, "Russia");
    assert_eq!(labels.category, "Conflict / War");
    assert_eq!(labels.sector, "Defense, Oil & Gas");
    assert_eq!(calculate_risk_score(&tables, &labels.category, &labels.country, -0.6), 83);
}

#[test]
fn json_rules_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(
        &path,
        r#"{
            "countries": [{"label": "Chile", "keywords": ["Chile", "Santiago"]}],
            "categories": [{"label": "Mining", "keywords": ["copper"]}],
            "category_risk": {"Mining": 20}
        }"#,
    )
    .unwrap();

    let tables = RuleTables::load_or_builtin(Some(&path)).unwrap();
    let c = Classifier::new(Arc::new(tables.clone())).unwrap();
    assert_eq!(c.tag_country("Santiago copper strike"), "Chile");
    assert_eq!(c.tag_category("Santiago copper strike"), "Mining");
    // No sector map and no country weight: General + default 6
    assert_eq!(c.tag_sector("Mining"), "General");
    assert_eq!(calculate_risk_score(&tables, "Mining", "Chile", 0.0), 26);
}

#[test]
fn blank_keywords_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(
        &path,
        "[[countries]]\nlabel = \"Nowhere\"\nkeywords = [\" \"]\n\n[[categories]]\nlabel = \"X\"\nkeywords = [\"x\"]\n",
    )
    .unwrap();

    let err = RuleTables::load_from(&path).unwrap_err();
    assert!(matches!(err, RulesError::EmptyKeywords { table: "country", .. }));
}

#[test]
fn missing_rules_file_is_an_io_error() {
    let err = RuleTables::load_or_builtin(Some(Path::new("does/not/exist.toml"))).unwrap_err();
    assert!(matches!(err, RulesError::Io { .. }));
}
