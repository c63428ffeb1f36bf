//! Risk score: category weight + country baseline + negative-sentiment penalty.
//!
//! `score = min(penalty + category_risk + country_risk, 100)` where
//! `penalty = max(0, round(-sentiment * 30))`. Pure and total: bad sentiment
//! input degrades to neutral and unknown labels fall back to table defaults.

use serde::Serialize;

use crate::rules::RuleTables;

pub const MAX_RISK_SCORE: u32 = 100;
pub const SENTIMENT_PENALTY_SCALE: f64 = 30.0;

/// Every term of one score, for logs and the `/classify` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskBreakdown {
    pub sentiment_penalty: u32,
    pub category_risk: u32,
    pub country_risk: u32,
    pub raw: u32,
    pub score: u32,
}

/// Risk contribution of sentiment. Only negative sentiment counts.
///
/// Halves round to even (`-0.05 * 30 = -1.5` → 2, `-0.15 * 30 = -4.5` → 4),
/// matching the scores already stored in existing scored batches.
pub fn sentiment_penalty(sentiment: f64) -> u32 {
    let s = if sentiment.is_finite() { sentiment } else { 0.0 };
    let p = (-s * SENTIMENT_PENALTY_SCALE).round_ties_even();
    if p > 0.0 {
        // `as` saturates for out-of-range sentiment inputs
        p as u32
    } else {
        0
    }
}

pub fn risk_breakdown(
    tables: &RuleTables,
    category: &str,
    country: &str,
    sentiment: f64,
) -> RiskBreakdown {
    let sentiment_penalty = sentiment_penalty(sentiment);
    let category_risk = tables.category_risk_for(category);
    let country_risk = tables.country_risk_for(country);
    let raw = sentiment_penalty
        .saturating_add(category_risk)
        .saturating_add(country_risk);
    RiskBreakdown {
        sentiment_penalty,
        category_risk,
        country_risk,
        raw,
        score: raw.min(MAX_RISK_SCORE),
    }
}

pub fn calculate_risk_score(
    tables: &RuleTables,
    category: &str,
    country: &str,
    sentiment: f64,
) -> u32 {
    risk_breakdown(tables, category, country, sentiment).score
}

/// Parse a stored sentiment cell; anything unusable is neutral.
pub fn coerce_sentiment(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{UNCATEGORIZED, UNKNOWN_COUNTRY};

    #[test]
    fn conflict_in_russia_with_negative_news() {
        let t = RuleTables::builtin();
        let b = risk_breakdown(&t, "Conflict / War", "Russia", -0.6);
        assert_eq!(
            b,
            RiskBreakdown {
                sentiment_penalty: 18,
                category_risk: 50,
                country_risk: 15,
                raw: 83,
                score: 83,
            }
        );
    }

    #[test]
    fn no_hits_positive_sentiment() {
        let t = RuleTables::builtin();
        assert_eq!(calculate_risk_score(&t, UNCATEGORIZED, UNKNOWN_COUNTRY, 0.2), 15);
    }

    #[test]
    fn full_negative_below_clamp() {
        let t = RuleTables::builtin();
        assert_eq!(calculate_risk_score(&t, "Conflict / War", "Iran", -1.0), 95);
    }

    #[test]
    fn clamps_at_hundred() {
        let mut t = RuleTables::builtin();
        t.country_risk.insert("Hypothetical".into(), 30);
        let b = risk_breakdown(&t, "Conflict / War", "Hypothetical", -1.0);
        assert_eq!(b.raw, 110);
        assert_eq!(b.score, 100);
    }

    #[test]
    fn penalty_is_one_directional() {
        assert_eq!(sentiment_penalty(-1.0), 30);
        assert_eq!(sentiment_penalty(-0.6), 18);
        assert_eq!(sentiment_penalty(0.0), 0);
        assert_eq!(sentiment_penalty(-0.0), 0);
        assert_eq!(sentiment_penalty(0.01), 0);
        assert_eq!(sentiment_penalty(1.0), 0);
    }

    #[test]
    fn penalty_rounds_half_to_even() {
        assert_eq!(sentiment_penalty(-0.05), 2);
        assert_eq!(sentiment_penalty(-0.25), 8);
        assert_eq!(sentiment_penalty(-0.01), 0);
        assert_eq!(sentiment_penalty(-0.017), 1);
    }

    #[test]
    fn non_finite_sentiment_is_neutral() {
        let t = RuleTables::builtin();
        let base = calculate_risk_score(&t, "Cybersecurity", "China", 0.0);
        assert_eq!(base, 45);
        assert_eq!(calculate_risk_score(&t, "Cybersecurity", "China", f64::NAN), base);
        assert_eq!(
            calculate_risk_score(&t, "Cybersecurity", "China", f64::NEG_INFINITY),
            base
        );
    }

    #[test]
    fn coerce_handles_garbage() {
        assert_eq!(coerce_sentiment(Some("-0.25")), -0.25);
        assert_eq!(coerce_sentiment(Some(" 0.5 ")), 0.5);
        assert_eq!(coerce_sentiment(Some("n/a")), 0.0);
        assert_eq!(coerce_sentiment(Some("NaN")), 0.0);
        assert_eq!(coerce_sentiment(Some("")), 0.0);
        assert_eq!(coerce_sentiment(None), 0.0);
    }

    #[test]
    fn unknown_labels_use_defaults() {
        let t = RuleTables::builtin();
        let b = risk_breakdown(&t, "Not A Category", "Atlantis", 0.0);
        assert_eq!(b.category_risk, 10);
        assert_eq!(b.country_risk, 6);
        assert_eq!(b.score, 16);
    }
}
