//! Batch orchestration: article → tagged → scored, row by row.
//!
//! Stages mirror the two steps of the nightly job: `tag_batch` classifies and
//! scores sentiment, `score_batch` adds the risk score. `process_batch` runs
//! both. Output order always equals input order; sorting by risk is a caller
//! concern (`sort_by_risk_desc`).

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::Classifier;
use crate::record::{ArticleRecord, ScoredRecord, TaggedRecord};
use crate::risk::{self, RiskBreakdown};
use crate::rules::{RuleTables, RulesError, UNCATEGORIZED, UNKNOWN_COUNTRY};
use crate::sentiment::{SentimentError, SentimentScorer};

/// What to do when the sentiment model fails on a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Score the row as neutral (0.0) and keep going.
    #[default]
    Neutral,
    /// Fail the whole batch.
    Abort,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sentiment failed on row {row}: {source}")]
    Sentiment {
        row: usize,
        #[source]
        source: SentimentError,
    },
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_rows_total", "Rows tagged by the pipeline.");
        describe_counter!(
            "pipeline_sentiment_failures_total",
            "Rows where the sentiment model failed."
        );
        describe_counter!(
            "pipeline_unknown_country_total",
            "Rows without any country keyword hit."
        );
        describe_counter!(
            "pipeline_uncategorized_total",
            "Rows without any category keyword hit."
        );
        describe_histogram!("pipeline_risk_score", "Distribution of computed risk scores.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when a batch was last processed."
        );
    });
}

/// Result of classifying a single headline, as served by `/classify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub country: String,
    pub category: String,
    pub sector: String,
    pub sentiment_score: f64,
    pub risk: RiskBreakdown,
}

pub struct Pipeline {
    classifier: Classifier,
    scorer: SentimentScorer,
    policy: FailurePolicy,
}

impl Pipeline {
    pub fn new(tables: Arc<RuleTables>, scorer: SentimentScorer) -> Result<Self, RulesError> {
        Ok(Self {
            classifier: Classifier::new(tables)?,
            scorer,
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn tables(&self) -> &RuleTables {
        self.classifier.tables()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Sentiment for one row, with the failure policy applied.
    fn sentiment_for(&self, row: usize, text: &str) -> Result<f64, PipelineError> {
        match self.scorer.score(Some(text)) {
            Ok(s) => Ok(s),
            Err(source) => {
                counter!("pipeline_sentiment_failures_total").increment(1);
                match self.policy {
                    FailurePolicy::Neutral => {
                        warn!(row, error = %source, "sentiment failed; scoring row as neutral");
                        Ok(0.0)
                    }
                    FailurePolicy::Abort => Err(PipelineError::Sentiment { row, source }),
                }
            }
        }
    }

    pub fn tag_record(&self, row: usize, rec: &ArticleRecord) -> Result<TaggedRecord, PipelineError> {
        let text = rec.matching_text();
        let labels = self.classifier.classify(&text);
        let sentiment_score = self.sentiment_for(row, &text)?;

        if labels.country == UNKNOWN_COUNTRY {
            counter!("pipeline_unknown_country_total").increment(1);
        }
        if labels.category == UNCATEGORIZED {
            counter!("pipeline_uncategorized_total").increment(1);
        }

        Ok(TaggedRecord {
            article: rec.clone(),
            country: labels.country,
            category: labels.category,
            sector: labels.sector,
            sentiment_score,
        })
    }

    pub fn score_record(&self, rec: &TaggedRecord) -> ScoredRecord {
        let b = risk::risk_breakdown(
            self.tables(),
            &rec.category,
            &rec.country,
            rec.sentiment_score,
        );
        histogram!("pipeline_risk_score").record(f64::from(b.score));
        ScoredRecord {
            tagged: rec.clone(),
            risk_score: b.score,
        }
    }

    pub fn tag_batch(&self, records: &[ArticleRecord]) -> Result<Vec<TaggedRecord>, PipelineError> {
        ensure_metrics_described();
        let tagged = records
            .iter()
            .enumerate()
            .map(|(row, rec)| self.tag_record(row, rec))
            .collect::<Result<Vec<_>, _>>()?;
        counter!("pipeline_rows_total").increment(tagged.len() as u64);
        debug!(rows = tagged.len(), model = self.scorer.model_name(), "tagged batch");
        Ok(tagged)
    }

    pub fn score_batch(&self, records: &[TaggedRecord]) -> Vec<ScoredRecord> {
        ensure_metrics_described();
        let scored: Vec<ScoredRecord> = records.iter().map(|r| self.score_record(r)).collect();
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        scored
    }

    /// Tag and score every record. Same length and order as `records`.
    pub fn process_batch(
        &self,
        records: &[ArticleRecord],
    ) -> Result<Vec<ScoredRecord>, PipelineError> {
        let tagged = self.tag_batch(records)?;
        Ok(self.score_batch(&tagged))
    }

    /// Tag and score a single headline without building records for the caller.
    pub fn assess(&self, title: Option<&str>, description: Option<&str>) -> Result<Assessment, PipelineError> {
        ensure_metrics_described();
        let rec = ArticleRecord {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            ..Default::default()
        };
        let tagged = self.tag_record(0, &rec)?;
        let risk = risk::risk_breakdown(
            self.tables(),
            &tagged.category,
            &tagged.country,
            tagged.sentiment_score,
        );
        Ok(Assessment {
            country: tagged.country,
            category: tagged.category,
            sector: tagged.sector,
            sentiment_score: tagged.sentiment_score,
            risk,
        })
    }
}

/// Stable sort, highest risk first.
pub fn sort_by_risk_desc(rows: &mut [ScoredRecord]) {
    rows.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentModel;

    struct Fixed(f64);

    impl SentimentModel for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn polarity(&self, _text: &str) -> Result<f64, SentimentError> {
            Ok(self.0)
        }
    }

    /// Fails on any text containing "boom".
    struct Flaky;

    impl SentimentModel for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }
        fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
            if text.contains("boom") {
                Err(SentimentError::Model {
                    model: "flaky",
                    reason: "backend unavailable".into(),
                })
            } else {
                Ok(-0.5)
            }
        }
    }

    fn pipeline(model: impl SentimentModel + 'static) -> Pipeline {
        Pipeline::new(Arc::new(RuleTables::builtin()), SentimentScorer::new(model)).unwrap()
    }

    fn article(title: &str) -> ArticleRecord {
        ArticleRecord::headline(title, None)
    }

    #[test]
    fn preserves_length_and_order() {
        let p = pipeline(Fixed(0.0));
        let input = vec![
            article("Flood hits Delhi"),
            article("Nothing to see"),
            article("Cyberattack on Tokyo bank"),
        ];
        let out = p.process_batch(&input).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].country(), "India");
        assert_eq!(out[1].country(), UNKNOWN_COUNTRY);
        assert_eq!(out[2].category(), "Cybersecurity");
        for (i, o) in input.iter().zip(&out) {
            assert_eq!(i, &o.tagged.article);
        }
    }

    #[test]
    fn neutral_policy_isolates_failures() {
        let p = pipeline(Flaky);
        let out = p
            .process_batch(&[article("boom in Gaza"), article("Protest in Seoul")])
            .unwrap();
        assert_eq!(out[0].sentiment_score(), 0.0);
        assert_eq!(out[1].sentiment_score(), -0.5);
        // penalty round(0.5 * 30) = 15; Political Instability 30; South Korea default 6
        assert_eq!(out[1].risk_score, 51);
    }

    #[test]
    fn abort_policy_reports_row() {
        let p = pipeline(Flaky).with_policy(FailurePolicy::Abort);
        let err = p
            .process_batch(&[article("calm"), article("boom")])
            .unwrap_err();
        let PipelineError::Sentiment { row, .. } = err;
        assert_eq!(row, 1);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let p = pipeline(Fixed(0.0));
        let mut out = p
            .process_batch(&[
                article("quiet one"),
                article("Missile test near Kyiv"),
                article("quiet two"),
            ])
            .unwrap();
        sort_by_risk_desc(&mut out);
        assert_eq!(out[0].category(), "Conflict / War");
        assert_eq!(out[1].title(), "quiet one");
        assert_eq!(out[2].title(), "quiet two");
    }

    #[test]
    fn assess_reports_breakdown() {
        let p = pipeline(Fixed(-0.6));
        let a = p.assess(Some("Missile strike near Kyiv"), None).unwrap();
        assert_eq!(a.country, "Ukraine");
        assert_eq!(a.category, "Conflict / War");
        assert_eq!(a.sector, "Defense, Oil & Gas");
        assert_eq!(a.risk.sentiment_penalty, 18);
        assert_eq!(a.risk.score, 83);
    }
}
