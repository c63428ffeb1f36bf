// src/lib.rs
// Public library surface for the `geo-risk` binary and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod risk;
pub mod rules;
pub mod sentiment;
pub mod store;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classify::{Classification, Classifier};
pub use crate::pipeline::{Assessment, FailurePolicy, Pipeline, PipelineError};
pub use crate::record::{ArticleRecord, ScoredRecord, TaggedRecord};
pub use crate::risk::calculate_risk_score;
pub use crate::rules::{KeywordRule, RuleTables, RulesError};
pub use crate::sentiment::{SentimentError, SentimentModel, SentimentScorer};
