//! VADER compound polarity via the `vader_sentiment` crate.

use std::panic::{self, AssertUnwindSafe};

use vader_sentiment::SentimentIntensityAnalyzer;

use super::{SentimentError, SentimentModel};

pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderModel {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaderModel").finish_non_exhaustive()
    }
}

impl SentimentModel for VaderModel {
    fn name(&self) -> &'static str {
        "vader"
    }

    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        // A panic inside the analyzer must only fail this row.
        let scores = panic::catch_unwind(AssertUnwindSafe(|| self.analyzer.polarity_scores(text)))
            .map_err(|payload| SentimentError::Model {
                model: "vader",
                reason: panic_message(payload.as_ref()),
            })?;
        scores
            .get("compound")
            .copied()
            .ok_or_else(|| SentimentError::Model {
                model: "vader",
                reason: "no compound score in result".to_string(),
            })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "analyzer panicked".to_string()
    }
}
