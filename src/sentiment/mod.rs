//! Sentiment scoring over an external polarity capability.
//!
//! A [`SentimentModel`] turns text into a compound polarity in [-1, 1]. The
//! [`SentimentScorer`] owns one model and applies the pipeline conventions:
//! missing text is neutral without touching the model, results are clamped
//! and rounded to 3 decimals, and a model failure is reported for that call
//! only.

pub mod lexicon;
pub mod vader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use lexicon::LexiconModel;
pub use vader::VaderModel;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("sentiment model `{model}` failed: {reason}")]
    Model { model: &'static str, reason: String },
    #[error("sentiment model `{model}` returned non-finite polarity {value}")]
    NonFinite { model: &'static str, value: f64 },
}

/// Text → compound polarity. Implementations must be shareable across threads.
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &'static str;
    fn polarity(&self, text: &str) -> Result<f64, SentimentError>;
}

/// Which model the application should build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Vader,
    Lexicon,
}

pub struct SentimentScorer {
    model: Box<dyn SentimentModel>,
}

impl SentimentScorer {
    pub fn new(model: impl SentimentModel + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    pub fn from_kind(kind: ModelKind) -> Result<Self, SentimentError> {
        Ok(match kind {
            ModelKind::Vader => Self::new(VaderModel::new()),
            ModelKind::Lexicon => Self::new(LexiconModel::builtin()?),
        })
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Neutral `0.0` for `None`; otherwise the model's polarity, clamped to
    /// [-1, 1] and rounded to 3 decimals.
    pub fn score(&self, text: Option<&str>) -> Result<f64, SentimentError> {
        let Some(text) = text else {
            return Ok(0.0);
        };
        let raw = self.model.polarity(text)?;
        if !raw.is_finite() {
            return Err(SentimentError::NonFinite {
                model: self.model.name(),
                value: raw,
            });
        }
        Ok(round3(raw.clamp(-1.0, 1.0)))
    }
}

/// Round to 3 decimals by the exact decimal value of `x`, ties to even.
///
/// `-0.9365` is stored as slightly less than its literal in magnitude and
/// rounds to `-0.936`, the same as the scores already in stored batches.
pub fn round3(x: f64) -> f64 {
    format!("{x:.3}").parse().unwrap_or(x)
}
