//! Offline word-lexicon sentiment model.
//!
//! Each token carries an integer valence from `sentiment_lexicon.json`. A
//! negator within the previous three tokens flips the sign. The summed score
//! is squashed into a compound polarity with `s / sqrt(s² + 15)`, the same
//! normalization VADER uses, so both models share one scale.

use std::collections::HashMap;

use super::{SentimentError, SentimentModel};

const LEXICON_JSON: &str = include_str!("../../sentiment_lexicon.json");
const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone)]
pub struct LexiconModel {
    lexicon: HashMap<String, i32>,
}

impl LexiconModel {
    /// Model over the lexicon bundled with the crate.
    pub fn builtin() -> Result<Self, SentimentError> {
        let lexicon = serde_json::from_str::<HashMap<String, i32>>(LEXICON_JSON).map_err(|e| {
            SentimentError::Model {
                model: "lexicon",
                reason: format!("bundled lexicon is invalid: {e}"),
            }
        })?;
        Ok(Self { lexicon })
    }

    pub fn from_map(lexicon: HashMap<String, i32>) -> Self {
        let lexicon = lexicon
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { lexicon }
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        self.lexicon.get(w).copied().unwrap_or(0)
    }

    /// Returns (raw score, token count).
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        // Indexed access: negation looks back over previous tokens.
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for (i, w) in tokens.iter().enumerate() {
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }
            let negated =
                (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

impl SentimentModel for LexiconModel {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let (score, _) = self.score_text(text);
        Ok(normalize(score))
    }
}

fn normalize(score: i32) -> f64 {
    let s = f64::from(score);
    s / (s * s + NORMALIZATION_ALPHA).sqrt()
}

/// Lowercased alphanumeric tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "fails"
    )
}
