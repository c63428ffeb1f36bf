//! Row types flowing through the pipeline: raw article → tagged → scored.
//!
//! Records are plain values. Every stage borrows its input and produces a new
//! record, so a batch can be re-processed without side effects.

use serde::{Deserialize, Serialize};

use crate::text;

/// One raw article as delivered by the upstream fetch step.
///
/// Every column is optional: missing CSV cells and absent JSON keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub collected_at: Option<String>,
}

impl ArticleRecord {
    /// Headline-only record.
    pub fn headline(title: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            title: Some(title.into()),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    /// Text the taggers and the sentiment model look at.
    pub fn matching_text(&self) -> String {
        text::matching_text(self.title.as_deref(), self.description.as_deref())
    }
}

/// Article plus classification and sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRecord {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub country: String,
    pub category: String,
    pub sector: String,
    pub sentiment_score: f64,
}

/// Tagged article plus its bounded risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub tagged: TaggedRecord,
    pub risk_score: u32,
}

impl ScoredRecord {
    pub fn title(&self) -> &str {
        self.tagged.article.title.as_deref().unwrap_or_default()
    }

    pub fn country(&self) -> &str {
        &self.tagged.country
    }

    pub fn category(&self) -> &str {
        &self.tagged.category
    }

    pub fn sector(&self) -> &str {
        &self.tagged.sector
    }

    pub fn sentiment_score(&self) -> f64 {
        self.tagged.sentiment_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_text_joins_title_and_description() {
        let rec = ArticleRecord::headline("Missile strike", Some("near the border"));
        assert_eq!(rec.matching_text(), "Missile strike near the border");
    }

    #[test]
    fn missing_parts_become_empty() {
        let rec = ArticleRecord::default();
        assert_eq!(rec.matching_text(), " ");

        let only_desc = ArticleRecord {
            description: Some("Flood warning".into()),
            ..Default::default()
        };
        assert_eq!(only_desc.matching_text(), " Flood warning");
    }

    #[test]
    fn scored_record_serializes_flat() {
        let rec = ScoredRecord {
            tagged: TaggedRecord {
                article: ArticleRecord::headline("t", None),
                country: "Iran".into(),
                category: "Cybersecurity".into(),
                sector: "Tech, Finance".into(),
                sentiment_score: -0.25,
            },
            risk_score: 58,
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["title"], "t");
        assert_eq!(v["country"], "Iran");
        assert_eq!(v["risk_score"], 58);
    }
}
