//! Category tagging: ordered, case-insensitive whole-word rules.

use regex::Regex;

use crate::rules::{KeywordRule, RulesError, UNCATEGORIZED};
use crate::text;

#[derive(Debug, Clone)]
pub struct CategoryTagger {
    rules: Vec<(String, Vec<Regex>)>,
}

impl CategoryTagger {
    /// Compile one `\b<keyword>\b` pattern per keyword. Keywords are escaped,
    /// so phrases match exactly as written.
    pub fn new(rules: &[KeywordRule]) -> Result<Self, RulesError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut patterns = Vec::with_capacity(rule.keywords.len());
            for kw in &rule.keywords {
                let pattern = format!(r"\b{}\b", regex::escape(&text::fold(kw)));
                let re = Regex::new(&pattern).map_err(|source| RulesError::Pattern {
                    label: rule.label.clone(),
                    keyword: kw.clone(),
                    source,
                })?;
                patterns.push(re);
            }
            compiled.push((rule.label.clone(), patterns));
        }
        Ok(Self { rules: compiled })
    }

    /// First label with a whole-word keyword hit, else `Uncategorized`.
    pub fn tag(&self, input: &str) -> &str {
        let haystack = text::fold(input);
        self.rules
            .iter()
            .find(|(_, res)| res.iter().any(|re| re.is_match(&haystack)))
            .map(|(label, _)| label.as_str())
            .unwrap_or(UNCATEGORIZED)
    }
}
