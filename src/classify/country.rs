//! Country tagging: ordered, case-insensitive substring rules.
//!
//! Substring matching is deliberate so compounds like "Brexit-era Britain" or
//! "Kyiv-based" still hit. The price is that short keywords match inside
//! longer words (`US` inside `Russia`); declared order settles the outcome.

use crate::rules::{KeywordRule, UNKNOWN_COUNTRY};
use crate::text;

#[derive(Debug, Clone)]
pub struct CountryTagger {
    /// `(label, lowercased keywords)` in declared order.
    rules: Vec<(String, Vec<String>)>,
}

impl CountryTagger {
    pub fn new(rules: &[KeywordRule]) -> Self {
        let rules = rules
            .iter()
            .map(|r| {
                let kws = r.keywords.iter().map(|k| text::fold(k)).collect();
                (r.label.clone(), kws)
            })
            .collect();
        Self { rules }
    }

    /// First label with any keyword contained in `input`, else `Unknown`.
    pub fn tag(&self, input: &str) -> &str {
        let haystack = text::fold(input);
        self.rules
            .iter()
            .find(|(_, kws)| kws.iter().any(|k| haystack.contains(k.as_str())))
            .map(|(label, _)| label.as_str())
            .unwrap_or(UNKNOWN_COUNTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTables;

    fn tagger() -> CountryTagger {
        CountryTagger::new(&RuleTables::builtin().countries)
    }

    #[test]
    fn simple_hits() {
        let t = tagger();
        assert_eq!(t.tag("Kremlin says Putin will attend"), "Russia");
        assert_eq!(t.tag("Strikes reported in GAZA overnight"), "Palestine");
        assert_eq!(t.tag("Kishida meets party leaders"), "Japan");
    }

    #[test]
    fn empty_and_unmatched_are_unknown() {
        let t = tagger();
        assert_eq!(t.tag(""), UNKNOWN_COUNTRY);
        assert_eq!(t.tag("Quiet day for markets"), UNKNOWN_COUNTRY);
    }

    #[test]
    fn first_declared_country_wins() {
        let t = tagger();
        assert_eq!(t.tag("Beijing responds to Washington"), "United States");
        assert_eq!(t.tag("Tehran and Kyiv exchange notes"), "Iran");
    }

    #[test]
    fn substring_matches_inside_words() {
        let t = tagger();
        // "us" occurs in "Russia", and United States is declared first.
        assert_eq!(t.tag("Russia expands drills"), "United States");
        assert_eq!(t.tag("Sunak visits Brussels"), "United States");
        assert_eq!(t.tag("Paris hosts France-Germany talks"), "European Union");
    }

    #[test]
    fn custom_order_changes_outcome() {
        let rules = vec![
            KeywordRule::new("Russia", ["Russia"]),
            KeywordRule::new("United States", ["US"]),
        ];
        let t = CountryTagger::new(&rules);
        assert_eq!(t.tag("Russia expands drills"), "Russia");
    }
}
