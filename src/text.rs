//! Text normalization shared by the taggers.
//!
//! Matching is done on a lowercased copy of `title + " " + description`.
//! Nothing else is stripped or collapsed: whitespace and punctuation stay as
//! published, because phrase keywords like `trade war` are matched verbatim.

/// Build the text used for keyword matching and sentiment.
///
/// Missing parts are treated as empty strings; the separating space is
/// always present.
pub fn matching_text(title: Option<&str>, description: Option<&str>) -> String {
    let title = title.unwrap_or_default();
    let description = description.unwrap_or_default();
    let mut out = String::with_capacity(title.len() + description.len() + 1);
    out.push_str(title);
    out.push(' ');
    out.push_str(description);
    out
}

/// Unicode-aware lowercase used on both sides of every comparison.
#[inline]
pub fn fold(s: &str) -> String {
    s.to_lowercase()
}
