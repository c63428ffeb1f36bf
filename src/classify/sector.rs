//! Category → economic sector lookup.

use crate::rules::RuleTables;

/// Sector label(s) for `category`; `General` when the table has no entry.
pub fn tag_sector<'a>(tables: &'a RuleTables, category: &str) -> &'a str {
    tables.sector_for(category)
}
