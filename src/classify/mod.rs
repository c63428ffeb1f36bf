// src/classify/mod.rs
//! Keyword classification: country, category and sector for one text.

pub mod category;
pub mod country;
pub mod sector;

use serde::Serialize;
use std::sync::Arc;

pub use category::CategoryTagger;
pub use country::CountryTagger;
pub use sector::tag_sector;

use crate::rules::{RuleTables, RulesError};

/// Labels assigned to one text. Each field holds exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub country: String,
    pub category: String,
    pub sector: String,
}

/// Both taggers compiled from one set of tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    tables: Arc<RuleTables>,
    country: CountryTagger,
    category: CategoryTagger,
}

impl Classifier {
    pub fn new(tables: Arc<RuleTables>) -> Result<Self, RulesError> {
        tables.validate()?;
        let country = CountryTagger::new(&tables.countries);
        let category = CategoryTagger::new(&tables.categories)?;
        Ok(Self {
            tables,
            country,
            category,
        })
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn tag_country(&self, text: &str) -> &str {
        self.country.tag(text)
    }

    pub fn tag_category(&self, text: &str) -> &str {
        self.category.tag(text)
    }

    pub fn tag_sector(&self, category: &str) -> &str {
        tag_sector(&self.tables, category)
    }

    pub fn classify(&self, text: &str) -> Classification {
        let category = self.tag_category(text);
        Classification {
            country: self.tag_country(text).to_string(),
            category: category.to_string(),
            sector: self.tag_sector(category).to_string(),
        }
    }
}
