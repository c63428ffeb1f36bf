//! Built-in rule tables for English-language geopolitical news.
//!
//! Declaration order is the tie-break policy of both taggers: when a headline
//! mentions two countries (or two categories), the entry listed first wins.

use std::collections::HashMap;

use super::{
    KeywordRule, RuleTables, DEFAULT_CATEGORY_RISK, DEFAULT_COUNTRY_RISK, UNCATEGORIZED,
    UNKNOWN_COUNTRY,
};

const COUNTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("United States", &["US", "America", "Biden", "Trump", "Washington"]),
    ("China", &["China", "Beijing", "Xi Jinping"]),
    ("Russia", &["Russia", "Putin", "Moscow"]),
    ("India", &["India", "Modi", "Delhi"]),
    ("Iran", &["Iran", "Tehran"]),
    ("Ukraine", &["Ukraine", "Kyiv"]),
    ("Israel", &["Israel", "Netanyahu"]),
    ("Palestine", &["Palestine", "Gaza"]),
    ("UK", &["UK", "Britain", "London", "Sunak"]),
    (
        "European Union",
        &["EU", "Brussels", "France", "Germany", "Italy", "Spain"],
    ),
    (
        "Middle East",
        &["Middle East", "Syria", "Lebanon", "Iraq", "Yemen"],
    ),
    ("South Korea", &["South Korea", "Seoul"]),
    ("North Korea", &["North Korea", "Kim Jong Un", "Pyongyang"]),
    ("Japan", &["Japan", "Tokyo", "Kishida"]),
    ("Canada", &["Canada", "Ottawa", "Trudeau"]),
    ("Australia", &["Australia", "Canberra", "Albanese"]),
];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Political Instability",
        &["election", "vote", "resign", "protest", "coup"],
    ),
    (
        "Conflict / War",
        &["strike", "war", "conflict", "missile", "airstrike", "military"],
    ),
    (
        "Civil Unrest / Terror",
        &["riot", "terrorist", "unrest", "bombing"],
    ),
    (
        "Sanctions / Trade",
        &["sanctions", "tariff", "embargo", "trade war", "ban", "import", "export"],
    ),
    (
        "Cybersecurity",
        &["cyberattack", "hack", "espionage", "malware"],
    ),
    (
        "Energy Disruption",
        &["opec", "oil", "gas", "pipeline", "energy prices"],
    ),
    (
        "Natural Disaster",
        &["earthquake", "flood", "wildfire", "drought", "storm"],
    ),
    (
        "Health / Pandemic",
        &["covid", "pandemic", "virus", "outbreak", "quarantine"],
    ),
    (
        "Currency / Financial",
        &[
            "inflation",
            "interest rate",
            "currency",
            "devaluation",
            "rate hike",
            "market crash",
        ],
    ),
    (
        "Alliances / Treaties",
        &["nato", "treaty", "un", "brics", "summit"],
    ),
    (
        "Migration Crisis",
        &["refugee", "asylum", "border", "migration"],
    ),
    (
        "Tech Regulation",
        &["ban tiktok", "ai ethics", "chip ban", "5g ban", "semiconductor"],
    ),
];

const CATEGORY_SECTORS: &[(&str, &str)] = &[
    ("Political Instability", "Government, Banking"),
    ("Conflict / War", "Defense, Oil & Gas"),
    ("Civil Unrest / Terror", "Insurance, Travel"),
    ("Sanctions / Trade", "Manufacturing, Tech"),
    ("Cybersecurity", "Tech, Finance"),
    ("Energy Disruption", "Energy, Airlines"),
    ("Natural Disaster", "Insurance, Agriculture"),
    ("Health / Pandemic", "Healthcare, Pharma"),
    ("Currency / Financial", "Banking, Forex"),
    ("Alliances / Treaties", "Government, Defense"),
    ("Migration Crisis", "Infrastructure, Housing"),
    ("Tech Regulation", "Technology, Telecom"),
];

const CATEGORY_RISK: &[(&str, u32)] = &[
    ("Conflict / War", 50),
    ("Civil Unrest / Terror", 45),
    ("Sanctions / Trade", 40),
    ("Cybersecurity", 35),
    ("Political Instability", 30),
    ("Energy Disruption", 30),
    ("Health / Pandemic", 25),
    ("Currency / Financial", 25),
    ("Natural Disaster", 25),
    ("Migration Crisis", 20),
    ("Alliances / Treaties", 15),
    ("Tech Regulation", 15),
    (UNCATEGORIZED, 10),
];

const COUNTRY_BASELINE: &[(&str, u32)] = &[
    ("Russia", 15),
    ("Ukraine", 15),
    ("Iran", 15),
    ("Israel", 15),
    ("Middle East", 15),
    ("Palestine", 15),
    ("China", 10),
    ("India", 10),
    ("United States", 8),
    ("European Union", 8),
    ("UK", 7),
    (UNKNOWN_COUNTRY, 5),
];

fn rules(table: &[(&str, &[&str])]) -> Vec<KeywordRule> {
    table
        .iter()
        .map(|(label, keywords)| KeywordRule::new(*label, keywords.iter().copied()))
        .collect()
}

fn map<V: Copy>(table: &[(&str, V)]) -> HashMap<String, V> {
    table.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl RuleTables {
    /// Built-in tables; used whenever no rules file is configured.
    pub fn builtin() -> Self {
        Self {
            default_category_risk: DEFAULT_CATEGORY_RISK,
            default_country_risk: DEFAULT_COUNTRY_RISK,
            countries: rules(COUNTRY_KEYWORDS),
            categories: rules(CATEGORY_KEYWORDS),
            sectors: CATEGORY_SECTORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            category_risk: map(CATEGORY_RISK),
            country_risk: map(COUNTRY_BASELINE),
        }
    }
}
