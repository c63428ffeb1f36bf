//! # Dashboard report
//! Rolling-window aggregation over scored articles (default: last 7 days).
//!
//! The window ends on the latest publication date present in the data, not
//! on "today", so a stale file still yields a full week. Rows whose
//! `published_at` cannot be parsed are left out, like the dashboard does.
//! Rendering is someone else's job; this module only produces numbers.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::record::ScoredRecord;
use crate::risk::MAX_RISK_SCORE;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const DEFAULT_TOP_N: usize = 15;
pub const HISTOGRAM_BINS: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub window_days: u32,
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Country / category selection. `None` selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub countries: Option<BTreeSet<String>>,
    pub categories: Option<BTreeSet<String>>,
}

impl ReportFilter {
    fn admits(&self, row: &ScoredRecord) -> bool {
        let country_ok = self
            .countries
            .as_ref()
            .map_or(true, |set| set.contains(row.country()));
        let category_ok = self
            .categories
            .as_ref()
            .map_or(true, |set| set.contains(row.category()));
        country_ok && category_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub avg_risk: f64,
    pub avg_sentiment: f64,
    pub article_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRisk {
    pub country: String,
    pub avg_risk: f64,
    pub article_count: usize,
}

/// Sector × country mean risk; `values[sector][country]`, empty cells are 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: u32,
    pub upper: u32,
    pub counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopArticle {
    pub published_at: Option<String>,
    pub title: String,
    pub country: String,
    pub category: String,
    pub sector: String,
    pub risk_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub article_count: usize,
    pub country_count: usize,
    /// Mean risk rounded to 2 decimals; `None` when the window is empty.
    pub avg_risk: Option<f64>,
    pub available_countries: Vec<String>,
    pub available_categories: Vec<String>,
    pub daily: Vec<DailyPoint>,
    pub by_country: Vec<CountryRisk>,
    pub heatmap: Heatmap,
    pub histogram: Vec<HistogramBin>,
    pub top: Vec<TopArticle>,
}

/// Calendar date of a publication timestamp.
///
/// Accepts RFC 3339 (date taken in the timestamp's own offset), naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`, or a bare date.
pub fn published_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Rows inside the window that pass the filter, with their dates, plus the
/// window bounds. Bounds are `None` when no row has a parseable date.
pub fn window_rows<'a>(
    rows: &'a [ScoredRecord],
    filter: &ReportFilter,
    window_days: u32,
) -> (Option<(NaiveDate, NaiveDate)>, Vec<(NaiveDate, &'a ScoredRecord)>) {
    let dated: Vec<(NaiveDate, &ScoredRecord)> = rows
        .iter()
        .filter_map(|r| {
            r.tagged
                .article
                .published_at
                .as_deref()
                .and_then(published_date)
                .map(|d| (d, r))
        })
        .collect();

    let Some(end) = dated.iter().map(|(d, _)| *d).max() else {
        return (None, Vec::new());
    };
    let span = i64::from(window_days.max(1)) - 1;
    // A window reaching before chrono's first date covers everything.
    let start = end
        .checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN);

    let selected = dated
        .into_iter()
        .filter(|(d, r)| *d >= start && *d <= end && filter.admits(r))
        .collect();
    (Some((start, end)), selected)
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Highest risk first; ties keep input order.
pub fn top_articles<'a>(rows: impl IntoIterator<Item = &'a ScoredRecord>, n: usize) -> Vec<TopArticle> {
    let mut v: Vec<&ScoredRecord> = rows.into_iter().collect();
    v.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    v.into_iter()
        .take(n)
        .map(|r| TopArticle {
            published_at: r.tagged.article.published_at.clone(),
            title: r.title().to_string(),
            country: r.country().to_string(),
            category: r.category().to_string(),
            sector: r.sector().to_string(),
            risk_score: r.risk_score,
        })
        .collect()
}

fn histogram<'a>(rows: impl Iterator<Item = &'a ScoredRecord>) -> Vec<HistogramBin> {
    let width = MAX_RISK_SCORE / HISTOGRAM_BINS;
    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: i * width,
            upper: (i + 1) * width,
            counts: BTreeMap::new(),
        })
        .collect();
    for r in rows {
        // last bin is closed so a score of 100 lands in it
        let idx = (r.risk_score / width).min(HISTOGRAM_BINS - 1) as usize;
        *bins[idx].counts.entry(r.category().to_string()).or_default() += 1;
    }
    bins
}

fn heatmap(rows: &[(NaiveDate, &ScoredRecord)]) -> Heatmap {
    let mut cells: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    let mut sectors = BTreeSet::new();
    let mut countries = BTreeSet::new();
    for (_, r) in rows {
        sectors.insert(r.sector());
        countries.insert(r.country());
        let e = cells.entry((r.sector(), r.country())).or_default();
        e.0 += f64::from(r.risk_score);
        e.1 += 1;
    }
    let values = sectors
        .iter()
        .map(|s| {
            countries
                .iter()
                .map(|c| cells.get(&(*s, *c)).map_or(0.0, |(sum, n)| mean(*sum, *n)))
                .collect()
        })
        .collect();
    Heatmap {
        sectors: sectors.into_iter().map(str::to_string).collect(),
        countries: countries.into_iter().map(str::to_string).collect(),
        values,
    }
}

pub fn build_report(rows: &[ScoredRecord], filter: &ReportFilter, opts: ReportOptions) -> Report {
    let (bounds, selected) = window_rows(rows, filter, opts.window_days);

    // Filter choices come from every dated row, before window and filters.
    let dated = || {
        rows.iter().filter(|r| {
            r.tagged
                .article
                .published_at
                .as_deref()
                .and_then(published_date)
                .is_some()
        })
    };
    let available_countries: BTreeSet<&str> = dated()
        .map(ScoredRecord::country)
        .filter(|c| !c.is_empty())
        .collect();
    let available_categories: BTreeSet<&str> = dated()
        .map(ScoredRecord::category)
        .filter(|c| !c.is_empty())
        .collect();

    let mut daily: BTreeMap<NaiveDate, (f64, f64, usize)> = BTreeMap::new();
    let mut by_country: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    let mut risk_sum = 0.0;
    for (d, r) in &selected {
        let risk = f64::from(r.risk_score);
        risk_sum += risk;
        let e = daily.entry(*d).or_default();
        e.0 += risk;
        e.1 += r.sentiment_score();
        e.2 += 1;
        let c = by_country.entry(r.country()).or_default();
        c.0 += risk;
        c.1 += 1;
    }

    let article_count = selected.len();
    Report {
        window_start: bounds.map(|(s, _)| s),
        window_end: bounds.map(|(_, e)| e),
        article_count,
        country_count: by_country.len(),
        avg_risk: (article_count > 0).then(|| round2(mean(risk_sum, article_count))),
        available_countries: available_countries.into_iter().map(str::to_string).collect(),
        available_categories: available_categories
            .into_iter()
            .map(str::to_string)
            .collect(),
        daily: daily
            .into_iter()
            .map(|(date, (risk, sentiment, n))| DailyPoint {
                date,
                avg_risk: mean(risk, n),
                avg_sentiment: mean(sentiment, n),
                article_count: n,
            })
            .collect(),
        by_country: by_country
            .into_iter()
            .map(|(country, (sum, n))| CountryRisk {
                country: country.to_string(),
                avg_risk: mean(sum, n),
                article_count: n,
            })
            .collect(),
        heatmap: heatmap(&selected),
        histogram: histogram(selected.iter().map(|(_, r)| *r)),
        top: top_articles(selected.iter().map(|(_, r)| *r), opts.top_n),
    }
}
