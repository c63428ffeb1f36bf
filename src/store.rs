//! CSV tabular store for article, tagged and scored batches.
//!
//! Columns are looked up by header name, so extra columns are ignored and
//! column order does not matter. Empty cells read as `None`.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::record::{ArticleRecord, ScoredRecord, TaggedRecord};
use crate::risk::{coerce_sentiment, MAX_RISK_SCORE};
use crate::rules::{UNCATEGORIZED, UNKNOWN_COUNTRY};

pub const ARTICLE_COLUMNS: [&str; 7] = [
    "title",
    "description",
    "content",
    "url",
    "source",
    "published_at",
    "collected_at",
];

const TAG_COLUMNS: [&str; 4] = ["country", "category", "sector", "sentiment_score"];
const RISK_COLUMN: &str = "risk_score";

/// Header name → column index.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_string(), i))
                .collect(),
        )
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn cell<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.0
            .get(name)
            .and_then(|&i| row.get(i))
            .filter(|s| !s.is_empty())
    }

    fn owned(&self, row: &StringRecord, name: &str) -> Option<String> {
        self.cell(row, name).map(str::to_string)
    }

    fn article(&self, row: &StringRecord) -> ArticleRecord {
        ArticleRecord {
            title: self.owned(row, "title"),
            description: self.owned(row, "description"),
            content: self.owned(row, "content"),
            url: self.owned(row, "url"),
            source: self.owned(row, "source"),
            published_at: self.owned(row, "published_at"),
            collected_at: self.owned(row, "collected_at"),
        }
    }

    /// A label column: absent column → `fallback`, empty cell → "".
    fn label(&self, row: &StringRecord, name: &str, fallback: &str) -> String {
        if !self.has(name) {
            return fallback.to_string();
        }
        self.cell(row, name).unwrap_or_default().to_string()
    }

    fn tagged(&self, row: &StringRecord) -> TaggedRecord {
        TaggedRecord {
            article: self.article(row),
            country: self.label(row, "country", UNKNOWN_COUNTRY),
            category: self.label(row, "category", UNCATEGORIZED),
            sector: self.cell(row, "sector").unwrap_or_default().to_string(),
            sentiment_score: coerce_sentiment(self.cell(row, "sentiment_score")),
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn create(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn read_rows<R: Read, T>(reader: R, map: impl Fn(&Columns, &StringRecord) -> Option<T>) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::from_headers(rdr.headers().context("reading CSV header")?);
    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("reading CSV row {}", i + 1))?;
        if let Some(v) = map(&cols, &rec) {
            out.push(v);
        }
    }
    Ok(out)
}

pub fn read_articles_from<R: Read>(reader: R) -> Result<Vec<ArticleRecord>> {
    read_rows(reader, |c, r| Some(c.article(r)))
}

pub fn read_articles(path: &Path) -> Result<Vec<ArticleRecord>> {
    let rows = read_articles_from(open(path)?)?;
    info!(path = %path.display(), rows = rows.len(), "loaded articles");
    Ok(rows)
}

pub fn read_tagged_from<R: Read>(reader: R) -> Result<Vec<TaggedRecord>> {
    read_rows(reader, |c, r| Some(c.tagged(r)))
}

pub fn read_tagged(path: &Path) -> Result<Vec<TaggedRecord>> {
    let rows = read_tagged_from(open(path)?)?;
    info!(path = %path.display(), rows = rows.len(), "loaded tagged articles");
    Ok(rows)
}

/// Rows whose `risk_score` is missing or not a number are skipped.
pub fn read_scored_from<R: Read>(reader: R) -> Result<Vec<ScoredRecord>> {
    read_rows(reader, |c, r| {
        let raw = c.cell(r, RISK_COLUMN);
        let risk = raw
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        match risk {
            Some(v) => Some(ScoredRecord {
                tagged: c.tagged(r),
                risk_score: v.round().clamp(0.0, f64::from(MAX_RISK_SCORE)) as u32,
            }),
            None => {
                warn!(risk_score = ?raw, "skipping row without a numeric risk_score");
                None
            }
        }
    })
}

pub fn read_scored(path: &Path) -> Result<Vec<ScoredRecord>> {
    let rows = read_scored_from(open(path)?)?;
    info!(path = %path.display(), rows = rows.len(), "loaded scored articles");
    Ok(rows)
}

fn article_cells(a: &ArticleRecord) -> [&str; 7] {
    [
        a.title.as_deref().unwrap_or_default(),
        a.description.as_deref().unwrap_or_default(),
        a.content.as_deref().unwrap_or_default(),
        a.url.as_deref().unwrap_or_default(),
        a.source.as_deref().unwrap_or_default(),
        a.published_at.as_deref().unwrap_or_default(),
        a.collected_at.as_deref().unwrap_or_default(),
    ]
}

fn write_tagged_row<W: Write>(w: &mut Writer<W>, t: &TaggedRecord, risk: Option<u32>) -> Result<()> {
    let sentiment = t.sentiment_score.to_string();
    let risk = risk.map(|r| r.to_string());
    let mut row: Vec<&str> = article_cells(&t.article).to_vec();
    row.extend([
        t.country.as_str(),
        t.category.as_str(),
        t.sector.as_str(),
        sentiment.as_str(),
    ]);
    if let Some(r) = risk.as_deref() {
        row.push(r);
    }
    w.write_record(&row)?;
    Ok(())
}

pub fn write_tagged_to<W: Write>(writer: W, rows: &[TaggedRecord]) -> Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(ARTICLE_COLUMNS.iter().chain(TAG_COLUMNS.iter()))?;
    for t in rows {
        write_tagged_row(&mut w, t, None)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_tagged(path: &Path, rows: &[TaggedRecord]) -> Result<()> {
    write_tagged_to(create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "wrote tagged articles");
    Ok(())
}

pub fn write_scored_to<W: Write>(writer: W, rows: &[ScoredRecord]) -> Result<()> {
    let mut w = Writer::from_writer(writer);
    w.write_record(
        ARTICLE_COLUMNS
            .iter()
            .chain(TAG_COLUMNS.iter())
            .chain(std::iter::once(&RISK_COLUMN)),
    )?;
    for s in rows {
        write_tagged_row(&mut w, &s.tagged, Some(s.risk_score))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_scored(path: &Path, rows: &[ScoredRecord]) -> Result<()> {
    write_scored_to(create(path)?, rows)?;
    info!(path = %path.display(), rows = rows.len(), "wrote scored articles");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLES: &str = "\
title,description,content,url,source,published_at,collected_at
\"Flood in Delhi, thousands evacuated\",,body,https://x/1,Reuters,2024-05-01T10:00:00Z,2024-05-02T00:00:00Z
Calm day,Nothing happened,,,,,
";

    #[test]
    fn reads_articles_with_quotes_and_gaps() {
        let rows = read_articles_from(ARTICLES.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title.as_deref(), Some("Flood in Delhi, thousands evacuated"));
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[0].source.as_deref(), Some("Reuters"));
        assert_eq!(rows[1].description.as_deref(), Some("Nothing happened"));
        assert_eq!(rows[1].url, None);
    }

    #[test]
    fn column_order_does_not_matter() {
        let csv = "description,title\nd,t\n";
        let rows = read_articles_from(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].title.as_deref(), Some("t"));
        assert_eq!(rows[0].description.as_deref(), Some("d"));
    }

    #[test]
    fn tagged_labels_and_sentiment_coercion() {
        let csv = "title,country,category,sector,sentiment_score\n\
                   a,Iran,Cybersecurity,\"Tech, Finance\",-0.4\n\
                   b,,,,oops\n";
        let rows = read_tagged_from(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].sector, "Tech, Finance");
        assert_eq!(rows[0].sentiment_score, -0.4);
        assert_eq!(rows[1].country, "");
        assert_eq!(rows[1].sentiment_score, 0.0);

        let no_cols = read_tagged_from("title\nx\n".as_bytes()).unwrap();
        assert_eq!(no_cols[0].country, UNKNOWN_COUNTRY);
        assert_eq!(no_cols[0].category, UNCATEGORIZED);
    }

    #[test]
    fn scored_write_then_read() {
        let rec = ScoredRecord {
            tagged: TaggedRecord {
                article: ArticleRecord::headline("Strike, again", Some("port closed")),
                country: "UK".into(),
                category: "Conflict / War".into(),
                sector: "Defense, Oil & Gas".into(),
                sentiment_score: -0.318,
            },
            risk_score: 67,
        };
        let mut buf = Vec::new();
        write_scored_to(&mut buf, std::slice::from_ref(&rec)).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(
            "title,description,content,url,source,published_at,collected_at,country,category,sector,sentiment_score,risk_score"
        ));
        let back = read_scored_from(buf.as_slice()).unwrap();
        assert_eq!(back, vec![rec]);
    }

    #[test]
    fn scored_rows_without_risk_are_skipped() {
        let csv = "title,risk_score\na,42\nb,\nc,high\nd,41.6\n";
        let rows = read_scored_from(csv.as_bytes()).unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["a", "d"]);
        assert_eq!(rows[1].risk_score, 42);
    }

    #[test]
    fn file_round_trip_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let rows = vec![TaggedRecord {
            article: ArticleRecord::headline("t", None),
            country: "Japan".into(),
            category: "Natural Disaster".into(),
            sector: "Insurance, Agriculture".into(),
            sentiment_score: 0.25,
        }];
        write_tagged(&path, &rows).unwrap();
        assert_eq!(read_tagged(&path).unwrap(), rows);
    }
}
