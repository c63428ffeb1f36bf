//! Read-only HTTP surface over a scored snapshot, plus ad-hoc `/classify`.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::metrics::Metrics;
use crate::pipeline::{Assessment, Pipeline};
use crate::record::ScoredRecord;
use crate::report::{self, Report, ReportFilter, ReportOptions, TopArticle};
use crate::store;

pub const EXPORT_FILENAME: &str = "geopolitical_news_last7days.csv";

#[derive(Clone)]
pub struct AppState {
    pub rows: Arc<Vec<ScoredRecord>>,
    pub pipeline: Arc<Pipeline>,
    pub report: ReportOptions,
}

impl AppState {
    pub fn new(rows: Vec<ScoredRecord>, pipeline: Pipeline, report: ReportOptions) -> Self {
        Self {
            rows: Arc::new(rows),
            pipeline: Arc::new(pipeline),
            report,
        }
    }
}

/// Build the router; `/metrics` is mounted only when a recorder handle exists.
pub fn router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/summary", get(summary))
        .route("/articles/top", get(top_articles))
        .route("/export.csv", get(export_csv))
        .route("/classify", post(classify));
    if let Some(m) = metrics {
        app = app.merge(m.router());
    }
    app.layer(CorsLayer::very_permissive()).with_state(state)
}

/// `?country=Russia,China&category=Conflict / War`; absent or blank = all.
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

fn parse_set(raw: Option<&str>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!set.is_empty()).then_some(set)
}

impl FilterQuery {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            countries: parse_set(self.country.as_deref()),
            categories: parse_set(self.category.as_deref()),
        }
    }
}

async fn summary(State(state): State<AppState>, Query(q): Query<FilterQuery>) -> Json<Report> {
    Json(report::build_report(&state.rows, &q.filter(), state.report))
}

async fn top_articles(
    State(state): State<AppState>,
    Query(q): Query<FilterQuery>,
) -> Json<Vec<TopArticle>> {
    let (_, selected) = report::window_rows(&state.rows, &q.filter(), state.report.window_days);
    let n = q.limit.unwrap_or(state.report.top_n);
    Json(report::top_articles(selected.into_iter().map(|(_, r)| r), n))
}

async fn export_csv(State(state): State<AppState>, Query(q): Query<FilterQuery>) -> Response {
    let (_, selected) = report::window_rows(&state.rows, &q.filter(), state.report.window_days);
    let rows: Vec<ScoredRecord> = selected.into_iter().map(|(_, r)| r.clone()).collect();

    let mut buf = Vec::new();
    if let Err(e) = store::write_scored_to(&mut buf, &rows) {
        error!(error = ?e, "csv export failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, "export failed").into_response();
    }
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        buf,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ClassifyReq {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

async fn classify(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> Result<Json<Assessment>, (StatusCode, String)> {
    state
        .pipeline
        .assess(body.title.as_deref(), body.description.as_deref())
        .map(Json)
        .map_err(|e| {
            warn!(error = %e, "classify failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_lists_are_trimmed_and_blank_means_all() {
        let set = parse_set(Some(" Russia, China ,,")).unwrap();
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["China".to_string(), "Russia".to_string()]
        );
        assert!(parse_set(Some(" , ")).is_none());
        assert!(parse_set(None).is_none());
    }
}
