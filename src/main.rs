//! `geo-risk` binary entrypoint.
//! Runs the tag/score stages over CSV files or serves the scored snapshot over HTTP.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geo_risk::api::{self, AppState};
use geo_risk::config::AppConfig;
use geo_risk::metrics::Metrics;
use geo_risk::pipeline::{sort_by_risk_desc, Pipeline};
use geo_risk::record::ScoredRecord;
use geo_risk::rules::RuleTables;
use geo_risk::sentiment::SentimentScorer;
use geo_risk::store;

#[derive(Parser)]
#[command(name = "geo-risk")]
#[command(about = "Geopolitical news tagging and risk scoring", long_about = None)]
struct Cli {
    /// Config file (defaults to config/geo_risk.toml when present)
    #[arg(long, env = "GEO_RISK_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage 1: add country, category, sector and sentiment columns
    Tag {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Stage 2: add risk_score and sort by it
    Score {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Both stages in one pass (writes the tagged file too)
    Run {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the scored snapshot over HTTP
    Serve {
        #[arg(long)]
        scored: Option<PathBuf>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Compact logs by default, JSON lines with `GEO_RISK_LOG_JSON=1`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geo_risk=info,warn"));
    let json = std::env::var("GEO_RISK_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn build_pipeline(cfg: &AppConfig) -> Result<Pipeline> {
    let tables = RuleTables::load_or_builtin(cfg.rules.path.as_deref())?;
    let scorer = SentimentScorer::from_kind(cfg.sentiment.model)?;
    info!(
        model = scorer.model_name(),
        on_failure = ?cfg.sentiment.on_failure,
        "pipeline ready"
    );
    Ok(Pipeline::new(Arc::new(tables), scorer)?.with_policy(cfg.sentiment.on_failure))
}

fn default_input(cfg: &AppConfig) -> PathBuf {
    cfg.paths.input_for(chrono::Utc::now().date_naive())
}

/// Most frequent countries and the highest-risk headlines of a sorted batch.
fn log_top(rows: &[ScoredRecord]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in rows {
        *counts.entry(r.country()).or_default() += 1;
    }
    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (country, n) in counts.into_iter().take(5) {
        info!(country, articles = n, "top country");
    }
    for r in rows.iter().take(5) {
        info!(
            title = r.title(),
            country = r.country(),
            category = r.category(),
            risk = r.risk_score,
            "top article"
        );
    }
}

fn tag(cfg: &AppConfig, input: &Path, output: &Path) -> Result<()> {
    let pipeline = build_pipeline(cfg)?;
    let articles = store::read_articles(input)?;
    let tagged = pipeline.tag_batch(&articles)?;
    store::write_tagged(output, &tagged)?;
    info!(rows = tagged.len(), output = %output.display(), "tagged file written");
    Ok(())
}

fn score(cfg: &AppConfig, input: &Path, output: &Path) -> Result<()> {
    let pipeline = build_pipeline(cfg)?;
    let tagged = store::read_tagged(input)?;
    let mut scored = pipeline.score_batch(&tagged);
    sort_by_risk_desc(&mut scored);
    store::write_scored(output, &scored)?;
    info!(rows = scored.len(), output = %output.display(), "scored file written");
    log_top(&scored);
    Ok(())
}

fn run(cfg: &AppConfig, input: &Path, output: &Path) -> Result<()> {
    let pipeline = build_pipeline(cfg)?;
    let articles = store::read_articles(input)?;
    let tagged = pipeline.tag_batch(&articles)?;
    store::write_tagged(&cfg.paths.tagged, &tagged)?;
    let mut scored = pipeline.score_batch(&tagged);
    sort_by_risk_desc(&mut scored);
    store::write_scored(output, &scored)?;
    info!(
        rows = scored.len(),
        tagged = %cfg.paths.tagged.display(),
        scored = %output.display(),
        "pipeline finished"
    );
    log_top(&scored);
    Ok(())
}

async fn serve(cfg: &AppConfig, scored: &Path, port: u16) -> Result<()> {
    let pipeline = build_pipeline(cfg)?;
    let rows = store::read_scored(scored)?;
    let metrics = Metrics::init(rows.len())?;
    info!(rows = rows.len(), path = %scored.display(), "scored snapshot loaded");

    let state = AppState::new(rows, pipeline, cfg.report.into());
    let app = api::router(state, Some(&metrics));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tag { input, output } => {
            let input = input.unwrap_or_else(|| default_input(&cfg));
            let output = output.unwrap_or_else(|| cfg.paths.tagged.clone());
            tag(&cfg, &input, &output)
        }
        Commands::Score { input, output } => {
            let input = input.unwrap_or_else(|| cfg.paths.tagged.clone());
            let output = output.unwrap_or_else(|| cfg.paths.scored.clone());
            score(&cfg, &input, &output)
        }
        Commands::Run { input, output } => {
            let input = input.unwrap_or_else(|| default_input(&cfg));
            let output = output.unwrap_or_else(|| cfg.paths.scored.clone());
            run(&cfg, &input, &output)
        }
        Commands::Serve { scored, port } => {
            let scored = scored.unwrap_or_else(|| cfg.paths.scored.clone());
            serve(&cfg, &scored, port.unwrap_or(cfg.server.port)).await
        }
    }
}
