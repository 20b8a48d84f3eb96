//! SCORECAST: prediction accuracy and statistics server.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! restores the match dataset from disk (or starts empty), logs a summary
//! and serves the dashboard API until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use scorecast::config::AppConfig;
use scorecast::dashboard::{self, DashboardState};
use scorecast::engine::StatsEngine;
use scorecast::storage::{self, MatchBook, MatchQuery, MatchStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::resolve_path();
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        trend_window = cfg.engine.trend_window,
        discrepancy_top_k = cfg.engine.discrepancy_top_k,
        "SCORECAST starting up"
    );

    // -- Restore or create the dataset -----------------------------------

    let data_path = cfg.store.data_path.clone();
    let book = match storage::load_dataset(data_path.as_deref())? {
        Some(dataset) => MatchBook::from_dataset(dataset).context("Invalid dataset on disk")?,
        None => {
            info!("Fresh start with an empty match book");
            MatchBook::new()
        }
    };

    let engine = StatsEngine::new(cfg.engine.clone());
    log_summary(&engine, &book);

    if !cfg.dashboard.enabled {
        warn!("Dashboard disabled in config; nothing to serve");
        return Ok(());
    }

    // -- Serve -----------------------------------------------------------

    let mut state = DashboardState::new(Box::new(book), engine);
    if let Some(path) = data_path {
        state = state.with_data_path(path);
    }
    let state = Arc::new(state);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received.");
        }
    };

    info!(port = cfg.dashboard.port, "Serving. Press Ctrl+C to stop.");
    dashboard::serve(state.clone(), cfg.dashboard.port, shutdown).await?;

    // Save final state
    let dataset = state.store.read().await.dataset();
    storage::save_dataset(&dataset, state.data_path.as_deref())?;
    info!(matches = dataset.matches.len(), "SCORECAST shut down cleanly.");

    Ok(())
}

/// Log headline accuracy figures for the loaded dataset.
fn log_summary(engine: &StatsEngine, book: &MatchBook) {
    let matches = book.matches(&MatchQuery::all());
    let stats = engine.summary(&matches, None);
    info!(
        matches = stats.matches_considered,
        evaluable = stats.evaluable,
        predictz_outcome_pct = %stats.predictz.outcome_pct,
        predictz_score_pct = %stats.predictz.score_pct,
        user_outcome_pct = %stats.user.outcome_pct,
        user_score_pct = %stats.user.score_pct,
        leader = ?stats.comparison.winner,
        "Dataset summary"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scorecast=info"));

    let json_logging = std::env::var("SCORECAST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
