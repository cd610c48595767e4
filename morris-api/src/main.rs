//! Three Men's Morris Web API
//!
//! Serves one game session over REST: moves, undo, settings, hints and the
//! computer player. Scores come from the SQLite tablebase written by
//! `export_sqlite`, or from a JSON score table.

mod routes;
mod session;
mod tablebase;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use morris_core::ScoreTable;

use crate::routes::{router, AppState, AppStateInner};
use crate::session::Session;
use crate::tablebase::{Scores, Tablebase};

/// Tablebase locations tried when none is given.
const TABLEBASE_PATHS: [&str; 3] = [
    "data/tablebase.db",
    "../morris-solver/data/tablebase.db",
    "tablebase.db",
];

#[derive(Parser, Debug)]
#[command(about = "Three men's morris web API")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: String,

    /// SQLite tablebase
    #[arg(long, conflicts_with = "scores")]
    tablebase: Option<PathBuf>,

    /// JSON score table, loaded into memory
    #[arg(long)]
    scores: Option<PathBuf>,
}

fn load_scores(args: &Args) -> Result<Option<Scores>> {
    if let Some(path) = &args.scores {
        let table = ScoreTable::load_json(path)
            .with_context(|| format!("loading score table {}", path.display()))?;
        return Ok(Some(Scores::Memory(table)));
    }
    if let Some(path) = &args.tablebase {
        let tablebase = Tablebase::load(path)
            .with_context(|| format!("opening tablebase {}", path.display()))?;
        return Ok(Some(Scores::Sqlite(tablebase)));
    }

    let found = TABLEBASE_PATHS.iter().map(Path::new).find_map(|path| {
        if !path.exists() {
            return None;
        }
        match Tablebase::load(path) {
            Ok(tablebase) => Some(Scores::Sqlite(tablebase)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to load tablebase");
                None
            }
        }
    });
    Ok(found)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let scores = load_scores(&args)?;
    match &scores {
        Some(scores) => tracing::info!(source = %scores.describe(), "scores loaded"),
        None => tracing::warn!("no score table found, hints and computer moves are unavailable"),
    }

    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(Session::new()),
        scores,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(address = %args.bind, "morris API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
