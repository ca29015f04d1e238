//! Map server.
//!
//! Owns the map state, plots the configured postcodes at start-up and exposes
//! the reload, search and clear-search triggers over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pc4map::map::Style;
use pc4map::{BatchPlotter, BatchRunner, Config, FallbackResolver, MapView, SearchController};

mod routes;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Postcode map server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Application state shared across handlers
pub struct AppState {
    pub map: Arc<MapView>,
    pub runner: BatchRunner,
    pub search: SearchController,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("pc4map server");
    info!("Loading config from {}", args.config.display());

    let config = match Config::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Could not load configuration: {:#}", e);
            return Err(e);
        }
    };
    info!("{} postcodes configured", config.zipcodes.len());

    let resolver = Arc::new(
        FallbackResolver::from_config(&config.services)
            .context("Failed to set up geocoding services")?,
    );

    let map = Arc::new(MapView::new(&config.map));
    let plotter = BatchPlotter::new(Arc::clone(&resolver), Style::from_map_config(&config.map));
    let state = Arc::new(AppState {
        map: Arc::clone(&map),
        runner: BatchRunner::new(plotter, map, config.zipcodes.clone()),
        search: SearchController::new(
            Arc::clone(&resolver),
            config.zipcodes.iter().cloned(),
            &config.search,
        ),
    });

    state.runner.start(false);

    let app = routes::router(Arc::clone(&state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
