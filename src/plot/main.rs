//! Command-line batch plot.
//!
//! Resolves every configured postcode, optionally runs searches, and writes
//! the plotted areas as a GeoJSON FeatureCollection.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pc4map::map::Style;
use pc4map::{
    BatchPlotter, Config, FallbackResolver, Layer, LogStatus, MapView, SearchController,
    SearchOutcome, StatusSink, Surface,
};

#[derive(Parser, Debug)]
#[command(name = "plot")]
#[command(about = "Plot configured postcodes to GeoJSON")]
struct Args {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output file for the FeatureCollection (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Postcode to search for after plotting (repeatable)
    #[arg(short, long)]
    search: Vec<String>,
}

/// Shows batch progress on a spinner and mirrors every message into the map.
struct ProgressStatus<'a> {
    bar: ProgressBar,
    map: &'a MapView,
}

impl StatusSink for ProgressStatus<'_> {
    fn report(&self, surface: Surface, message: &str) {
        if surface == Surface::Batch {
            self.bar.set_message(message.to_string());
        }
        self.map.report(surface, message);
    }

    fn clear(&self, surface: Surface) {
        self.map.clear(surface);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stderr keeps stdout free for GeoJSON
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match Config::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Could not load configuration: {:#}", e);
            return Err(e);
        }
    };

    let resolver = Arc::new(
        FallbackResolver::from_config(&config.services)
            .context("Failed to set up geocoding services")?,
    );
    let map = MapView::new(&config.map);
    let plotter = BatchPlotter::new(Arc::clone(&resolver), Style::from_map_config(&config.map));

    // No spinner when stderr is piped or redirected
    let progress = if io::stderr().is_terminal() {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template("{spinner} {elapsed} {msg}")?);
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(ProgressStatus { bar, map: &map })
    } else {
        None
    };
    let status: &dyn StatusSink = match &progress {
        Some(progress) => progress,
        None => &LogStatus,
    };

    let summary = plotter.plot_all(&config.zipcodes, &map, status).await;
    let done = format!(
        "Loaded {} successfully, {} failed",
        summary.success, summary.failed
    );
    match &progress {
        Some(progress) => progress.bar.finish_with_message(done),
        None => info!("{}", done),
    }

    if !args.search.is_empty() {
        let search =
            SearchController::new(resolver, config.zipcodes.iter().cloned(), &config.search);
        for input in &args.search {
            match search.search(input, &map, &map).await {
                SearchOutcome::Invalid { input } => eprintln!("{:?}: invalid postcode", input),
                SearchOutcome::NotFound { code } => eprintln!("{}: not found", code),
                SearchOutcome::Rendered { code, matched: true } => {
                    eprintln!("{}: on the list", code)
                }
                SearchOutcome::Rendered { code, matched: false } => {
                    eprintln!("{}: not on the list", code)
                }
            }
        }
    }

    let collection = json!({
        "type": "FeatureCollection",
        "features": map.features(Layer::Bulk),
    });

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &collection)?;
            writer.flush()?;
            info!("Wrote {} features to {}", summary.success, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &collection)?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
