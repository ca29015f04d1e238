//! Sequential batch plotting of the configured postcodes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::geocode::FallbackResolver;
use crate::map::{Layer, MapHost, MapView, Style, StyledFeature, FIT_PADDING};
use crate::models::PostalCode;
use crate::status::{StatusSink, Surface};

/// Pause between two consecutive codes. Upstream rate limit, do not lower.
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlotSummary {
    pub success: usize,
    pub failed: usize,
}

pub struct BatchPlotter {
    resolver: Arc<FallbackResolver>,
    style: Style,
}

impl BatchPlotter {
    pub fn new(resolver: Arc<FallbackResolver>, style: Style) -> Self {
        Self { resolver, style }
    }

    /// Resolve and plot `codes` one at a time into the bulk layer.
    ///
    /// Nothing is cleared beforehand. Unresolvable codes are counted and
    /// skipped. The viewport is fitted to the bulk layer only if at least one
    /// code was plotted.
    pub async fn plot_all(
        &self,
        codes: &[PostalCode],
        map: &dyn MapHost,
        status: &dyn StatusSink,
    ) -> PlotSummary {
        let mut summary = PlotSummary::default();
        info!("Plotting {} postcodes", codes.len());

        for (i, code) in codes.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(REQUEST_DELAY).await;
            }

            status.report(Surface::Batch, &format!("Loading: {}...", code));

            match self.resolver.resolve(code).await {
                Some(feature) => {
                    map.add_feature(
                        Layer::Bulk,
                        StyledFeature {
                            feature,
                            style: self.style.clone(),
                            popup: format!("Postcode {}", code),
                        },
                    );
                    summary.success += 1;
                }
                None => {
                    warn!("Could not plot postcode {}", code);
                    summary.failed += 1;
                }
            }
        }

        if summary.success > 0 {
            if let Some(bounds) = map.layer_bounds(Layer::Bulk) {
                map.fit_bounds(bounds, FIT_PADDING);
            }
        }

        let message = format!(
            "Loaded {} successfully, {} failed",
            summary.success, summary.failed
        );
        info!("{}", message);
        status.report(Surface::Batch, &message);

        summary
    }
}

/// Runs the batch plot in the background, one run at a time.
pub struct BatchRunner {
    plotter: Arc<BatchPlotter>,
    map: Arc<MapView>,
    zipcodes: Arc<Vec<PostalCode>>,
    /// Held for the whole duration of a run
    guard: Arc<Mutex<()>>,
}

impl BatchRunner {
    pub fn new(plotter: BatchPlotter, map: Arc<MapView>, zipcodes: Vec<PostalCode>) -> Self {
        Self {
            plotter: Arc::new(plotter),
            map,
            zipcodes: Arc::new(zipcodes),
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Spawn a run over the configured postcodes. Returns `None`, touching
    /// nothing, if a run is already in flight.
    pub fn start(&self, clear_first: bool) -> Option<JoinHandle<PlotSummary>> {
        let guard = Arc::clone(&self.guard).try_lock_owned().ok()?;

        if clear_first {
            self.map.clear_layer(Layer::Bulk);
        }

        let plotter = Arc::clone(&self.plotter);
        let map = Arc::clone(&self.map);
        let zipcodes = Arc::clone(&self.zipcodes);
        Some(tokio::spawn(async move {
            let _guard = guard;
            let summary = plotter
                .plot_all(&zipcodes, map.as_ref(), map.as_ref())
                .await;
            info!(
                success = summary.success,
                failed = summary.failed,
                "Batch run finished"
            );
            summary
        }))
    }
}
