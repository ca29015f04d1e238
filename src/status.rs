//! Human-readable status surfaces.

use serde::Serialize;
use tracing::info;

/// Which text surface a message targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Batch progress ("Loading: 1951...", "Loaded 3 successfully, 0 failed")
    Batch,
    /// Result of the last search
    Search,
}

/// Receives progress and result messages.
pub trait StatusSink: Send + Sync {
    fn report(&self, surface: Surface, message: &str);

    fn clear(&self, surface: Surface);
}

/// Sink for headless runs: every message goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn report(&self, surface: Surface, message: &str) {
        info!(?surface, "{}", message);
    }

    fn clear(&self, _surface: Surface) {}
}
