//! Map host abstraction and its in-memory implementation.
//!
//! The core never draws anything itself; it only adds styled features to
//! overlay groups, clears them, and moves the viewport.

mod style;
mod view;

use serde::Serialize;

use crate::models::{Bounds, Feature};

pub use style::Style;
pub use view::{MapState, MapView, TileLayer, Viewport};

/// Padding in pixels applied when fitting the viewport to bounds
pub const FIT_PADDING: [u32; 2] = [50, 50];

/// Overlay groups, cleared independently of each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Postcodes plotted by the batch run
    Bulk,
    /// Result of the last search
    Search,
}

/// A feature ready to be drawn: geometry, style and popup text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledFeature {
    pub feature: Feature,
    pub style: Style,
    pub popup: String,
}

/// Operations the core needs from the map widget.
pub trait MapHost: Send + Sync {
    fn add_feature(&self, layer: Layer, feature: StyledFeature);

    fn clear_layer(&self, layer: Layer);

    /// Bounding box of every feature in `layer`, `None` when it is empty
    fn layer_bounds(&self, layer: Layer) -> Option<Bounds>;

    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]);
}
