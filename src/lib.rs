//! pc4map - plots Dutch 4-digit postcodes on a map
//!
//! This library provides the geocoding, plotting and search logic shared by
//! the `serve` and `plot` binaries.

pub mod config;
pub mod error;
pub mod geocode;
pub mod geometry;
pub mod map;
pub mod models;
pub mod plotter;
pub mod search;
pub mod status;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::ResolveError;
pub use geocode::{FallbackResolver, Resolver};
pub use map::{Layer, MapHost, MapView};
pub use models::{Bounds, Coordinate, Feature, PostalCode};
pub use plotter::{BatchPlotter, BatchRunner, PlotSummary};
pub use search::{SearchController, SearchOutcome};
pub use status::{LogStatus, StatusSink, Surface};
