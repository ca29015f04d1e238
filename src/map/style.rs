use serde::Serialize;

use crate::config::{MapConfig, SearchConfig};

/// Path options understood by the front-end map widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Stroke colour
    pub color: String,
    /// Stroke width in pixels
    pub weight: u32,
    /// Stroke opacity
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Style {
    /// Style of the bulk-loaded postcodes
    pub fn from_map_config(config: &MapConfig) -> Self {
        Self {
            color: config.stroke_color.clone(),
            weight: config.stroke_weight,
            opacity: 1.0,
            fill_color: config.fill_color.clone(),
            fill_opacity: config.fill_opacity,
        }
    }

    /// Searched postcode that is on the configured list
    pub fn flagged(config: &SearchConfig) -> Self {
        Self {
            color: config.flagged_color.clone(),
            weight: 4,
            opacity: 1.0,
            fill_color: config.flagged_color.clone(),
            fill_opacity: 0.6,
        }
    }

    /// Searched postcode that is not on the list
    pub fn clear(config: &SearchConfig) -> Self {
        Self {
            color: config.clear_color.clone(),
            weight: 3,
            opacity: 0.8,
            fill_color: config.clear_color.clone(),
            fill_opacity: 0.4,
        }
    }
}
