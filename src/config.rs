//! Application configuration, loaded once at start-up.
//!
//! TOML is the native format. Files ending in `.json` are read as JSON and may
//! use the camelCase field names of the browser front-end (`mapConfig`,
//! `fillColor`, ...).

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::{Coordinate, PostalCode};

pub const DEFAULT_PDOK_URL: &str = "https://api.pdok.nl/bzk/locatieserver/search/v3_1/free";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Postcodes plotted by the batch run and flagged by search
    pub zipcodes: Vec<PostalCode>,
    #[serde(alias = "mapConfig")]
    pub map: MapConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub services: ServiceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    pub center: Coordinate,
    pub zoom: u8,
    #[serde(alias = "fillColor")]
    pub fill_color: String,
    #[serde(alias = "fillOpacity")]
    pub fill_opacity: f64,
    #[serde(alias = "strokeColor")]
    pub stroke_color: String,
    #[serde(alias = "strokeWeight")]
    pub stroke_weight: u32,
    #[serde(default = "default_tile_url", alias = "tileUrl")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// Colours used to highlight a searched postcode
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(alias = "flaggedColor")]
    pub flagged_color: String,
    #[serde(alias = "clearColor")]
    pub clear_color: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            flagged_color: "#dc3545".to_string(),
            clear_color: "#28a745".to_string(),
        }
    }
}

/// Upstream geocoding services
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    #[serde(alias = "pdokUrl")]
    pub pdok_url: String,
    #[serde(alias = "nominatimUrl")]
    pub nominatim_url: String,
    /// Country filter for Nominatim
    pub country: String,
    /// Nominatim's usage policy requires an identifying User-Agent
    #[serde(alias = "userAgent")]
    pub user_agent: String,
    #[serde(alias = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            pdok_url: DEFAULT_PDOK_URL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            country: "Netherlands".to_string(),
            user_agent: concat!("pc4map/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).context("Failed to parse config file")?
        } else {
            toml::from_str(&content).context("Failed to parse config file")?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.map.fill_opacity),
            "fill_opacity must be within [0, 1], got {}",
            self.map.fill_opacity
        );
        ensure!(
            !self.services.user_agent.trim().is_empty(),
            "services.user_agent must not be empty"
        );
        ensure!(self.services.timeout_secs > 0, "services.timeout_secs must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_TOML: &str = r##"
zipcodes = ["1951", "2011", "3572"]

[map]
center = { lat = 52.1326, lon = 5.2913 }
zoom = 8
fill_color = "#3388ff"
fill_opacity = 0.4
stroke_color = "#0055aa"
stroke_weight = 2
"##;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml_with_defaults() {
        let file = write_config(".toml", SAMPLE_TOML);
        let config = Config::load_from_file(file.path()).unwrap();

        assert_eq!(config.zipcodes.len(), 3);
        assert_eq!(config.zipcodes[2].as_str(), "3572");
        assert_eq!(config.map.zoom, 8);
        assert_eq!(config.map.tile_url, DEFAULT_TILE_URL);
        assert_eq!(config.services.country, "Netherlands");
        assert_eq!(config.services.pdok_url, DEFAULT_PDOK_URL);
        assert_eq!(config.search.flagged_color, "#dc3545");
    }

    #[test]
    fn test_load_json_camel_case() {
        let json = r##"{
            "zipcodes": ["1951"],
            "mapConfig": {
                "center": { "lat": 52.0, "lon": 5.0 },
                "zoom": 7,
                "fillColor": "#ff0000",
                "fillOpacity": 0.3,
                "strokeColor": "#000000",
                "strokeWeight": 1
            }
        }"##;
        let file = write_config(".json", json);
        let config = Config::load_from_file(file.path()).unwrap();

        assert_eq!(config.map.fill_color, "#ff0000");
        assert_eq!(config.map.stroke_weight, 1);
    }

    #[test]
    fn test_rejects_out_of_range_opacity() {
        let file = write_config(".toml", &SAMPLE_TOML.replace("0.4", "1.5"));
        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("fill_opacity"));
    }

    #[test]
    fn test_rejects_invalid_postcode() {
        let file = write_config(".toml", &SAMPLE_TOML.replace("\"2011\"", "\"20\""));
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load_from_file("/nonexistent/pc4map.toml").is_err());
    }
}
