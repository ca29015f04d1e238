use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use tracing::debug;

use super::{Layer, MapHost, StyledFeature};
use crate::config::MapConfig;
use crate::models::{Bounds, Coordinate};
use crate::status::{StatusSink, Surface};

#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
    /// Last bounds the view was fitted to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<[u32; 2]>,
}

/// Everything the front-end needs to draw the map.
#[derive(Debug, Clone, Serialize)]
pub struct MapState {
    pub tile_layer: TileLayer,
    pub viewport: Viewport,
    #[serde(serialize_with = "feature_collection")]
    pub bulk: Vec<StyledFeature>,
    #[serde(serialize_with = "feature_collection")]
    pub search: Vec<StyledFeature>,
    pub batch_status: Option<String>,
    pub search_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MapState {
    fn overlay(&self, layer: Layer) -> &Vec<StyledFeature> {
        match layer {
            Layer::Bulk => &self.bulk,
            Layer::Search => &self.search,
        }
    }

    fn overlay_mut(&mut self, layer: Layer) -> &mut Vec<StyledFeature> {
        match layer {
            Layer::Bulk => &mut self.bulk,
            Layer::Search => &mut self.search,
        }
    }

    fn status_mut(&mut self, surface: Surface) -> &mut Option<String> {
        match surface {
            Surface::Batch => &mut self.batch_status,
            Surface::Search => &mut self.search_status,
        }
    }
}

/// In-memory map host. Each operation holds the lock only for its own
/// duration, so snapshots stay available while a batch run is pacing.
pub struct MapView {
    state: RwLock<MapState>,
}

impl MapView {
    /// Initialize the view at the configured center and zoom with a tile layer.
    pub fn new(config: &MapConfig) -> Self {
        Self {
            state: RwLock::new(MapState {
                tile_layer: TileLayer {
                    url: config.tile_url.clone(),
                    attribution: config.attribution.clone(),
                },
                viewport: Viewport {
                    center: config.center,
                    zoom: config.zoom,
                    bounds: None,
                    padding: None,
                },
                bulk: Vec::new(),
                search: Vec::new(),
                batch_status: None,
                search_status: None,
                updated_at: Utc::now(),
            }),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MapState {
        self.read().clone()
    }

    pub fn features(&self, layer: Layer) -> Vec<StyledFeature> {
        self.read().overlay(layer).clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.read().viewport.clone()
    }

    pub fn status(&self, surface: Surface) -> Option<String> {
        let state = self.read();
        match surface {
            Surface::Batch => state.batch_status.clone(),
            Surface::Search => state.search_status.clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MapState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MapState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MapHost for MapView {
    fn add_feature(&self, layer: Layer, feature: StyledFeature) {
        debug!(?layer, postcode = %feature.feature.postcode(), "Adding feature");
        let mut state = self.write();
        state.overlay_mut(layer).push(feature);
        state.updated_at = Utc::now();
    }

    fn clear_layer(&self, layer: Layer) {
        let mut state = self.write();
        if !state.overlay(layer).is_empty() {
            state.overlay_mut(layer).clear();
            state.updated_at = Utc::now();
        }
    }

    fn layer_bounds(&self, layer: Layer) -> Option<Bounds> {
        self.read()
            .overlay(layer)
            .iter()
            .filter_map(|styled| styled.feature.bounds())
            .reduce(Bounds::union)
    }

    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]) {
        let mut state = self.write();
        state.viewport.center = bounds.center();
        state.viewport.bounds = Some(bounds);
        state.viewport.padding = Some(padding);
        state.updated_at = Utc::now();
    }
}

impl StatusSink for MapView {
    fn report(&self, surface: Surface, message: &str) {
        let mut state = self.write();
        *state.status_mut(surface) = Some(message.to_string());
        state.updated_at = Utc::now();
    }

    fn clear(&self, surface: Surface) {
        let mut state = self.write();
        if state.status_mut(surface).take().is_some() {
            state.updated_at = Utc::now();
        }
    }
}

impl Serialize for StyledFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Properties<'a> {
            postcode: &'a str,
            popup: &'a str,
            style: &'a super::Style,
        }

        let mut feature = serializer.serialize_struct("Feature", 3)?;
        feature.serialize_field("type", "Feature")?;
        feature.serialize_field(
            "properties",
            &Properties {
                postcode: self.feature.postcode().as_str(),
                popup: &self.popup,
                style: &self.style,
            },
        )?;
        feature.serialize_field("geometry", self.feature.geometry())?;
        feature.end()
    }
}

fn feature_collection<S: Serializer>(
    features: &[StyledFeature],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut collection = serializer.serialize_struct("FeatureCollection", 2)?;
    collection.serialize_field("type", "FeatureCollection")?;
    collection.serialize_field("features", features)?;
    collection.end()
}
