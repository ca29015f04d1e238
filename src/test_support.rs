//! Fixtures shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hashbrown::HashSet;
use tokio::time::Instant;

use crate::config::{MapConfig, DEFAULT_ATTRIBUTION, DEFAULT_TILE_URL};
use crate::error::ResolveError;
use crate::geocode::Resolver;
use crate::models::{Coordinate, Feature, PostalCode};
use crate::status::{StatusSink, Surface};

pub fn sample_map_config() -> MapConfig {
    MapConfig {
        center: Coordinate::new(52.1326, 5.2913),
        zoom: 8,
        fill_color: "#3388ff".to_string(),
        fill_opacity: 0.4,
        stroke_color: "#0055aa".to_string(),
        stroke_weight: 2,
        tile_url: DEFAULT_TILE_URL.to_string(),
        attribution: DEFAULT_ATTRIBUTION.to_string(),
    }
}

/// Feature as the secondary service would return it: a verbatim polygon.
pub fn polygon_feature(code: &str) -> Feature {
    let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
        vec![4.62, 52.38],
        vec![4.64, 52.38],
        vec![4.64, 52.39],
        vec![4.62, 52.39],
        vec![4.62, 52.38],
    ]]));
    Feature::new(PostalCode::parse(code).unwrap(), geometry)
}

/// Resolver with canned answers that records every lookup.
pub struct StubResolver {
    name: &'static str,
    hits: HashSet<String>,
    errors: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(PostalCode, Instant)>>,
}

impl StubResolver {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            hits: HashSet::new(),
            errors: HashSet::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hit(mut self, code: &str) -> Self {
        self.hits.insert(code.to_string());
        self
    }

    pub fn with_error(mut self, code: &str) -> Self {
        self.errors.insert(code.to_string());
        self
    }

    /// Answer every lookup only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(PostalCode, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Resolver for StubResolver {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, code: &PostalCode) -> Result<Option<Feature>, ResolveError> {
        self.calls
            .lock()
            .unwrap()
            .push((code.clone(), Instant::now()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.errors.contains(code.as_str()) {
            return Err(ResolveError::Centroid("POINT()".to_string()));
        }
        Ok(self
            .hits
            .contains(code.as_str())
            .then(|| polygon_feature(code.as_str())))
    }
}

/// Status sink that keeps every message per surface.
#[derive(Default)]
pub struct RecordingStatus {
    messages: Mutex<HashMap<Surface, Vec<String>>>,
    current: Mutex<HashMap<Surface, String>>,
}

impl RecordingStatus {
    pub fn messages(&self, surface: Surface) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .get(&surface)
            .cloned()
            .unwrap_or_default()
    }

    pub fn current(&self, surface: Surface) -> Option<String> {
        self.current.lock().unwrap().get(&surface).cloned()
    }
}

impl StatusSink for RecordingStatus {
    fn report(&self, surface: Surface, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .entry(surface)
            .or_default()
            .push(message.to_string());
        self.current
            .lock()
            .unwrap()
            .insert(surface, message.to_string());
    }

    fn clear(&self, surface: Surface) {
        self.current.lock().unwrap().remove(&surface);
    }
}
