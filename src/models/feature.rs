//! GeoJSON feature produced for every resolved postcode.

use geo::BoundingRect;
use serde::{Deserialize, Serialize};

use super::PostalCode;

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct FeatureProperties {
    postcode: PostalCode,
}

/// A resolved postcode area in GeoJSON Feature shape.
///
/// Built fresh on every resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: FeatureProperties,
    geometry: geojson::Geometry,
}

impl Feature {
    pub fn new(postcode: PostalCode, geometry: geojson::Geometry) -> Self {
        Self {
            kind: "Feature",
            properties: FeatureProperties { postcode },
            geometry,
        }
    }

    pub fn postcode(&self) -> &PostalCode {
        &self.properties.postcode
    }

    pub fn geometry(&self) -> &geojson::Geometry {
        &self.geometry
    }

    /// Bounding box of the geometry, `None` if the geometry is empty or
    /// cannot be interpreted.
    pub fn bounds(&self) -> Option<Bounds> {
        let geometry = geo_types::Geometry::<f64>::try_from(self.geometry.clone()).ok()?;
        geometry.bounding_rect().map(Bounds::from)
    }
}

/// Bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Smallest box covering both `self` and `other`
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

impl From<geo::Rect<f64>> for Bounds {
    fn from(rect: geo::Rect<f64>) -> Self {
        Bounds::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}
