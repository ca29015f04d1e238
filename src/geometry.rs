//! Approximate postcode boundaries.
//!
//! Real PC4 boundary data is not available, so every area is drawn as a
//! circle-like polygon around the geocoded centroid.

use std::f64::consts::PI;

use geo::{Coord, LineString, Polygon};

use crate::models::{Coordinate, Feature, PostalCode};

/// Angular radius of the approximation (~2 km)
pub const RADIUS_DEG: f64 = 0.02;

/// Number of distinct vertices in the ring
pub const VERTEX_COUNT: usize = 20;

/// Build a closed ring of `VERTEX_COUNT + 1` (lon, lat) vertices around `center`.
///
/// Longitude offsets are divided by `cos(lat)` to compensate for meridian
/// convergence away from the equator.
pub fn approximate_ring(center: Coordinate) -> Vec<Coord<f64>> {
    let lon_scale = center.lat.to_radians().cos();

    let mut ring: Vec<Coord<f64>> = (0..VERTEX_COUNT)
        .map(|i| {
            let angle = (i as f64 / VERTEX_COUNT as f64) * 2.0 * PI;
            let lat_offset = RADIUS_DEG * angle.cos();
            let lon_offset = RADIUS_DEG * angle.sin() / lon_scale;
            Coord {
                x: center.lon + lon_offset,
                y: center.lat + lat_offset,
            }
        })
        .collect();

    ring.push(ring[0]);
    ring
}

/// Approximate the area of `label` as a polygon around `center`.
pub fn approximate(center: Coordinate, label: &PostalCode) -> Feature {
    let polygon = Polygon::new(LineString::new(approximate_ring(center)), vec![]);
    let geometry = geojson::Geometry::new(geojson::Value::from(&polygon));
    Feature::new(label.clone(), geometry)
}
