//! Core data models for the postcode map.

pub mod feature;
pub mod postcode;

pub use feature::{Bounds, Coordinate, Feature};
pub use postcode::{trim_zipcode, InvalidPostalCode, PostalCode};
