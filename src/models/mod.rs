//! Core data models for boundary features and tabular records.

pub mod feature;
pub mod record;

pub use feature::{BoundaryFeature, FeatureCollection, GeoPoint};
pub use record::{EnrichedRecord, Record};
