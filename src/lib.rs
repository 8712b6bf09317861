//! Cairn - name resolution and geospatial join for land-management datasets
//!
//! This library matches free-text administrative-unit names (field offices,
//! national forests, notice titles) against a boundary dataset and attaches a
//! representative coordinate to each matched record. The `enrich` binary is a
//! thin CSV/GeoJSON adapter over these modules.

pub mod crs;
pub mod error;
pub mod index;
pub mod join;
pub mod models;
pub mod normalize;
pub mod titles;

pub use crs::Crs;
pub use error::IndexError;
pub use index::{build_index, build_index_with, BoundaryIndex, IndexEntry, IndexResult, IndexWarning};
pub use join::{annotate_features, join_records, join_records_par};
pub use models::{BoundaryFeature, EnrichedRecord, FeatureCollection, GeoPoint, Record};
pub use normalize::{normalize, Normalizer};
pub use titles::{match_titles, TitleMatcher};
