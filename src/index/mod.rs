//! Boundary index: normalized name -> representative coordinate.
//!
//! Built once per run from a feature collection, then shared read-only by
//! the record joiner and any other consumer.

mod builder;
mod geometry;

pub use builder::{build_index, build_index_with, BoundaryIndex, IndexEntry, IndexResult, IndexWarning};
pub use geometry::{geometry_kind, representative_point, GeometryIssue};
