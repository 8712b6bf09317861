//! Fatal errors raised while building a boundary index.
//!
//! Everything recoverable (bad geometry, duplicate names, no match) is
//! reported as an [`IndexWarning`](crate::IndexWarning) or an empty result
//! instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    /// The collection's EPSG code has no known inverse projection.
    #[error("unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    /// A vertex could not be brought into longitude/latitude.
    #[error("cannot reproject feature {name:?} from EPSG:{epsg}: vertex ({x}, {y}) is outside the valid range")]
    Reprojection {
        name: String,
        epsg: u32,
        x: f64,
        y: f64,
    },
}
