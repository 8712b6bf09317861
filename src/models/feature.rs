//! Boundary features as handed over by the file readers.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geographic point (lat/lon, WGS 84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Arithmetic mean of latitudes and longitudes, taken independently.
    ///
    /// This is a map-pin approximation, not the centroid of the combined
    /// geometries. Returns `None` for an empty slice.
    pub fn mean(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
        let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
        Some(GeoPoint { lat, lon })
    }
}

/// A named administrative unit with its source geometry.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    /// Source-provided name (e.g. `ADMU_NAME`, `FORESTNAME`)
    pub name: String,

    /// Geometry in the collection's CRS; `None` when the source had none
    pub geometry: Option<Geometry<f64>>,

    /// Remaining source attributes, passed through untouched
    pub attributes: Map<String, Value>,
}

impl BoundaryFeature {
    pub fn new(name: impl Into<String>, geometry: Option<Geometry<f64>>) -> Self {
        Self {
            name: name.into(),
            geometry,
            attributes: Map::new(),
        }
    }
}

/// Features in input order plus the EPSG code of their coordinates.
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    pub srid: u32,
    pub features: Vec<BoundaryFeature>,
}

impl FeatureCollection {
    pub fn new(srid: u32, features: Vec<BoundaryFeature>) -> Self {
        Self { srid, features }
    }

    /// Feature names in input order, for use as a canonical name list
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_none() {
        assert!(GeoPoint::mean(&[]).is_none());
    }

    #[test]
    fn test_mean_is_per_axis() {
        let mean = GeoPoint::mean(&[GeoPoint::new(44.0, -121.0), GeoPoint::new(44.2, -122.0)])
            .unwrap();
        assert!((mean.lat - 44.1).abs() < 1e-9);
        assert!((mean.lon + 121.5).abs() < 1e-9);
    }
}
