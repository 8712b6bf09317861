use std::fmt;

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use super::geometry::{geometry_kind, representative_point, GeometryIssue};
use crate::crs::Crs;
use crate::error::IndexError;
use crate::models::{FeatureCollection, GeoPoint};
use crate::normalize::Normalizer;

/// A non-fatal problem met while indexing a feature
#[derive(Debug, Clone, PartialEq)]
pub enum IndexWarning {
    MissingGeometry { name: String },
    UnsupportedGeometry { name: String, kind: &'static str },
    EmptyGeometry { name: String, kind: &'static str },
    EmptyKey { name: String },
    DuplicateKey { name: String, key: String, kept: String },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexWarning::MissingGeometry { name } => {
                write!(f, "skipped {:?}: no geometry", name)
            }
            IndexWarning::UnsupportedGeometry { name, kind } => {
                write!(f, "skipped {:?}: unsupported geometry type {}", name, kind)
            }
            IndexWarning::EmptyGeometry { name, kind } => {
                write!(f, "skipped {:?}: empty {} geometry", name, kind)
            }
            IndexWarning::EmptyKey { name } => {
                write!(f, "skipped {:?}: name is empty after normalization", name)
            }
            IndexWarning::DuplicateKey { name, key, kept } => write!(
                f,
                "dropped {:?}: key {:?} already taken by {:?}",
                name, key, kept
            ),
        }
    }
}

/// One indexed administrative unit
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: String,
    /// Source name of the feature that claimed the key
    pub name: String,
    pub point: GeoPoint,
}

/// Immutable lookup table from normalized key to representative point.
///
/// Carries the normalizer it was built with so that lookups fold names
/// exactly like the boundary names were folded.
#[derive(Debug, Clone)]
pub struct BoundaryIndex {
    entries: Vec<IndexEntry>,
    by_key: HashMap<String, usize>,
    normalizer: Normalizer,
}

impl BoundaryIndex {
    /// Look up an already normalized key. The empty key never matches.
    pub fn get(&self, key: &str) -> Option<GeoPoint> {
        if key.is_empty() {
            return None;
        }
        self.by_key.get(key).map(|&i| self.entries[i].point)
    }

    /// Normalize a raw name and look it up
    pub fn lookup(&self, name: &str) -> Option<GeoPoint> {
        self.get(&self.normalizer.normalize(name))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Entries in input order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The index plus the warnings collected while building it
#[derive(Debug, Clone)]
pub struct IndexResult {
    pub index: BoundaryIndex,
    pub warnings: Vec<IndexWarning>,
}

/// Build an index with the default normalizer
pub fn build_index(collection: &FeatureCollection) -> Result<IndexResult, IndexError> {
    build_index_with(collection, &Normalizer::default())
}

/// Build an index from features in input order.
///
/// When several features normalize to the same key the first one kept
/// wins; the rest become [`IndexWarning::DuplicateKey`]. Features without a
/// usable geometry or key are skipped with a warning. An unsupported CRS or
/// a vertex that cannot be reprojected aborts the whole build.
pub fn build_index_with(
    collection: &FeatureCollection,
    normalizer: &Normalizer,
) -> Result<IndexResult, IndexError> {
    let crs = Crs::from_epsg(collection.srid)?;

    info!(
        "Building boundary index for {} features (EPSG:{})...",
        collection.features.len(),
        crs.epsg()
    );

    let mut entries: Vec<IndexEntry> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut warnings = Vec::new();

    for feature in &collection.features {
        let name = feature.name.trim();

        let Some(geometry) = &feature.geometry else {
            warnings.push(IndexWarning::MissingGeometry {
                name: name.to_string(),
            });
            continue;
        };

        let geographic = crs
            .reproject(geometry)
            .map_err(|c| IndexError::Reprojection {
                name: name.to_string(),
                epsg: crs.epsg(),
                x: c.x,
                y: c.y,
            })?;

        let point = match representative_point(&geographic) {
            Ok(point) => point,
            Err(issue) => {
                let kind = geometry_kind(geometry);
                warnings.push(match issue {
                    GeometryIssue::Unsupported => IndexWarning::UnsupportedGeometry {
                        name: name.to_string(),
                        kind,
                    },
                    GeometryIssue::Empty => IndexWarning::EmptyGeometry {
                        name: name.to_string(),
                        kind,
                    },
                });
                continue;
            }
        };

        let key = normalizer.normalize(name);
        if key.is_empty() {
            warnings.push(IndexWarning::EmptyKey {
                name: name.to_string(),
            });
            continue;
        }

        if let Some(&existing) = by_key.get(&key) {
            warnings.push(IndexWarning::DuplicateKey {
                name: name.to_string(),
                key,
                kept: entries[existing].name.clone(),
            });
            continue;
        }

        debug!("Indexed {:?} as {:?} at ({}, {})", name, key, point.lat, point.lon);
        by_key.insert(key.clone(), entries.len());
        entries.push(IndexEntry {
            key,
            name: name.to_string(),
            point,
        });
    }

    for warning in &warnings {
        warn!("{}", warning);
    }
    info!(
        "Boundary index built with {} entries ({} warnings)",
        entries.len(),
        warnings.len()
    );

    Ok(IndexResult {
        index: BoundaryIndex {
            entries,
            by_key,
            normalizer: normalizer.clone(),
        },
        warnings,
    })
}
