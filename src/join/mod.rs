//! Record joiner: attach a representative coordinate to tabular rows.
//!
//! A row's admin-unit field may list several units separated by a
//! delimiter. Each part is normalized and looked up on its own; the row gets
//! the per-axis mean of every part that matched.

mod annotate;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::index::BoundaryIndex;
use crate::models::{EnrichedRecord, GeoPoint, Record};

pub use annotate::annotate_features;

/// Split a multi-value field into trimmed, non-empty parts.
///
/// An empty delimiter leaves the field whole.
pub fn split_field<'a>(value: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> {
    let limit = if delimiter.is_empty() { 1 } else { usize::MAX };
    value
        .splitn(limit, delimiter)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Resolve a single multi-value field against the index.
///
/// Returns the mean point and the number of parts that matched; unmatched
/// parts are ignored.
pub fn resolve_field(index: &BoundaryIndex, value: &str, delimiter: &str) -> (Option<GeoPoint>, usize) {
    let matches: Vec<GeoPoint> = split_field(value, delimiter)
        .filter_map(|part| index.lookup(part))
        .collect();
    (GeoPoint::mean(&matches), matches.len())
}

fn join_one(record: &Record, field: &str, index: &BoundaryIndex, delimiter: &str) -> EnrichedRecord {
    let (location, matched) = match record.get(field) {
        Some(value) => resolve_field(index, value, delimiter),
        None => (None, 0),
    };
    if location.is_none() {
        debug!("No boundary match for {:?}", record.get(field).unwrap_or_default());
    }
    EnrichedRecord {
        record: record.clone(),
        location,
        matched,
    }
}

/// Enrich every record; output order matches input order.
///
/// A record missing `field` is treated like one whose field matched nothing.
pub fn join_records(
    records: &[Record],
    field: &str,
    index: &BoundaryIndex,
    delimiter: &str,
) -> Vec<EnrichedRecord> {
    let enriched: Vec<EnrichedRecord> = records
        .iter()
        .map(|record| join_one(record, field, index, delimiter))
        .collect();
    log_summary(&enriched);
    enriched
}

/// Same as [`join_records`], sharded across the rayon thread pool
pub fn join_records_par(
    records: &[Record],
    field: &str,
    index: &BoundaryIndex,
    delimiter: &str,
) -> Vec<EnrichedRecord> {
    let enriched: Vec<EnrichedRecord> = records
        .par_iter()
        .map(|record| join_one(record, field, index, delimiter))
        .collect();
    log_summary(&enriched);
    enriched
}

fn log_summary(enriched: &[EnrichedRecord]) {
    let located = enriched.iter().filter(|r| r.location.is_some()).count();
    info!("Located {} of {} records", located, enriched.len());
}
