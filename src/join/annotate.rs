//! Reverse join: copy fields from the first matching record onto each
//! boundary feature, e.g. to render open comment periods on a forest map.

use serde_json::Value;
use tracing::info;

use super::split_field;
use crate::models::{BoundaryFeature, Record};
use crate::normalize::Normalizer;

/// Annotate features with fields of the first record that names them.
///
/// Features and records are scanned in input order, so the earliest record
/// listing a unit wins. Features with no match, or whose name normalizes to
/// the empty key, come back unchanged.
pub fn annotate_features(
    features: &[BoundaryFeature],
    records: &[Record],
    field: &str,
    delimiter: &str,
    copy_fields: &[String],
    normalizer: &Normalizer,
) -> Vec<BoundaryFeature> {
    // Keys listed by each record, computed once
    let record_keys: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            record
                .get(field)
                .map(|value| {
                    split_field(value, delimiter)
                        .map(|part| normalizer.normalize(part))
                        .filter(|key| !key.is_empty())
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let mut annotated = 0;
    let out = features
        .iter()
        .map(|feature| {
            let mut feature = feature.clone();
            let key = normalizer.normalize(&feature.name);
            if key.is_empty() {
                return feature;
            }
            let hit = records
                .iter()
                .zip(&record_keys)
                .find(|(_, keys)| keys.contains(&key))
                .map(|(record, _)| record);
            if let Some(record) = hit {
                for name in copy_fields {
                    let value = record.get(name).unwrap_or_default();
                    feature
                        .attributes
                        .insert(name.clone(), Value::String(value.to_string()));
                }
                annotated += 1;
            }
            feature
        })
        .collect();

    info!("Annotated {} of {} features", annotated, features.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(title: &str, units: &str) -> Record {
        Record::from_row(&["title", "admin unit", "html_url"], &[title, units, "https://example.org"])
    }

    #[test]
    fn test_first_record_wins() {
        let features = vec![
            BoundaryFeature::new("Deschutes National Forest", None),
            BoundaryFeature::new("Umatilla National Forest", None),
        ];
        let records = vec![
            notice("Fuels project", "Ochoco National Forest; deschutes national forest"),
            notice("Trail plan", "Deschutes National Forest"),
        ];
        let copy = vec!["title".to_string(), "missing".to_string()];

        let out = annotate_features(&features, &records, "admin unit", ";", &copy, &Normalizer::default());

        assert_eq!(out[0].attributes["title"], Value::String("Fuels project".into()));
        assert_eq!(out[0].attributes["missing"], Value::String(String::new()));
        assert!(out[1].attributes.is_empty());
        assert!(features[0].attributes.is_empty());
    }

    #[test]
    fn test_empty_key_feature_is_untouched() {
        let features = vec![BoundaryFeature::new("National Forest", None)];
        let records = vec![notice("Anything", "National Forest")];
        let copy = vec!["title".to_string()];
        let out = annotate_features(&features, &records, "admin unit", ";", &copy, &Normalizer::default());
        assert!(out[0].attributes.is_empty());
    }
}
