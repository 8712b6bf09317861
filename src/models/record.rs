//! Tabular rows and their enriched counterparts.

use serde::Serialize;

use super::GeoPoint;

/// An ordered row of named string fields (one CSV line).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from parallel header and value slices
    pub fn from_row<H, V>(headers: &[H], values: &[V]) -> Self
    where
        H: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = headers
            .iter()
            .zip(values.iter())
            .map(|(h, v)| (h.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        Self { fields }
    }

    /// Set a field, replacing the value in place if the name already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// A copy of an input row with an optional representative coordinate.
///
/// `location` is `None` when no part of the joined field matched; a
/// `(0, 0)` coordinate is a real location, never a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: Record,
    pub location: Option<GeoPoint>,
    /// Number of field parts that resolved to an index entry
    pub matched: usize,
}

impl EnrichedRecord {
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.lon)
    }

    /// Flatten to the original fields followed by the two coordinate
    /// fields; unmatched rows get empty strings.
    pub fn to_record(&self, lat_field: &str, lon_field: &str) -> Record {
        let mut out = self.record.clone();
        let (lat, lon) = match self.location {
            Some(p) => (p.lat.to_string(), p.lon.to_string()),
            None => (String::new(), String::new()),
        };
        out.insert(lat_field, lat);
        out.insert(lon_field, lon);
        out
    }
}
