//! CSV rows in and out.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::info;

use cairn::Record;

/// A header row plus every data row, in file order
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        info!("Reading records from {}", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let table = Self::from_reader(file)?;
        info!("Loaded {} records", table.records.len());
        Ok(table)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        // Excel exports start with a BOM
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        for (i, header) in headers.iter().enumerate() {
            if headers[..i].contains(header) {
                anyhow::bail!("Duplicate column {:?} in header", header);
            }
        }

        let mut records = Vec::new();
        for result in csv_reader.records() {
            let row = result?;
            // Short rows are padded with empty cells; extra non-empty cells have no column
            if row.iter().skip(headers.len()).any(|v| !v.trim().is_empty()) {
                let line = row.position().map_or(0, |p| p.line());
                anyhow::bail!(
                    "Row on line {} has {} cells but the header has {} columns",
                    line,
                    row.len(),
                    headers.len()
                );
            }
            let values: Vec<&str> = row.iter().collect();
            records.push(Record::from_row(&headers[..], &values[..]));
        }

        Ok(Self { headers, records })
    }

    /// Require a column, listing what is available when it is missing
    pub fn require_column(&self, name: &str) -> Result<()> {
        if self.headers.iter().any(|h| h == name) {
            return Ok(());
        }
        anyhow::bail!(
            "Column {:?} not found (available: {})",
            name,
            self.headers.join(", ")
        )
    }

    /// Append a column name if it is not already present
    pub fn add_column(&mut self, name: &str) {
        if !self.headers.iter().any(|h| h == name) {
            self.headers.push(name.to_string());
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.to_writer(file)?;
        info!("Wrote {} rows to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new().from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for record in &self.records {
            csv_writer.write_record(self.headers.iter().map(|h| record.get(h).unwrap_or_default()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_and_short_rows() {
        let data = "\u{feff}Project Name,Lead Office\nSage Grouse,Vale District Office\nShort\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Project Name", "Lead Office"]);
        assert_eq!(table.records[0].get("Lead Office"), Some("Vale District Office"));
        assert_eq!(table.records[1].get("Lead Office"), None);
        assert!(table.require_column("Lead Office").is_ok());
        assert!(table.require_column("Office").is_err());
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err = Table::from_reader("title,Lead Office,title\nA,Vale,B\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Duplicate column"));
    }

    #[test]
    fn test_long_row_is_rejected_with_line() {
        let data = "Project Name,Lead Office\nSage Grouse,Vale District Office\nJuniper,Burns,Lakeview\n";
        let err = Table::from_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));

        // Trailing empty cells are harmless
        let table = Table::from_reader("a,b\n1,2,\n".as_bytes()).unwrap();
        assert_eq!(table.records[0].get("b"), Some("2"));
    }

    #[test]
    fn test_write_fills_missing_cells() {
        let mut table = Table::from_reader("a,b\n1,2\n".as_bytes()).unwrap();
        table.add_column("lat");
        table.add_column("lat");
        let mut out = Vec::new();
        table.to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b,lat\n1,2,\n");
    }

    #[test]
    fn test_file_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("out.csv");

        let mut table = Table::from_reader("Lead Office\nVale District Office\n".as_bytes()).unwrap();
        table.records[0].insert("Latitude", "43.98");
        table.add_column("Latitude");
        table.write(&path).unwrap();

        let back = Table::read(&path).unwrap();
        assert_eq!(back.headers, vec!["Lead Office", "Latitude"]);
        assert_eq!(back.records[0].get("Latitude"), Some("43.98"));
    }
}
