use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use cairn::Normalizer;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub normalize: NormalizeConfig,
    pub boundaries: BoundaryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Additional generic words dropped from names
    pub extra_tokens: Vec<String>,
    /// Additional generic multi-word phrases
    pub extra_phrases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BoundaryConfig {
    pub name_field: Option<String>,
    pub srid: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub lat_field: String,
    pub lon_field: String,
    pub units_field: String,
    pub units_separator: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            lat_field: "Latitude".to_string(),
            lon_field: "Longitude".to_string(),
            units_field: "admin_units".to_string(),
            units_separator: "; ".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::default()
            .with_tokens(&self.normalize.extra_tokens)
            .with_tokens(&self.normalize.extra_phrases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.output.lat_field, "Latitude");
        assert_eq!(config.output.units_separator, "; ");
        assert!(config.boundaries.srid.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [normalize]
            extra_phrases = ["ranger district"]

            [boundaries]
            name_field = "FORESTNAME"
            srid = 3857

            [output]
            lat_field = "lat"
            "#,
        )
        .unwrap();
        assert_eq!(config.boundaries.name_field.as_deref(), Some("FORESTNAME"));
        assert_eq!(config.boundaries.srid, Some(3857));
        assert_eq!(config.output.lat_field, "lat");
        assert_eq!(config.output.lon_field, "Longitude");
        assert_eq!(config.normalizer().normalize("Crescent Ranger District"), "CRESCENT");
    }
}
