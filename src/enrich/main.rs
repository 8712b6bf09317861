//! Enrichment CLI.
//!
//! Reads CSV tables and boundary files, runs them through the cairn
//! matching stages, and writes the enriched output.

mod boundaries;
mod config;
mod table;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cairn::{annotate_features, build_index_with, join_records_par, TitleMatcher};

use crate::config::Config;
use crate::table::Table;

#[derive(Parser, Debug)]
#[command(name = "enrich")]
#[command(about = "Match administrative-unit names against boundary data")]
struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append boundary-centroid coordinates to each CSV row
    Join {
        #[command(flatten)]
        io: IoArgs,

        /// Column naming one or more administrative units
        #[arg(long, default_value = "Lead Office")]
        field: String,

        /// Separator between units in a multi-value field
        #[arg(long, default_value = ",")]
        delimiter: String,
    },

    /// Append the canonical unit names mentioned in each title
    Titles {
        #[command(flatten)]
        io: IoArgs,

        /// Column holding the free-text title
        #[arg(long, default_value = "title")]
        title_field: String,
    },

    /// Copy record fields onto the boundary features that records name
    Annotate {
        #[command(flatten)]
        io: IoArgs,

        /// Column naming one or more administrative units
        #[arg(long, default_value = "admin unit")]
        field: String,

        /// Separator between units in a multi-value field
        #[arg(long, default_value = ";")]
        delimiter: String,

        /// Record columns to copy onto matched features
        #[arg(long, value_delimiter = ',', default_value = "title,type,comments_close_on,html_url")]
        copy: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Boundary file (GeoJSON or ArcGIS JSON, optionally .gz; CSV of names for `titles`)
    #[arg(short, long)]
    boundaries: PathBuf,

    /// Input CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Output path
    #[arg(short, long)]
    output: PathBuf,

    /// Boundary attribute holding the unit name
    #[arg(long)]
    name_field: Option<String>,

    /// EPSG code of the boundary coordinates, overriding the file
    #[arg(long)]
    srid: Option<u32>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Join {
            io,
            field,
            delimiter,
        } => run_join(&config, &io, &field, &delimiter),
        Command::Titles { io, title_field } => run_titles(&config, &io, &title_field),
        Command::Annotate {
            io,
            field,
            delimiter,
            copy,
        } => run_annotate(&config, &io, &field, &delimiter, &copy),
    }
}

/// Flag value, then config value
fn name_field<'a>(config: &'a Config, io: &'a IoArgs) -> Option<&'a str> {
    io.name_field
        .as_deref()
        .or(config.boundaries.name_field.as_deref())
}

fn run_join(config: &Config, io: &IoArgs, field: &str, delimiter: &str) -> Result<()> {
    let collection = boundaries::load(
        &io.boundaries,
        name_field(config, io),
        io.srid.or(config.boundaries.srid),
    )?;
    let result = build_index_with(&collection, &config.normalizer())
        .context("Failed to build boundary index")?;

    let mut table = Table::read(&io.input)?;
    table.require_column(field)?;

    let enriched = join_records_par(&table.records, field, &result.index, delimiter);
    let located = enriched.iter().filter(|r| r.location.is_some()).count();

    let (lat_field, lon_field) = (&config.output.lat_field, &config.output.lon_field);
    table.records = enriched
        .iter()
        .map(|r| r.to_record(lat_field, lon_field))
        .collect();
    table.add_column(lat_field);
    table.add_column(lon_field);
    table.write(&io.output)?;

    info!(
        "Done: {} of {} rows located, {} index warnings",
        located,
        table.records.len(),
        result.warnings.len()
    );
    Ok(())
}

fn run_titles(config: &Config, io: &IoArgs, title_field: &str) -> Result<()> {
    let names = boundaries::load_names(&io.boundaries, name_field(config, io))?;
    let matcher = TitleMatcher::with_normalizer(&names, config.normalizer());
    info!("Matching titles against {} canonical names", matcher.len());

    let mut table = Table::read(&io.input)?;
    table.require_column(title_field)?;

    let titles: Vec<&str> = table
        .records
        .iter()
        .map(|r| r.get(title_field).unwrap_or_default())
        .collect();
    let hits = matcher.match_all_par(&titles[..]);

    let units_field = &config.output.units_field;
    let mut matched = 0;
    let records = table
        .records
        .iter()
        .zip(hits)
        .map(|(record, units)| {
            if !units.is_empty() {
                matched += 1;
            }
            let mut record = record.clone();
            record.insert(units_field.as_str(), units.join(&config.output.units_separator));
            record
        })
        .collect();
    table.records = records;
    table.add_column(units_field);
    table.write(&io.output)?;

    info!("Done: {} of {} titles matched", matched, table.records.len());
    Ok(())
}

fn run_annotate(
    config: &Config,
    io: &IoArgs,
    field: &str,
    delimiter: &str,
    copy: &[String],
) -> Result<()> {
    let mut collection = boundaries::load(
        &io.boundaries,
        name_field(config, io),
        io.srid.or(config.boundaries.srid),
    )?;

    let table = Table::read(&io.input)?;
    table.require_column(field)?;

    collection.features = annotate_features(
        &collection.features,
        &table.records,
        field,
        delimiter,
        copy,
        &config.normalizer(),
    );
    boundaries::write_geojson(&io.output, &collection)?;
    Ok(())
}
