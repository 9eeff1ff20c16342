//! Enrichment passes over an imported place-name store.
//!
//! Sets display names and alternative names on places, and street ids on
//! housenumbers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use placenames::{Config, NameResolver, RecordStore, SledStore, StreetResolver, Table};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "enrich")]
#[command(about = "Resolve place names and housenumber streets in a record store")]
struct Args {
    /// Record store directory
    #[arg(long)]
    db: PathBuf,

    /// TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set names and alternative names of points, lines and polygons
    Names,
    /// Set street ids of housenumbers
    Streets,
    /// Run both passes, names first so the street pass sees resolved street names
    All,
    /// Load newline-delimited JSON records into a table
    Load {
        /// Target table (osm_point, osm_linestring, osm_polygon, osm_housenumber)
        #[arg(long)]
        table: Table,

        /// File with one JSON object per line
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let mut store = SledStore::open(&args.db).context("Failed to open record store")?;

    match args.command {
        Command::Names => run_names(&config, &mut store)?,
        Command::Streets => run_streets(&config, &mut store)?,
        Command::All => {
            run_names(&config, &mut store)?;
            run_streets(&config, &mut store)?;
        }
        Command::Load { table, file } => load_records(&mut store, table, &file)?,
    }

    Ok(())
}

fn run_names(config: &Config, store: &mut SledStore) -> Result<()> {
    let report = NameResolver::new(config.names.clone())
        .run(store)
        .context("Name pass failed")?;
    info!(
        "Names: {} records, {} renamed, {} with alternative names",
        report.records, report.renamed, report.with_alternatives
    );
    Ok(())
}

fn run_streets(config: &Config, store: &mut SledStore) -> Result<()> {
    let report = StreetResolver::new(config.streets.clone())
        .run(store)
        .context("Street pass failed")?;
    info!(
        "Streets: {} of {} housenumbers matched",
        report.matched, report.addresses
    );
    Ok(())
}

fn load_records(store: &mut SledStore, table: Table, path: &Path) -> Result<()> {
    info!("Loading {} from {}", table, path.display());

    let file = File::open(path).context("Failed to open record file")?;
    let mut count = 0usize;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON on line {}", index + 1))?;
        store
            .insert(table, record)
            .with_context(|| format!("Failed to store record on line {}", index + 1))?;
        count += 1;
    }

    store.flush()?;
    info!("Loaded {} records into {}", count, table);
    Ok(())
}
