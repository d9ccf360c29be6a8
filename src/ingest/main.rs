//! Registry import pipeline.
//!
//! Reads the three sheet exports, classifies business sizes, normalizes
//! the result into tables and replaces the contents of the store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use segmenta::config::Config;
use segmenta::dataset::{dataset_overview, load_sheets, normalize, BusinessStore, ImportMetadata, SheetPaths};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Import the business registry sheets into the store")]
struct Args {
    /// Activities sheet (id, codigo_act, nombre_act, per_ocu)
    #[arg(long)]
    activities: PathBuf,

    /// Municipalities sheet (municipio, entidad)
    #[arg(long)]
    municipalities: PathBuf,

    /// Geolocation sheet (latitud, longitud)
    #[arg(long)]
    locations: PathBuf,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store directory (overrides config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Parse and report without writing to the store
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(store) = args.store {
        config.store.path = store;
    }

    info!("Segmenta Ingest Pipeline");

    let paths = SheetPaths {
        activities: args.activities,
        municipalities: args.municipalities,
        locations: args.locations,
    };

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("reading sheets");
    let rows = load_sheets(&paths).context("Failed to load sheets")?;
    pb.inc(1);

    pb.set_message("normalizing");
    let tables = normalize(&rows);
    pb.inc(1);

    pb.set_message("writing store");
    if args.dry_run {
        warn!("Dry run, store at {} left untouched", config.store.path.display());
    } else {
        let store = BusinessStore::open(&config.store.path).with_context(|| {
            format!("Failed to open store at {}", config.store.path.display())
        })?;
        let sources = [&paths.activities, &paths.municipalities, &paths.locations]
            .iter()
            .map(|p| source_name(p))
            .collect();
        let metadata = ImportMetadata::for_tables(&tables, sources);
        store
            .replace_all(&tables, &metadata)
            .context("Failed to write store")?;
    }
    pb.inc(1);

    pb.set_message("summarizing");
    let records = tables.join();
    let overview = dataset_overview(&records);
    pb.inc(1);
    pb.finish_with_message("Import complete");

    let located = records.iter().filter(|r| r.position.is_some()).count();
    info!(
        "Imported {} units ({} with position, {} without)",
        overview.total_records,
        located,
        overview.total_records - located
    );
    info!(
        "{} municipalities, {} sectors, {} employees (upper bound)",
        overview.unique_municipalities, overview.unique_sectors, overview.total_employees
    );
    info!("Size distribution:");
    for entry in &overview.size_distribution {
        info!(
            "  {:<8} {:>8} ({:.1}%)",
            entry.category.as_str(),
            entry.count,
            entry.percentage
        );
    }
    info!("Top municipalities:");
    for m in &overview.top_municipalities {
        info!("  {}: {}", m.name, m.count);
    }

    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.csv")
        .to_string()
}
