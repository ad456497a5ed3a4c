//! Catalog ingestion command handlers

use std::path::PathBuf;

use super::open_store;
use crate::config::Config;
use crate::services::{ImportService, SeaOrmImportService};

pub async fn cmd_import_csv(config: &Config, csv_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = csv_path.unwrap_or_else(|| PathBuf::from(&config.import.csv_path));
    let importer = SeaOrmImportService::new(open_store(config).await?, config.import.clone());

    println!("Importing {} ...", path.display());
    let summary = importer.import_csv(&path).await?;

    println!("✓ Import finished ({})", summary.encoding);
    println!("  Rows:     {}", summary.rows);
    println!("  Added:    {}", summary.added);
    println!("  Updated:  {}", summary.updated);
    println!("  Failed:   {}", summary.failed);
    println!(
        "  Reviews:  {} added, {} updated",
        summary.comments_added, summary.comments_updated
    );

    Ok(())
}

pub async fn cmd_backfill_ram_gb(config: &Config) -> anyhow::Result<()> {
    let importer = SeaOrmImportService::new(open_store(config).await?, config.import.clone());
    let summary = importer.backfill_ram_gb().await?;

    println!(
        "✓ Scanned {} rows: {} updated, {} without a recognizable size",
        summary.scanned, summary.updated, summary.unparsed
    );
    Ok(())
}
