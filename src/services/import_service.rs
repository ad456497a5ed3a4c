//! Domain service for catalog ingestion.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::parser::catalog_csv::CsvError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("{0}")]
    Csv(#[from] CsvError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ImportError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub encoding: &'static str,
    pub rows: usize,
    pub added: usize,
    pub updated: usize,
    pub failed: usize,
    pub comments_added: usize,
    pub comments_updated: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillSummary {
    pub scanned: usize,
    pub updated: usize,
    pub unparsed: usize,
}

#[async_trait::async_trait]
pub trait ImportService: Send + Sync {
    /// Upsert every row of a cleaned catalog CSV, keyed by its `id` column.
    ///
    /// Malformed rows are logged and counted in [`ImportSummary::failed`].
    async fn import_csv(&self, path: &Path) -> Result<ImportSummary, ImportError>;

    /// Derive `ram_gb` for rows where it is missing or zero.
    async fn backfill_ram_gb(&self) -> Result<BackfillSummary, ImportError>;
}
