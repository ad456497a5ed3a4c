//! Domain service for the analytics endpoints.

use thiserror::Error;

use crate::analysis::clustering::{ClusterError, ClusterReport};
use crate::analysis::competitive::CompetitiveAnalysis;
use crate::analysis::forecast::{ForecastError, PriceTrendReport};
use crate::analysis::sentiment::SentimentReport;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("No catalog items match the filter")]
    NoMatchingItems,

    #[error("Forecast days must be between 1 and {max}, got {days}")]
    InvalidHorizon { days: i64, max: usize },

    #[error("{0}")]
    Clustering(#[from] ClusterError),

    #[error("{0}")]
    Forecast(#[from] ForecastError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Compare `brand` against similarly priced competitors, or rank every brand when `None`.
    async fn competitive_analysis(
        &self,
        brand: Option<&str>,
    ) -> Result<CompetitiveAnalysis, AnalyticsError>;

    /// Synthetic history plus a quadratic forecast `days` ahead (configured default when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidHorizon`] for horizons outside `1..=max_forecast_days`.
    async fn price_trend_prediction(
        &self,
        brand: Option<&str>,
        ram: Option<&str>,
        days: Option<i64>,
    ) -> Result<PriceTrendReport, AnalyticsError>;

    /// Classify the comments of every laptop matching `brand`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NoMatchingItems`] when no laptop matches.
    async fn sentiment_analysis(&self, brand: Option<&str>)
    -> Result<SentimentReport, AnalyticsError>;

    /// Segment the catalog with k-means.
    async fn laptop_clustering(&self) -> Result<ClusterReport, AnalyticsError>;
}
