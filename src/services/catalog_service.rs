//! Domain service for catalog listing and aggregate statistics.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Comment, Laptop, LaptopFilter, Page};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A filtered (and possibly paginated) slice of the catalog.
#[derive(Debug, Clone)]
pub struct LaptopPage {
    pub items: Vec<Laptop>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub total_products: u64,
    pub avg_price: f64,
    pub total_sales: i64,
    pub total_brands: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandStats {
    pub brand: Option<String>,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuStats {
    pub cpu: Option<String>,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RamStats {
    pub ram: &'static str,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRangeStats {
    pub range: &'static str,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandSales {
    pub brand: Option<String>,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesAnalysis {
    pub top_products: Vec<Laptop>,
    pub brand_sales: Vec<BrandSales>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSalesBin {
    pub price_range: &'static str,
    pub avg_sales: Option<f64>,
    pub avg_price: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSalesCorrelation {
    /// `None` when the correlation is undefined (too few rows or zero variance).
    pub correlation: Option<f64>,
    pub price_sales_data: Vec<PriceSalesBin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandRamOption {
    pub brand: Option<String>,
    pub ram: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub total: u64,
    pub comments: Vec<Comment>,
    pub laptop: Option<Laptop>,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_laptops(
        &self,
        filter: &LaptopFilter,
        page: Page,
    ) -> Result<LaptopPage, CatalogError>;

    async fn overview_stats(&self) -> Result<OverviewStats, CatalogError>;

    async fn brand_analysis(&self) -> Result<Vec<BrandStats>, CatalogError>;

    async fn cpu_analysis(&self) -> Result<Vec<CpuStats>, CatalogError>;

    /// Memory sizes folded into fixed buckets, smallest first.
    async fn ram_analysis(&self) -> Result<Vec<RamStats>, CatalogError>;

    /// Non-empty `[min, max)` price bands.
    async fn price_range_analysis(&self) -> Result<Vec<PriceRangeStats>, CatalogError>;

    async fn sales_analysis(&self) -> Result<SalesAnalysis, CatalogError>;

    async fn price_sales_correlation(&self) -> Result<PriceSalesCorrelation, CatalogError>;

    async fn brand_ram_options(&self) -> Result<Vec<BrandRamOption>, CatalogError>;

    /// Newest-first comments, optionally for one laptop.
    async fn comments(
        &self,
        laptop_id: Option<i32>,
        limit: u64,
        offset: u64,
    ) -> Result<CommentPage, CatalogError>;
}
