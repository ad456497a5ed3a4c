//! `SeaORM` implementation of the `AnalyticsService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::clustering::{ClusterParams, ClusterReport, cluster_market};
use crate::analysis::competitive::{
    BrandSummary, CompetitiveAnalysis, compare_brand, market_overview, price_window, target_stats,
};
use crate::analysis::forecast::{
    ForecastRequest, NoiseSource, PriceTrendReport, RandomNoise, TrendFilter, forecast_prices,
};
use crate::analysis::sentiment::{SentimentClassifier, SentimentReport, summarize_sentiment};
use crate::config::AnalyticsConfig;
use crate::db::{GroupColumn, Store};
use crate::models::{Laptop, LaptopFilter};
use crate::services::analytics_service::{AnalyticsError, AnalyticsService};

pub struct SeaOrmAnalyticsService {
    store: Store,
    config: AnalyticsConfig,
    classifier: Arc<dyn SentimentClassifier>,
}

impl SeaOrmAnalyticsService {
    #[must_use]
    pub fn new(
        store: Store,
        config: AnalyticsConfig,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            store,
            config,
            classifier,
        }
    }

    fn noise_for(&self, brand: Option<&str>, ram: Option<&str>) -> Box<dyn NoiseSource> {
        match self.config.forecast_seed {
            Some(seed) => Box::new(RandomNoise::seeded(seed)),
            None => Box::new(RandomNoise::from_filters(brand, ram)),
        }
    }
}

fn record_run(kind: &'static str) {
    metrics::counter!("analytics_runs_total", "kind" => kind).increment(1);
}

#[async_trait]
impl AnalyticsService for SeaOrmAnalyticsService {
    async fn competitive_analysis(
        &self,
        brand: Option<&str>,
    ) -> Result<CompetitiveAnalysis, AnalyticsError> {
        record_run("competitive");

        let Some(brand) = brand else {
            let groups = self.store.group_stats(GroupColumn::Brand).await?;
            let brands = groups
                .into_iter()
                .map(|row| BrandSummary {
                    brand: row.key,
                    count: row.count,
                    avg_price: row.avg_price.unwrap_or_default(),
                    total_sales: row.total_sales.unwrap_or_default(),
                })
                .collect();
            return Ok(CompetitiveAnalysis::Market(market_overview(brands)));
        };

        let (target_rows, _) = self
            .store
            .find_laptops(&LaptopFilter::by_brand(Some(brand)), None)
            .await?;
        let target_items: Vec<Laptop> = target_rows.into_iter().map(Laptop::from).collect();
        let target = target_stats(&target_items);

        let (min, max) = price_window(target.avg_price);
        let competitors: Vec<Laptop> = self
            .store
            .competitor_listings(brand, min, max)
            .await?
            .into_iter()
            .map(Laptop::from)
            .collect();
        let total_market_sales = self.store.total_sales().await?;

        debug!(
            brand,
            target_count = target.count,
            competitors = competitors.len(),
            "Competitive analysis inputs loaded"
        );

        Ok(CompetitiveAnalysis::Brand(compare_brand(
            brand,
            target,
            &competitors,
            total_market_sales,
        )))
    }

    async fn price_trend_prediction(
        &self,
        brand: Option<&str>,
        ram: Option<&str>,
        days: Option<i64>,
    ) -> Result<PriceTrendReport, AnalyticsError> {
        record_run("price_trend");

        let requested = days.unwrap_or_else(|| {
            i64::try_from(self.config.default_forecast_days).unwrap_or(i64::MAX)
        });
        let horizon = usize::try_from(requested)
            .ok()
            .filter(|d| (1..=self.config.max_forecast_days).contains(d))
            .ok_or(AnalyticsError::InvalidHorizon {
                days: requested,
                max: self.config.max_forecast_days,
            })?;

        let filter = LaptopFilter {
            brand: brand.map(str::to_string),
            ram: ram.map(str::to_string),
            ..LaptopFilter::default()
        };
        let current_avg_price = self.store.avg_price(&filter).await?.unwrap_or_default();

        let request = ForecastRequest {
            current_avg_price,
            days: horizon,
            history_days: self.config.history_days,
            today: chrono::Local::now().date_naive(),
            filter: TrendFilter {
                brand: filter.brand,
                ram: filter.ram,
            },
        };

        let mut noise = self.noise_for(brand, ram);
        Ok(forecast_prices(request, noise.as_mut())?)
    }

    async fn sentiment_analysis(
        &self,
        brand: Option<&str>,
    ) -> Result<SentimentReport, AnalyticsError> {
        record_run("sentiment");

        let matching = self
            .store
            .count_laptops(&LaptopFilter::by_brand(brand))
            .await?;
        if matching == 0 {
            return Err(AnalyticsError::NoMatchingItems);
        }

        let comments = self.store.comment_contents_for_brand(brand).await?;
        Ok(summarize_sentiment(
            &comments,
            self.classifier.as_ref(),
            brand.map(str::to_string),
        ))
    }

    async fn laptop_clustering(&self) -> Result<ClusterReport, AnalyticsError> {
        record_run("clustering");

        let items: Vec<Laptop> = self
            .store
            .list_all_laptops()
            .await?
            .into_iter()
            .map(Laptop::from)
            .collect();

        let params = ClusterParams {
            min_rows: self.config.cluster_min_rows,
            k_min: self.config.cluster_k_min,
            k_max: self.config.cluster_k_max,
            seed: self.config.kmeans_seed,
        };

        let report = tokio::task::spawn_blocking(move || cluster_market(&items, params))
            .await
            .map_err(|e| AnalyticsError::Internal(format!("Clustering task failed: {e}")))??;

        info!(
            best_k = report.best_k,
            clusters = report.clusters.len(),
            "Clustering finished"
        );
        Ok(report)
    }
}
