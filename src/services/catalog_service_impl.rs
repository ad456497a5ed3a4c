//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;

use crate::analysis::stats::{mean, pearson, round2};
use crate::db::{GroupColumn, GroupStatsRow, RamGbStatsRow, Store};
use crate::models::{Comment, Laptop, LaptopFilter, Page};
use crate::parser::{ram_bucket, ram_bucket_order};
use crate::services::catalog_service::{
    BrandRamOption, BrandSales, BrandStats, CatalogError, CatalogService, CommentPage, CpuStats,
    LaptopPage, OverviewStats, PriceRangeStats, PriceSalesBin, PriceSalesCorrelation, RamStats,
    SalesAnalysis,
};

/// `[min, max)` bands used by the price-range breakdown.
const PRICE_RANGES: [(f64, Option<f64>, &str); 6] = [
    (0.0, Some(2000.0), "0-2000"),
    (2000.0, Some(4000.0), "2000-4000"),
    (4000.0, Some(6000.0), "4000-6000"),
    (6000.0, Some(8000.0), "6000-8000"),
    (8000.0, Some(10000.0), "8000-10000"),
    (10000.0, None, "10000+"),
];

/// `(lo, hi]` bins used by the price/sales correlation breakdown.
const PRICE_SALES_BINS: [(f64, f64, &str); 6] = [
    (0.0, 2000.0, "0-2000"),
    (2000.0, 4000.0, "2000-4000"),
    (4000.0, 6000.0, "4000-6000"),
    (6000.0, 8000.0, "6000-8000"),
    (8000.0, 10000.0, "8000-10000"),
    (10000.0, 99_999_999.0, "10000+"),
];

const TOP_PRODUCTS: u64 = 10;

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn group_avg(row: &GroupStatsRow) -> f64 {
    round2(row.avg_price.unwrap_or_default())
}

/// Fold per-size rows into fixed buckets with a count-weighted average price.
/// Sizes whose prices are all null count toward `count` but not the average.
pub fn fold_ram_groups(rows: &[RamGbStatsRow]) -> Vec<RamStats> {
    struct Acc {
        count: i64,
        priced_count: i64,
        price_total: f64,
        total_sales: i64,
    }

    let mut buckets: Vec<(&'static str, Acc)> = Vec::new();
    for row in rows {
        let label = ram_bucket(row.ram_gb);
        let idx = match buckets.iter().position(|(l, _)| *l == label) {
            Some(idx) => idx,
            None => {
                buckets.push((
                    label,
                    Acc {
                        count: 0,
                        priced_count: 0,
                        price_total: 0.0,
                        total_sales: 0,
                    },
                ));
                buckets.len() - 1
            }
        };
        let acc = &mut buckets[idx].1;
        acc.count += row.count;
        acc.total_sales += row.total_sales.unwrap_or_default();
        if let Some(avg) = row.avg_price {
            #[allow(clippy::cast_precision_loss)]
            let weight = row.count as f64;
            acc.price_total += avg * weight;
            acc.priced_count += row.count;
        }
    }

    buckets.sort_by_key(|(label, _)| ram_bucket_order(label));
    buckets
        .into_iter()
        .map(|(label, acc)| {
            #[allow(clippy::cast_precision_loss)]
            let avg_price = if acc.priced_count > 0 {
                round2(acc.price_total / acc.priced_count as f64)
            } else {
                0.0
            };
            RamStats {
                ram: label,
                count: acc.count,
                avg_price,
                total_sales: acc.total_sales,
            }
        })
        .collect()
}

/// Bin rows by price into right-inclusive ranges. Every bin is reported,
/// empty ones with a zero count and null averages.
pub fn bin_price_sales(items: &[Laptop]) -> Vec<PriceSalesBin> {
    PRICE_SALES_BINS
        .iter()
        .map(|&(lo, hi, label)| {
            let in_bin: Vec<&Laptop> = items
                .iter()
                .filter(|l| l.price.is_some_and(|p| p > lo && p <= hi))
                .collect();
            let prices: Vec<f64> = in_bin.iter().filter_map(|l| l.price).collect();
            #[allow(clippy::cast_precision_loss)]
            let sales: Vec<f64> = in_bin.iter().filter_map(|l| l.sales).map(|s| s as f64).collect();
            PriceSalesBin {
                price_range: label,
                avg_sales: mean(&sales),
                avg_price: mean(&prices),
                count: in_bin.len(),
            }
        })
        .collect()
}

/// Pearson correlation over rows with both a price and a sales figure.
pub fn price_sales_pearson(items: &[Laptop]) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    let (prices, sales): (Vec<f64>, Vec<f64>) = items
        .iter()
        .filter_map(|l| Some((l.price?, l.sales? as f64)))
        .unzip();
    pearson(&prices, &sales).map(round2)
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list_laptops(
        &self,
        filter: &LaptopFilter,
        page: Page,
    ) -> Result<LaptopPage, CatalogError> {
        let (rows, total) = self.store.find_laptops(filter, page.window()).await?;
        Ok(LaptopPage {
            items: rows.into_iter().map(Laptop::from).collect(),
            total,
        })
    }

    async fn overview_stats(&self) -> Result<OverviewStats, CatalogError> {
        let all = LaptopFilter::default();
        Ok(OverviewStats {
            total_products: self.store.count_laptops(&all).await?,
            avg_price: self.store.avg_price(&all).await?.unwrap_or_default(),
            total_sales: self.store.total_sales().await?,
            total_brands: self.store.distinct_brand_count().await?,
        })
    }

    async fn brand_analysis(&self) -> Result<Vec<BrandStats>, CatalogError> {
        let rows = self.store.group_stats(GroupColumn::Brand).await?;
        Ok(rows
            .iter()
            .map(|row| BrandStats {
                brand: row.key.clone(),
                count: row.count,
                avg_price: group_avg(row),
                total_sales: row.total_sales.unwrap_or_default(),
            })
            .collect())
    }

    async fn cpu_analysis(&self) -> Result<Vec<CpuStats>, CatalogError> {
        let rows = self.store.group_stats(GroupColumn::Cpu).await?;
        Ok(rows
            .iter()
            .map(|row| CpuStats {
                cpu: row.key.clone(),
                count: row.count,
                avg_price: group_avg(row),
                total_sales: row.total_sales.unwrap_or_default(),
            })
            .collect())
    }

    async fn ram_analysis(&self) -> Result<Vec<RamStats>, CatalogError> {
        let rows = self.store.ram_gb_stats().await?;
        Ok(fold_ram_groups(&rows))
    }

    async fn price_range_analysis(&self) -> Result<Vec<PriceRangeStats>, CatalogError> {
        let mut result = Vec::new();
        for (min, max, label) in PRICE_RANGES {
            let band = self.store.price_band(min, max).await?;
            if band.count > 0 {
                result.push(PriceRangeStats {
                    range: label,
                    count: band.count,
                    avg_price: round2(band.avg_price.unwrap_or_default()),
                    total_sales: band.total_sales.unwrap_or_default(),
                });
            }
        }
        Ok(result)
    }

    async fn sales_analysis(&self) -> Result<SalesAnalysis, CatalogError> {
        let top_products = self
            .store
            .top_laptops_by_sales(TOP_PRODUCTS)
            .await?
            .into_iter()
            .map(Laptop::from)
            .collect();

        let mut brand_sales: Vec<BrandSales> = self
            .store
            .group_stats(GroupColumn::Brand)
            .await?
            .into_iter()
            .map(|row| BrandSales {
                brand: row.key,
                total_sales: row.total_sales.unwrap_or_default(),
            })
            .collect();
        brand_sales.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));

        Ok(SalesAnalysis {
            top_products,
            brand_sales,
        })
    }

    async fn price_sales_correlation(&self) -> Result<PriceSalesCorrelation, CatalogError> {
        let items: Vec<Laptop> = self
            .store
            .list_all_laptops()
            .await?
            .into_iter()
            .map(Laptop::from)
            .collect();

        Ok(PriceSalesCorrelation {
            correlation: price_sales_pearson(&items),
            price_sales_data: bin_price_sales(&items),
        })
    }

    async fn brand_ram_options(&self) -> Result<Vec<BrandRamOption>, CatalogError> {
        let rows = self.store.brand_ram_options().await?;
        Ok(rows
            .into_iter()
            .map(|row| BrandRamOption {
                brand: row.brand,
                ram: row.ram,
            })
            .collect())
    }

    async fn comments(
        &self,
        laptop_id: Option<i32>,
        limit: u64,
        offset: u64,
    ) -> Result<CommentPage, CatalogError> {
        let (rows, total) = self.store.list_comments(laptop_id, limit, offset).await?;

        let laptop = match laptop_id {
            Some(id) => self.store.get_laptop(id).await?.map(Laptop::from),
            None => None,
        };

        Ok(CommentPage {
            total,
            comments: rows.into_iter().map(Comment::from).collect(),
            laptop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(id: i32, price: Option<f64>, sales: Option<i64>) -> Laptop {
        Laptop {
            id,
            original_id: id.to_string(),
            name: format!("Laptop {id}"),
            price,
            shop: None,
            brand: Some("Lenovo".to_string()),
            ram: None,
            cpu: None,
            sales,
            rating: None,
        }
    }

    fn ram_row(ram_gb: i32, count: i64, avg_price: Option<f64>) -> RamGbStatsRow {
        RamGbStatsRow {
            ram_gb,
            count,
            avg_price,
            total_sales: Some(count * 10),
        }
    }

    #[test]
    fn test_fold_ram_groups_weights_by_count() {
        let rows = vec![
            ram_row(12, 1, Some(5000.0)),
            ram_row(2, 2, Some(1000.0)),
            ram_row(16, 3, Some(6000.0)),
            ram_row(4, 2, Some(2000.0)),
        ];

        let folded = fold_ram_groups(&rows);

        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].ram, "4GB");
        assert_eq!(folded[0].count, 4);
        assert!((folded[0].avg_price - 1500.0).abs() < f64::EPSILON);
        assert_eq!(folded[0].total_sales, 40);

        assert_eq!(folded[1].ram, "16GB");
        assert_eq!(folded[1].count, 4);
        assert!((folded[1].avg_price - 5750.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fold_ram_groups_ignores_unpriced_sizes_in_average() {
        let rows = vec![ram_row(256, 2, None), ram_row(128, 2, Some(20000.0))];
        let folded = fold_ram_groups(&rows);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].ram, "128GB+");
        assert_eq!(folded[0].count, 4);
        assert!((folded[0].avg_price - 20000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bin_price_sales_is_right_inclusive() {
        let items = vec![
            laptop(1, Some(2000.0), Some(10)),
            laptop(2, Some(2000.5), Some(30)),
            laptop(3, Some(0.0), Some(5)),
            laptop(4, None, Some(5)),
        ];

        let bins = bin_price_sales(&items);

        assert_eq!(bins.len(), 6);
        assert_eq!(bins[0].price_range, "0-2000");
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[0].avg_sales, Some(10.0));
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[1].avg_price, Some(2000.5));
        assert_eq!(bins[5].count, 0);
        assert_eq!(bins[5].avg_price, None);
    }

    #[test]
    fn test_price_sales_pearson_skips_incomplete_rows() {
        let items = vec![
            laptop(1, Some(1000.0), Some(300)),
            laptop(2, Some(2000.0), Some(200)),
            laptop(3, Some(3000.0), Some(100)),
            laptop(4, None, Some(50)),
            laptop(5, Some(9000.0), None),
        ];
        assert_eq!(price_sales_pearson(&items), Some(-1.0));
        assert_eq!(price_sales_pearson(&items[..1]), None);
    }
}
