//! Brand-vs-market comparisons.

use serde::Serialize;
use std::collections::BTreeMap;

use super::stats::{mean, round2};
use crate::models::Laptop;

/// Competitors are listings of other brands priced within this band around the target average.
pub const PRICE_WINDOW: (f64, f64) = (0.8, 1.2);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrandSummary {
    pub brand: Option<String>,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompetitorSummary {
    pub brand: String,
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
    pub price_diff_percent: f64,
    pub sales_diff_percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrandComparison {
    pub target_brand: String,
    pub target_count: i64,
    pub target_avg_price: f64,
    pub target_total_sales: i64,
    pub total_market_sales: i64,
    pub competitors: Vec<CompetitorSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CompetitiveAnalysis {
    Market(Vec<BrandSummary>),
    Brand(BrandComparison),
}

/// Count, mean price and summed sales of the target brand's listings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetStats {
    pub count: i64,
    pub avg_price: f64,
    pub total_sales: i64,
}

#[must_use]
pub fn target_stats(items: &[Laptop]) -> TargetStats {
    let prices: Vec<f64> = items.iter().filter_map(|l| l.price).collect();
    TargetStats {
        count: i64::try_from(items.len()).unwrap_or(i64::MAX),
        avg_price: mean(&prices).unwrap_or(0.0),
        total_sales: items.iter().map(|l| l.sales.unwrap_or(0)).sum(),
    }
}

/// Inclusive price bounds for competitors of a brand averaging `avg_price`.
#[must_use]
pub fn price_window(avg_price: f64) -> (f64, f64) {
    (avg_price * PRICE_WINDOW.0, avg_price * PRICE_WINDOW.1)
}

/// Group `competitors` by brand and express each group relative to the target.
///
/// `competitors` is expected to hold only other-brand listings inside
/// [`price_window`]; anything priced outside it or without a brand is skipped.
#[must_use]
pub fn compare_brand(
    brand: &str,
    target: TargetStats,
    competitors: &[Laptop],
    total_market_sales: i64,
) -> BrandComparison {
    let (lo, hi) = price_window(target.avg_price);

    let mut groups: BTreeMap<&str, (i64, f64, i64)> = BTreeMap::new();
    for item in competitors {
        let (Some(other), Some(price)) = (item.brand.as_deref(), item.price) else {
            continue;
        };
        if other == brand || price < lo || price > hi {
            continue;
        }
        let entry = groups.entry(other).or_insert((0, 0.0, 0));
        entry.0 += 1;
        entry.1 += price;
        entry.2 += item.sales.unwrap_or(0);
    }

    #[allow(clippy::cast_precision_loss)]
    let target_avg_sales = if target.count > 0 {
        target.total_sales as f64 / target.count as f64
    } else {
        0.0
    };

    let mut rows: Vec<CompetitorSummary> = groups
        .into_iter()
        .map(|(name, (count, total_price, total_sales))| {
            #[allow(clippy::cast_precision_loss)]
            let avg_price = round2(total_price / count as f64);
            let price_diff_percent = if target.avg_price > 0.0 {
                round2((avg_price - target.avg_price) / target.avg_price * 100.0)
            } else {
                0.0
            };
            #[allow(clippy::cast_precision_loss)]
            let competitor_avg_sales = total_sales as f64 / count as f64;
            let sales_diff_percent = if target_avg_sales > 0.0 {
                round2((competitor_avg_sales - target_avg_sales) / target_avg_sales * 100.0)
            } else {
                0.0
            };
            CompetitorSummary {
                brand: name.to_string(),
                count,
                avg_price,
                total_sales,
                price_diff_percent,
                sales_diff_percent,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));

    BrandComparison {
        target_brand: brand.to_string(),
        target_count: target.count,
        target_avg_price: round2(target.avg_price),
        target_total_sales: target.total_sales,
        total_market_sales,
        competitors: rows,
    }
}

/// Every brand ordered by total sales, best seller first.
#[must_use]
pub fn market_overview(mut brands: Vec<BrandSummary>) -> Vec<BrandSummary> {
    for b in &mut brands {
        b.avg_price = round2(b.avg_price);
    }
    brands.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    brands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(id: i32, brand: &str, price: Option<f64>, sales: Option<i64>) -> Laptop {
        Laptop {
            id,
            original_id: id.to_string(),
            name: format!("{brand} {id}"),
            price,
            shop: None,
            brand: Some(brand.to_string()),
            ram: Some("16GB".to_string()),
            cpu: None,
            sales,
            rating: None,
        }
    }

    #[test]
    fn test_target_stats_ignores_null_prices() {
        let items = vec![
            laptop(1, "Lenovo", Some(5000.0), Some(10)),
            laptop(2, "Lenovo", None, Some(5)),
            laptop(3, "Lenovo", Some(7000.0), None),
        ];
        let stats = target_stats(&items);
        assert_eq!(stats.count, 3);
        assert!((stats.avg_price - 6000.0).abs() < 1e-9);
        assert_eq!(stats.total_sales, 15);
    }

    #[test]
    fn test_compare_brand_groups_and_sorts() {
        let target = target_stats(&[
            laptop(1, "Lenovo", Some(5000.0), Some(100)),
            laptop(2, "Lenovo", Some(5000.0), Some(100)),
        ]);
        let others = vec![
            laptop(3, "Dell", Some(4500.0), Some(50)),
            laptop(4, "Dell", Some(5500.0), Some(50)),
            laptop(5, "HP", Some(5900.0), Some(400)),
            laptop(6, "Asus", Some(9000.0), Some(1000)),
        ];

        let result = compare_brand("Lenovo", target, &others, 1700);
        assert_eq!(result.target_count, 2);
        assert!((result.target_avg_price - 5000.0).abs() < 1e-9);
        assert_eq!(result.competitors.len(), 2);

        let hp = &result.competitors[0];
        assert_eq!(hp.brand, "HP");
        assert!((hp.price_diff_percent - 18.0).abs() < 1e-9);
        assert!((hp.sales_diff_percent - 300.0).abs() < 1e-9);

        let dell = &result.competitors[1];
        assert_eq!(dell.count, 2);
        assert!(dell.price_diff_percent.abs() < 1e-9);
        assert!((dell.sales_diff_percent + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_brand_without_items() {
        let target = target_stats(&[]);
        let result = compare_brand("Nobody", target, &[laptop(1, "Dell", Some(0.0), Some(3))], 3);
        assert_eq!(result.target_count, 0);
        assert!(result.target_avg_price.abs() < f64::EPSILON);
        for c in &result.competitors {
            assert!(c.price_diff_percent.abs() < f64::EPSILON);
            assert!(c.sales_diff_percent.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_market_overview_sorted_by_sales() {
        let out = market_overview(vec![
            BrandSummary {
                brand: Some("A".into()),
                count: 1,
                avg_price: 1000.126,
                total_sales: 5,
            },
            BrandSummary {
                brand: Some("B".into()),
                count: 2,
                avg_price: 2000.0,
                total_sales: 50,
            },
        ]);
        assert_eq!(out[0].brand.as_deref(), Some("B"));
        assert!((out[1].avg_price - 1000.13).abs() < 1e-9);
    }
}
