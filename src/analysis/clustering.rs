//! K-means market segmentation over price, sales and memory size.

use serde::Serialize;
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::stats::{mean, percentage, round2, sample_std};
use crate::models::Laptop;
use crate::parser::ram_value;

/// Brands listed per cluster.
pub const TOP_BRANDS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Not enough valid rows for clustering: found {found}, need at least {required}")]
    TooFewRows { found: usize, required: usize },

    #[error("K-means failed: {0}")]
    KMeans(String),

    #[error("K-means put every row into a single cluster for every k tried")]
    SingleCluster,
}

#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    pub min_rows: usize,
    pub k_min: usize,
    pub k_max: usize,
    pub seed: u64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_rows: 10,
            k_min: 2,
            k_max: 5,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Economical,
    Mainstream,
    Premium,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Popularity {
    Hot,
    Average,
    Cold,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub size: usize,
    pub percentage: f64,
    pub avg_price: f64,
    pub avg_sales: f64,
    pub avg_ram: f64,
    pub price_range: PriceRange,
    pub top_brands: Vec<BrandCount>,
    pub segment: Segment,
    pub popularity: Popularity,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClusterReport {
    pub clusters: Vec<ClusterSummary>,
    pub best_k: usize,
    pub silhouette_scores: BTreeMap<String, f64>,
}

struct Row<'a> {
    price: f64,
    sales: f64,
    ram: f64,
    brand: Option<&'a str>,
}

/// Segment the catalog. Rows without a positive price or without sales are ignored.
pub fn cluster_market(items: &[Laptop], params: ClusterParams) -> Result<ClusterReport, ClusterError> {
    #[allow(clippy::cast_precision_loss)]
    let rows: Vec<Row<'_>> = items
        .iter()
        .filter_map(|item| {
            let price = item.price.filter(|p| *p > 0.0)?;
            let sales = item.sales? as f64;
            Some(Row {
                price,
                sales,
                ram: ram_value(item.ram.as_deref()),
                brand: item.brand.as_deref(),
            })
        })
        .collect();

    let required = params.min_rows.max(params.k_min + 1);
    if rows.len() < required {
        return Err(ClusterError::TooFewRows {
            found: rows.len(),
            required,
        });
    }

    let features = normalized_features(&rows);
    let matrix = DenseMatrix::from_2d_vec(&features);

    let k_max = params.k_max.min(rows.len() - 1);
    let mut silhouette_scores = BTreeMap::new();
    let mut best: Option<(usize, f64, Vec<usize>)> = None;

    for k in params.k_min..=k_max {
        let labels = kmeans_labels(&matrix, k, params.seed)?;
        let score = silhouette(&features, &labels);
        silhouette_scores.insert(k.to_string(), score);

        let distinct: BTreeSet<usize> = labels.iter().copied().collect();
        if distinct.len() < 2 {
            continue;
        }

        if best.as_ref().is_none_or(|(_, s, _)| score > *s) {
            best = Some((k, score, labels));
        }
    }

    let Some((best_k, _, labels)) = best else {
        return Err(ClusterError::SingleCluster);
    };

    Ok(ClusterReport {
        clusters: summarize_clusters(&rows, &labels, best_k),
        best_k,
        silhouette_scores,
    })
}

/// Z-score each column with the sample standard deviation; constant columns become 0.
fn normalized_features(rows: &[Row<'_>]) -> Vec<Vec<f64>> {
    let columns: [Vec<f64>; 3] = [
        rows.iter().map(|r| r.price).collect(),
        rows.iter().map(|r| r.sales).collect(),
        rows.iter().map(|r| r.ram).collect(),
    ];

    let moments: Vec<(f64, f64)> = columns
        .iter()
        .map(|col| {
            (
                mean(col).unwrap_or_default(),
                sample_std(col).unwrap_or_default(),
            )
        })
        .collect();

    (0..rows.len())
        .map(|i| {
            columns
                .iter()
                .zip(&moments)
                .map(|(col, (m, sd))| {
                    if *sd > 0.0 && sd.is_finite() {
                        (col[i] - m) / sd
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

fn kmeans_labels(matrix: &DenseMatrix<f64>, k: usize, seed: u64) -> Result<Vec<usize>, ClusterError> {
    let params = KMeansParameters {
        seed: Some(seed),
        ..KMeansParameters::default().with_k(k)
    };

    let model: KMeans<f64, i32, DenseMatrix<f64>, Vec<i32>> =
        KMeans::fit(matrix, params).map_err(|e| ClusterError::KMeans(e.to_string()))?;

    let labels = model
        .predict(matrix)
        .map_err(|e| ClusterError::KMeans(e.to_string()))?;

    Ok(labels
        .into_iter()
        .map(|l| usize::try_from(l).unwrap_or_default())
        .collect())
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Mean silhouette coefficient. Fewer than two distinct labels scores -1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn silhouette(points: &[Vec<f64>], labels: &[usize]) -> f64 {
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        members.entry(*label).or_default().push(i);
    }
    if members.len() < 2 || points.is_empty() {
        return -1.0;
    }

    let total: f64 = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let own = labels[i];
            let own_members = &members[&own];
            if own_members.len() < 2 {
                return 0.0;
            }

            let a = own_members
                .iter()
                .filter(|j| **j != i)
                .map(|j| distance(point, &points[*j]))
                .sum::<f64>()
                / (own_members.len() - 1) as f64;

            let b = members
                .iter()
                .filter(|(label, _)| **label != own)
                .map(|(_, idx)| {
                    idx.iter().map(|j| distance(point, &points[*j])).sum::<f64>() / idx.len() as f64
                })
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom > 0.0 { (b - a) / denom } else { 0.0 }
        })
        .sum();

    total / points.len() as f64
}

fn summarize_clusters(rows: &[Row<'_>], labels: &[usize], k: usize) -> Vec<ClusterSummary> {
    let all_prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    let all_sales: Vec<f64> = rows.iter().map(|r| r.sales).collect();
    let overall_price = mean(&all_prices).unwrap_or_default();
    let overall_sales = mean(&all_sales).unwrap_or_default();

    let mut clusters: Vec<ClusterSummary> = (0..k)
        .filter_map(|cluster_id| {
            let members: Vec<&Row<'_>> = rows
                .iter()
                .zip(labels)
                .filter(|(_, l)| **l == cluster_id)
                .map(|(r, _)| r)
                .collect();
            if members.is_empty() {
                return None;
            }

            let prices: Vec<f64> = members.iter().map(|r| r.price).collect();
            let sales: Vec<f64> = members.iter().map(|r| r.sales).collect();
            let rams: Vec<f64> = members.iter().map(|r| r.ram).collect();

            let avg_price = round2(mean(&prices).unwrap_or_default());
            let avg_sales = round2(mean(&sales).unwrap_or_default());

            let segment = if avg_price < overall_price * 0.7 {
                Segment::Economical
            } else if avg_price > overall_price * 1.3 {
                Segment::Premium
            } else {
                Segment::Mainstream
            };

            let popularity = if avg_sales > overall_sales * 1.2 {
                Popularity::Hot
            } else if avg_sales < overall_sales * 0.8 {
                Popularity::Cold
            } else {
                Popularity::Average
            };

            Some(ClusterSummary {
                cluster_id,
                size: members.len(),
                percentage: percentage(members.len(), rows.len()),
                avg_price,
                avg_sales,
                avg_ram: round2(mean(&rams).unwrap_or_default()),
                price_range: PriceRange {
                    min: round2(prices.iter().copied().fold(f64::INFINITY, f64::min)),
                    max: round2(prices.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                },
                top_brands: top_brands(&members),
                segment,
                popularity,
            })
        })
        .collect();

    clusters.sort_by(|a, b| b.size.cmp(&a.size));
    clusters
}

fn top_brands(members: &[&Row<'_>]) -> Vec<BrandCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for brand in members.iter().filter_map(|r| r.brand) {
        *counts.entry(brand).or_default() += 1;
    }

    let mut ranked: Vec<BrandCount> = counts
        .into_iter()
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.brand.cmp(&b.brand)));
    ranked.truncate(TOP_BRANDS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(id: i32, brand: &str, price: f64, sales: i64, ram: &str) -> Laptop {
        Laptop {
            id,
            original_id: id.to_string(),
            name: format!("{brand} {id}"),
            price: Some(price),
            shop: None,
            brand: Some(brand.to_string()),
            ram: Some(ram.to_string()),
            cpu: None,
            sales: Some(sales),
            rating: None,
        }
    }

    fn catalog() -> Vec<Laptop> {
        let mut items = Vec::new();
        for i in 0..8 {
            items.push(laptop(i, "Acer", 2500.0 + f64::from(i) * 30.0, 900 + i64::from(i), "8GB"));
        }
        for i in 8..16 {
            items.push(laptop(i, "Lenovo", 6000.0 + f64::from(i) * 40.0, 300 + i64::from(i), "16GB"));
        }
        for i in 16..22 {
            items.push(laptop(i, "Apple", 14000.0 + f64::from(i) * 50.0, 80 + i64::from(i), "32GB"));
        }
        items
    }

    #[test]
    fn test_cluster_sizes_cover_valid_rows() {
        let mut items = catalog();
        let mut invalid = laptop(99, "Ghost", 0.0, 5, "8GB");
        invalid.price = Some(0.0);
        items.push(invalid);
        let mut no_sales = laptop(100, "Ghost", 5000.0, 0, "8GB");
        no_sales.sales = None;
        items.push(no_sales);

        let report = cluster_market(&items, ClusterParams::default()).unwrap();
        assert!((2..=5).contains(&report.best_k));
        let total: usize = report.clusters.iter().map(|c| c.size).sum();
        assert_eq!(total, 22);
        assert!(report.clusters.windows(2).all(|w| w[0].size >= w[1].size));
        assert_eq!(report.silhouette_scores.len(), 4);
        for c in &report.clusters {
            assert!(c.top_brands.len() <= TOP_BRANDS);
            assert!(c.price_range.min <= c.price_range.max);
        }
    }

    #[test]
    fn test_too_few_rows() {
        let items: Vec<Laptop> = catalog().into_iter().take(9).collect();
        assert!(matches!(
            cluster_market(&items, ClusterParams::default()),
            Err(ClusterError::TooFewRows { found: 9, .. })
        ));
        assert!(cluster_market(&[], ClusterParams::default()).is_err());
    }

    #[test]
    fn test_identical_rows_fail_instead_of_reporting_one_cluster() {
        let items: Vec<Laptop> = (0..12)
            .map(|i| laptop(i, "Lenovo", 4999.0, 100, "16GB"))
            .collect();
        assert!(matches!(
            cluster_market(&items, ClusterParams::default()),
            Err(ClusterError::SingleCluster)
        ));
    }

    #[test]
    fn test_constant_column_normalizes_to_zero() {
        let rows: Vec<Row<'_>> = (0..4)
            .map(|i| Row {
                price: 1000.0 + f64::from(i),
                sales: 10.0,
                ram: 16.0,
                brand: None,
            })
            .collect();
        let features = normalized_features(&rows);
        assert!(features.iter().all(|f| f[1].abs() < f64::EPSILON && f[2].abs() < f64::EPSILON));
        assert!(features[0][0] < 0.0 && features[3][0] > 0.0);
    }

    #[test]
    fn test_silhouette_separated_clusters() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
        ];
        let good = silhouette(&points, &[0, 0, 1, 1]);
        let bad = silhouette(&points, &[0, 1, 0, 1]);
        assert!(good > 0.9);
        assert!(bad < good);
        assert!((silhouette(&points, &[0, 0, 0, 0]) + 1.0).abs() < f64::EPSILON);
    }
}
