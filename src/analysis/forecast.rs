//! Synthetic price history and quadratic trend forecast.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use std::f64::consts::PI;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use super::stats::{linspace, round2};

/// Number of history points returned to the caller.
pub const HISTORY_TAIL: usize = 30;

const HISTORY_NOISE_STD: f64 = 0.04;
const FORECAST_NOISE_STD: f64 = 0.06;
const SEASONAL_AMPLITUDE: f64 = 0.08;
const BAND_LOWER: f64 = 0.93;
const BAND_UPPER: f64 = 1.07;

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Forecast horizon must be at least one day")]
    EmptyHorizon,

    #[error("History must contain at least three points")]
    ShortHistory,

    #[error("Regression failed: {0}")]
    Regression(String),
}

/// Source of the gaussian jitter layered on history and forecast.
pub trait NoiseSource: Send {
    /// One draw from N(0, `std_dev`).
    fn gaussian(&mut self, std_dev: f64) -> f64;
}

/// Box-Muller gaussian draws over a seeded `StdRng`.
pub struct RandomNoise {
    rng: StdRng,
}

impl RandomNoise {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the filter values and the wall clock, so successive calls differ.
    #[must_use]
    pub fn from_filters(brand: Option<&str>, ram: Option<&str>) -> Self {
        let mut hasher = DefaultHasher::new();
        brand.hash(&mut hasher);
        ram.hash(&mut hasher);
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
            .hash(&mut hasher);
        Self::seeded(hasher.finish())
    }
}

impl NoiseSource for RandomNoise {
    fn gaussian(&mut self, std_dev: f64) -> f64 {
        // u1 in (0, 1] keeps ln() finite
        let u1: f64 = 1.0 - self.rng.random::<f64>();
        let u2: f64 = self.rng.random::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        z * std_dev
    }
}

/// Noise source that never perturbs anything.
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn gaussian(&mut self, _std_dev: f64) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryPoint {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastPoint {
    pub date: String,
    pub price: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceSeries {
    pub historical: Vec<HistoryPoint>,
    pub prediction: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendAnalysis {
    pub start_price: f64,
    pub end_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendFilter {
    pub brand: Option<String>,
    pub ram: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceTrendReport {
    pub price_data: PriceSeries,
    pub trend_analysis: TrendAnalysis,
    pub current_avg_price: f64,
    pub filter: TrendFilter,
}

/// Parameters of one forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub current_avg_price: f64,
    pub days: usize,
    pub history_days: usize,
    pub today: NaiveDate,
    pub filter: TrendFilter,
}

/// Build a synthetic daily history around `current_avg_price`, fit a
/// degree-2 polynomial on the day index and project it `days` ahead.
pub fn forecast_prices(
    request: ForecastRequest,
    noise: &mut dyn NoiseSource,
) -> Result<PriceTrendReport, ForecastError> {
    let ForecastRequest {
        current_avg_price,
        days,
        history_days,
        today,
        filter,
    } = request;

    if days == 0 {
        return Err(ForecastError::EmptyHorizon);
    }
    if history_days < 3 {
        return Err(ForecastError::ShortHistory);
    }

    let trend = linspace(0.95, 1.0, history_days);
    let seasonality = linspace(0.0, 6.0 * PI, history_days);
    let history: Vec<f64> = trend
        .iter()
        .zip(&seasonality)
        .map(|(t, s)| {
            current_avg_price * (t + SEASONAL_AMPLITUDE * s.sin() + noise.gaussian(HISTORY_NOISE_STD))
        })
        .collect();

    let fitted = fit_quadratic(&history, history_days..history_days + days)?;

    let future_seasonality = linspace(0.0, 6.0 * PI, days);
    let predicted: Vec<f64> = fitted
        .iter()
        .zip(&future_seasonality)
        .map(|(p, s)| {
            let jitter = 1.0 + SEASONAL_AMPLITUDE * s.sin() + noise.gaussian(FORECAST_NOISE_STD);
            (p * jitter).max(0.0)
        })
        .collect();

    let historical = history
        .iter()
        .enumerate()
        .skip(history_days.saturating_sub(HISTORY_TAIL))
        .map(|(i, price)| HistoryPoint {
            date: format_date(today - day_offset(history_days - 1 - i)),
            price: round2(*price),
        })
        .collect();

    let prediction = predicted
        .iter()
        .enumerate()
        .map(|(i, price)| ForecastPoint {
            date: format_date(today + day_offset(i + 1)),
            price: round2(*price),
            lower: round2(price * BAND_LOWER),
            upper: round2(price * BAND_UPPER),
        })
        .collect();

    Ok(PriceTrendReport {
        price_data: PriceSeries {
            historical,
            prediction,
        },
        trend_analysis: summarize(&predicted),
        current_avg_price: round2(current_avg_price),
        filter,
    })
}

fn fit_quadratic(
    history: &[f64],
    horizon: std::ops::Range<usize>,
) -> Result<Vec<f64>, ForecastError> {
    // Day indices are scaled to [0, 1) to keep the t^2 column well conditioned.
    #[allow(clippy::cast_precision_loss)]
    let scale = history.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let features = |idx: usize| {
        let t = idx as f64 / scale;
        vec![t, t * t]
    };

    let x = DenseMatrix::from_2d_vec(&(0..history.len()).map(features).collect::<Vec<_>>());
    let y = history.to_vec();

    let model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
        LinearRegression::fit(&x, &y, LinearRegressionParameters::default())
            .map_err(|e| ForecastError::Regression(e.to_string()))?;

    let future = DenseMatrix::from_2d_vec(&horizon.map(features).collect::<Vec<_>>());
    model
        .predict(&future)
        .map_err(|e| ForecastError::Regression(e.to_string()))
}

fn summarize(predicted: &[f64]) -> TrendAnalysis {
    let first = predicted.first().copied().unwrap_or_default();
    let last = predicted.last().copied().unwrap_or_default();
    let change = last - first;
    let change_percent = if first > 0.0 {
        change / first * 100.0
    } else {
        0.0
    };

    let trend = if change > 0.0 {
        Trend::Rising
    } else if change < 0.0 {
        Trend::Falling
    } else {
        Trend::Stable
    };

    TrendAnalysis {
        start_price: round2(first),
        end_price: round2(last),
        change: round2(change),
        change_percent: round2(change_percent),
        trend,
    }
}

fn day_offset(days: usize) -> Duration {
    Duration::days(i64::try_from(days).unwrap_or(i64::MAX))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
