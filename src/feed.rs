//! Price Series and Data Feed
//!
//! Seeded synthetic close-price generation plus the stream/feed layer the
//! environment observes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, TradeframeError};

/// Synthetic series configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Number of hourly observations
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Starting price
    #[serde(default = "default_initial_price")]
    pub initial_price: f64,
    /// Std dev of per-step returns
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    /// Mean per-step return
    #[serde(default = "default_drift")]
    pub drift: f64,
    /// RNG seed (fixed seed, fixed series)
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_steps() -> usize {
    200
}

fn default_initial_price() -> f64 {
    20_000.0
}

fn default_volatility() -> f64 {
    0.02
}

fn default_drift() -> f64 {
    0.001
}

fn default_seed() -> u64 {
    42
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            initial_price: default_initial_price(),
            volatility: default_volatility(),
            drift: default_drift(),
            seed: default_seed(),
        }
    }
}

/// One observation in a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// A generated close-price series with hourly timestamps
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Generate a seeded random-walk series: each close is the previous one
    /// multiplied by `1 + N(drift, volatility)`.
    pub fn synthetic(config: &SeriesConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        let mut points = Vec::with_capacity(config.steps);
        let mut price = config.initial_price;

        for step in 0..config.steps {
            let ret = config.drift + sample_normal(&mut rng) * config.volatility;
            price *= 1.0 + ret;
            points.push(PricePoint {
                timestamp: start + Duration::hours(step as i64),
                close: price.max(0.01),
            });
        }

        Self { points }
    }

    pub fn from_closes(closes: Vec<f64>) -> Self {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let points = closes
            .into_iter()
            .enumerate()
            .map(|(step, close)| PricePoint {
                timestamp: start + Duration::hours(step as i64),
                close,
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// (min, max) close over the series, None when empty
    pub fn close_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.close);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))))
    }
}

/// Standard normal sample via Box-Muller
fn sample_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// A named, immutable stream of values; the feed holds the cursor
#[derive(Debug, Clone)]
pub struct PriceStream {
    name: String,
    values: Arc<Vec<f64>>,
}

impl PriceStream {
    /// Wrap raw values under a placeholder name
    pub fn source(values: Vec<f64>) -> Self {
        Self {
            name: "stream".to_string(),
            values: Arc::new(values),
        }
    }

    pub fn from_series(series: &PriceSeries) -> Self {
        Self::source(series.closes())
    }

    /// Builder-style rename, e.g. `"USD-BTC"`
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or an error past the end
    pub fn at(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(TradeframeError::FeedExhausted)
    }
}

/// Ordered set of streams, stepped together one row at a time
#[derive(Debug, Clone, Default)]
pub struct DataFeed {
    streams: Vec<PriceStream>,
    cursor: usize,
}

impl DataFeed {
    pub fn new(streams: Vec<PriceStream>) -> Self {
        Self { streams, cursor: 0 }
    }

    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name()).collect()
    }

    /// Rows remaining before the shortest stream runs out
    pub fn remaining(&self) -> usize {
        self.streams
            .iter()
            .map(|s| s.len().saturating_sub(self.cursor))
            .min()
            .unwrap_or(0)
    }

    /// Index of the row most recently yielded by `next`
    pub fn last_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Row at an absolute index, without moving the cursor
    pub fn row_at(&self, index: usize) -> Option<Vec<f64>> {
        self.streams
            .iter()
            .map(|s| s.at(index).ok())
            .collect::<Option<Vec<f64>>>()
    }

    /// Yield the next observation row, one value per stream, or None once
    /// any stream is exhausted.
    pub fn next(&mut self) -> Option<Vec<f64>> {
        if self.remaining() == 0 {
            return None;
        }
        let row = self
            .streams
            .iter()
            .map(|s| s.values[self.cursor])
            .collect();
        self.cursor += 1;
        Some(row)
    }
}
