//! Price series: the single-symbol close history every strategy reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when assembling a price series.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("dates must be strictly increasing: {date} at index {index} follows {previous}")]
    NonIncreasingDate {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
}

/// One closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Time-ordered closing prices for exactly one symbol.
///
/// Dates are strictly increasing. Strategies only ever borrow a series;
/// the rows they emit are freshly owned, so the caller's copy is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NonIncreasingDate {
                    index: index + 1,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Build a series from closes on consecutive calendar days starting at `start`.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// blake3 digest of symbol, dates and closes (hex).
    ///
    /// Two series hash equal iff every observation is bit-identical.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for point in &self.points {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}
