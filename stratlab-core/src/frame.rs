//! Close-price adapter: resolves a tabular price frame into a `PriceSeries`.
//!
//! Price frames arrive with several label shapes for the same field:
//! flat (`Close`), flattened composites (`Close_TSLA`, `TSLA_Close`), or
//! two-level composites written as `(Close, TSLA)` / `Close|TSLA`. All of that
//! is settled here, once, before any strategy runs.
//!
//! Resolution priority (case-insensitive, first column wins on ties):
//! 1. `Close_{SYMBOL}` or `(Close, SYMBOL)`
//! 2. `Close`
//! 3. `{SYMBOL}_Close` or `(SYMBOL, Close)`

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, DataType, PolarsError};
use thiserror::Error;

use crate::domain::{PricePoint, PriceSeries, SeriesError};

const CLOSE_FIELD: &str = "Close";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("no close-price column for '{symbol}' among {available:?}")]
    MissingCloseColumn {
        symbol: String,
        available: Vec<String>,
    },
    #[error("no date column among {0:?}")]
    MissingDateColumn(Vec<String>),
    #[error("null {column} at row {row}")]
    NullValue { column: String, row: usize },
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// A parsed column label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    Flat(String),
    /// Two-level label, in the order written.
    Composite(String, String),
}

fn strip_quotes(part: &str) -> String {
    part.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

impl ColumnLabel {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let parts = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            Some(body) => body.split_once(','),
            None => trimmed.split_once('|'),
        };
        match parts {
            Some((first, second)) => {
                let first = strip_quotes(first);
                let second = strip_quotes(second);
                // an empty second level is a flat label in disguise
                if second.is_empty() {
                    Self::Flat(first)
                } else {
                    Self::Composite(first, second)
                }
            }
            None => Self::Flat(trimmed.to_string()),
        }
    }

    /// Rank as the close column for `symbol`; lower is better, `None` if unrelated.
    pub fn close_priority(&self, symbol: &str) -> Option<u8> {
        let is = |a: &str, b: &str| a.eq_ignore_ascii_case(b);
        match self {
            Self::Flat(name) => {
                if is(name, &format!("{CLOSE_FIELD}_{symbol}")) {
                    Some(0)
                } else if is(name, CLOSE_FIELD) {
                    Some(1)
                } else if is(name, &format!("{symbol}_{CLOSE_FIELD}")) {
                    Some(2)
                } else {
                    None
                }
            }
            Self::Composite(first, second) => {
                if is(first, CLOSE_FIELD) && is(second, symbol) {
                    Some(0)
                } else if is(first, symbol) && is(second, CLOSE_FIELD) {
                    Some(2)
                } else {
                    None
                }
            }
        }
    }
}

/// Index of the close column for `symbol` among `labels`.
pub fn resolve_close_column(labels: &[&str], symbol: &str) -> Result<usize, FrameError> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            ColumnLabel::parse(raw)
                .close_priority(symbol)
                .map(|priority| (priority, i))
        })
        .min()
        .map(|(_, i)| i)
        .ok_or_else(|| FrameError::MissingCloseColumn {
            symbol: symbol.to_string(),
            available: labels.iter().map(|l| l.to_string()).collect(),
        })
}

fn detect_date_column(columns: &[Column]) -> Option<usize> {
    columns
        .iter()
        .position(|c| matches!(c.dtype(), DataType::Date | DataType::Datetime(_, _)))
        .or_else(|| {
            columns.iter().position(|c| {
                let name = c.name().as_str();
                name.eq_ignore_ascii_case("date") || name.eq_ignore_ascii_case("timestamp")
            })
        })
}

/// Resolve `df` into a validated `PriceSeries` for `symbol`.
///
/// `date_column` pins the date column by exact name; otherwise the first
/// `Date`/`Datetime` column is used, then a column named `date`/`timestamp`.
pub fn price_series_from_frame(
    df: &DataFrame,
    symbol: &str,
    date_column: Option<&str>,
) -> Result<PriceSeries, FrameError> {
    let columns = df.get_columns();
    let labels: Vec<&str> = columns.iter().map(|c| c.name().as_str()).collect();
    let available = || labels.iter().map(|l| l.to_string()).collect::<Vec<_>>();

    let close_idx = resolve_close_column(&labels, symbol)?;
    let date_idx = match date_column {
        Some(name) => labels.iter().position(|l| *l == name),
        None => detect_date_column(columns),
    }
    .ok_or_else(|| FrameError::MissingDateColumn(available()))?;

    let date_col = columns[date_idx].cast(&DataType::Date)?;
    let date_ca = date_col.date()?;
    let close_col = columns[close_idx].cast(&DataType::Float64)?;
    let close_ca = close_col.f64()?;

    // NaiveDate::default() is the Unix epoch, the origin of polars Date values.
    let epoch = NaiveDate::default();
    let mut points = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let days = date_ca.get(row).ok_or_else(|| FrameError::NullValue {
            column: labels[date_idx].to_string(),
            row,
        })?;
        let close = close_ca.get(row).ok_or_else(|| FrameError::NullValue {
            column: labels[close_idx].to_string(),
            row,
        })?;
        points.push(PricePoint {
            date: epoch + chrono::Duration::days(days as i64),
            close,
        });
    }

    tracing::debug!(
        symbol,
        close_column = labels[close_idx],
        date_column = labels[date_idx],
        rows = points.len(),
        "resolved price frame"
    );

    Ok(PriceSeries::new(symbol, points)?)
}
