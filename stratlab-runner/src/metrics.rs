//! Performance metrics: pure functions over a portfolio-value series.
//!
//! Every metric that can be undefined returns `Option`. An undefined metric is
//! never encoded as 0.0 or NaN, so ranking code cannot mistake "unknown" for
//! "very small".

use serde::{Deserialize, Serialize};

/// Annualization convention for daily data.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for one simulated parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline as a positive fraction.
    pub max_drawdown: Option<f64>,
    /// Periods from the peak to the trough of the largest drawdown.
    pub drawdown_duration: Option<usize>,
    /// Periods from that trough back to the peak level, if it recovered.
    pub recovery_time: Option<usize>,
    pub total_return: Option<f64>,
}

impl PerformanceMetrics {
    pub fn compute(values: &[f64], risk_free_rate: f64) -> Self {
        let drawdown = drawdown_stats(values);
        Self {
            sharpe_ratio: sharpe_ratio(values, risk_free_rate),
            max_drawdown: drawdown.map(|d| d.max_drawdown),
            drawdown_duration: drawdown.map(|d| d.duration),
            recovery_time: drawdown.and_then(|d| d.recovery_time),
            total_return: total_return(values),
        }
    }
}

/// Shape of the largest drawdown in a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownStats {
    pub max_drawdown: f64,
    pub peak_index: usize,
    pub trough_index: usize,
    pub duration: usize,
    pub recovery_time: Option<usize>,
}

// ─── Individual metric functions ────────────────────────────────────

/// Period-over-period simple returns. The undefined first return is dropped.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Annualized Sharpe ratio.
///
/// `(mean(r) * 252 - rf) / (stdev(r) * sqrt(252))` with the sample standard
/// deviation. `None` with fewer than two returns, any non-finite return, or a
/// volatility of exactly zero.
pub fn sharpe_ratio(values: &[f64], risk_free_rate: f64) -> Option<f64> {
    let returns = period_returns(values);
    if returns.len() < 2 || returns.iter().any(|r| !r.is_finite()) {
        return None;
    }
    let annual_return = mean_f64(&returns) * TRADING_DAYS_PER_YEAR;
    let annual_volatility = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    if annual_volatility == 0.0 || !annual_volatility.is_finite() {
        return None;
    }
    Some((annual_return - risk_free_rate) / annual_volatility)
}

/// Largest drawdown with its duration and recovery.
///
/// `None` for an empty or constant series, or when any value is non-finite
/// or non-positive (drawdowns are relative to a positive peak).
pub fn drawdown_stats(values: &[f64]) -> Option<DrawdownStats> {
    let first = *values.first()?;
    if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return None;
    }
    if values.iter().all(|&v| v == first) {
        return None;
    }

    let mut running_max = f64::NEG_INFINITY;
    let mut trough_index = 0;
    let mut trough_drawdown = 0.0_f64;
    let mut peak_at_trough = first;
    for (i, &value) in values.iter().enumerate() {
        running_max = running_max.max(value);
        let drawdown = (value - running_max) / running_max;
        // strict: the first occurrence of the minimum is the trough
        if i == 0 || drawdown < trough_drawdown {
            trough_drawdown = drawdown;
            trough_index = i;
            peak_at_trough = running_max;
        }
    }

    let peak_index = values[..=trough_index]
        .iter()
        .position(|&v| v == peak_at_trough)
        .unwrap_or(trough_index);

    let recovery_time = if trough_index + 1 < values.len() {
        values[trough_index..]
            .iter()
            .position(|&v| v >= peak_at_trough)
    } else {
        None
    };

    Some(DrawdownStats {
        max_drawdown: trough_drawdown.abs(),
        peak_index,
        trough_index,
        duration: trough_index - peak_index,
        recovery_time,
    })
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let initial = values[0];
    let last = values[values.len() - 1];
    if initial <= 0.0 || !initial.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last - initial) / initial)
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
