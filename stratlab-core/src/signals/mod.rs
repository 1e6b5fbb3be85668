//! Signal generation: price vs. a lagged rolling mean, labelled per period.
//!
//! Every strategy shares the same pipeline (see [`SignalStrategy::generate`]):
//! 1. Compute the rolling mean of the prior `window` closes.
//! 2. Drop periods where that mean is undefined (warmup or NaN in the window).
//! 3. Classify each remaining period into a raw [`Signal`].
//! 4. Derive `position_change` as the first difference of the raw signal,
//!    with an implicit prior signal of 0 before the first retained row.
//!
//! Signals never see portfolio state. The held state lives in the simulator.

pub mod mean_reversion;
pub mod momentum;

pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::indicators::{shifted_rolling_mean, Indicator};

/// Raw per-period stance label.
///
/// For mean reversion `Neutral` is a level label ("no band breach"), not a
/// held state: consecutive neutrals say nothing about whether a position is
/// open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Exit,
    Neutral,
    Long,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Self::Exit => -1,
            Self::Neutral => 0,
            Self::Long => 1,
        }
    }
}

/// The two strategy families explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyFamily {
    Momentum,
    MeanReversion,
}

impl fmt::Display for StrategyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Momentum => write!(f, "Momentum"),
            Self::MeanReversion => write!(f, "Mean Reversion"),
        }
    }
}

/// One retained period of a signal frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    /// Mean of the `window` closes before `date`. Always defined.
    pub rolling_mean: f64,
    pub signal: Signal,
    /// `signal[t] - signal[t-1]`. Ranges over -2..=2; only ±1 trade.
    pub position_change: i8,
}

/// Signal rows for one strategy parameterization over one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub symbol: String,
    pub family: StrategyFamily,
    pub label: String,
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position_changes(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.position_change).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

/// A rolling-mean strategy.
///
/// Implementors only decide how a close compares to its lagged mean; the
/// shared `generate` handles warmup, row dropping, and differencing.
pub trait SignalStrategy: Send + Sync {
    fn family(&self) -> StrategyFamily;

    /// Display label including parameters, e.g. "Momentum (W=20)".
    fn label(&self) -> String;

    /// Rolling-mean window in periods.
    fn window(&self) -> usize;

    /// Raw signal for one period given its close and the lagged mean.
    fn classify(&self, close: f64, rolling_mean: f64) -> Signal;

    /// Number of leading periods that can never produce a row.
    fn warmup_bars(&self) -> usize {
        self.window()
    }

    fn generate(&self, series: &PriceSeries) -> SignalFrame {
        let closes = series.closes();
        let means = shifted_rolling_mean(self.window()).compute(&closes);

        let mut rows = Vec::with_capacity(series.len().saturating_sub(self.warmup_bars()));
        let mut prior = Signal::Neutral.value();
        for (point, &mean) in series.points().iter().zip(&means) {
            if mean.is_nan() {
                continue;
            }
            let signal = self.classify(point.close, mean);
            rows.push(SignalRow {
                date: point.date,
                close: point.close,
                rolling_mean: mean,
                signal,
                position_change: signal.value() - prior,
            });
            prior = signal.value();
        }

        SignalFrame {
            symbol: series.symbol().to_string(),
            family: self.family(),
            label: self.label(),
            rows,
        }
    }
}
