//! Single-configuration head-to-head of the two strategy families.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ComparisonConfig;
use crate::explorer::{evaluate, ExploreError, ParameterResult, ParameterSet};
use stratlab_core::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Momentum,
    MeanReversion,
    Tie,
    /// Neither side has a defined Sharpe ratio.
    Undetermined,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Momentum => write!(f, "Momentum"),
            Winner::MeanReversion => write!(f, "Mean Reversion"),
            Winner::Tie => write!(f, "Tie"),
            Winner::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// A defined Sharpe ratio beats an undefined one.
pub fn decide_winner(momentum_sharpe: Option<f64>, mean_reversion_sharpe: Option<f64>) -> Winner {
    let defined = |s: Option<f64>| s.filter(|v| v.is_finite());
    match (defined(momentum_sharpe), defined(mean_reversion_sharpe)) {
        (None, None) => Winner::Undetermined,
        (Some(_), None) => Winner::Momentum,
        (None, Some(_)) => Winner::MeanReversion,
        (Some(m), Some(r)) if m > r => Winner::Momentum,
        (Some(m), Some(r)) if r > m => Winner::MeanReversion,
        _ => Winner::Tie,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub momentum: ParameterResult,
    pub mean_reversion: ParameterResult,
    pub winner: Winner,
}

pub fn compare_strategies(
    series: &PriceSeries,
    config: &ComparisonConfig,
    initial_cash: f64,
    risk_free_rate: f64,
) -> Result<StrategyComparison, ExploreError> {
    let momentum = evaluate(
        series,
        ParameterSet::Momentum {
            window: config.momentum_window,
        },
        initial_cash,
        risk_free_rate,
    )?;
    let mean_reversion = evaluate(
        series,
        ParameterSet::MeanReversion {
            window: config.mean_reversion_window,
            threshold: config.threshold,
        },
        initial_cash,
        risk_free_rate,
    )?;
    let winner = decide_winner(momentum.sharpe(), mean_reversion.sharpe());

    tracing::info!(
        symbol = series.symbol(),
        momentum_sharpe = ?momentum.sharpe(),
        mean_reversion_sharpe = ?mean_reversion.sharpe(),
        %winner,
        "strategy comparison"
    );

    Ok(StrategyComparison {
        momentum,
        mean_reversion,
        winner,
    })
}
