//! Parameter exploration over the momentum and mean-reversion grids.
//!
//! Every grid point is an independent signal → simulate → evaluate run over a
//! shared, immutably borrowed price series. Results keep grid order whether
//! the points run sequentially or on the rayon pool, and the best point is
//! picked by a sequential reduction over that order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ConfigError, ExplorerConfig};
use crate::metrics::PerformanceMetrics;
use crate::risk_free::{resolve_risk_free_rate, RiskFreeRate, RiskFreeRateProvider};
use stratlab_core::{
    simulate_frame, MeanReversion, Momentum, PriceSeries, SignalStrategy, SimulatedSeries,
    SimulationError, StrategyFamily,
};

/// Unique identifier for an evaluated grid point (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid parameters: {0}")]
    InvalidParameters(ParameterSet),

    #[error("simulation failed for {parameters}: {source}")]
    Simulation {
        parameters: ParameterSet,
        #[source]
        source: SimulationError,
    },

    #[error("no {family} parameterization produced a defined Sharpe ratio")]
    NoViableParameters { family: StrategyFamily },
}

/// One point of a parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ParameterSet {
    Momentum { window: usize },
    MeanReversion { window: usize, threshold: f64 },
}

impl ParameterSet {
    pub fn family(&self) -> StrategyFamily {
        match self {
            Self::Momentum { .. } => StrategyFamily::Momentum,
            Self::MeanReversion { .. } => StrategyFamily::MeanReversion,
        }
    }

    pub fn window(&self) -> usize {
        match *self {
            Self::Momentum { window } | Self::MeanReversion { window, .. } => window,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        match *self {
            Self::Momentum { .. } => None,
            Self::MeanReversion { threshold, .. } => Some(threshold),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.window() >= 1
            && self
                .threshold()
                .map_or(true, |t| t.is_finite() && t >= 0.0)
    }

    pub fn build_strategy(&self) -> Result<Box<dyn SignalStrategy>, ExploreError> {
        if !self.is_valid() {
            return Err(ExploreError::InvalidParameters(*self));
        }
        Ok(match *self {
            Self::Momentum { window } => Box::new(Momentum::new(window)),
            Self::MeanReversion { window, threshold } => {
                Box::new(MeanReversion::new(window, threshold))
            }
        })
    }

    /// Deterministic fingerprint of this grid point run against a dataset.
    ///
    /// Two runs with the same parameters, dataset, cash and rate share an id.
    pub fn run_id(&self, dataset_hash: &str, initial_cash: f64, risk_free_rate: f64) -> RunId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(dataset_hash.as_bytes());
        match *self {
            Self::Momentum { window } => {
                hasher.update(b"momentum");
                hasher.update(&(window as u64).to_le_bytes());
            }
            Self::MeanReversion { window, threshold } => {
                hasher.update(b"mean_reversion");
                hasher.update(&(window as u64).to_le_bytes());
                hasher.update(&threshold.to_le_bytes());
            }
        }
        hasher.update(&initial_cash.to_le_bytes());
        hasher.update(&risk_free_rate.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Momentum { window } => write!(f, "Momentum (W={window})"),
            Self::MeanReversion { window, threshold } => {
                write!(f, "Mean Reversion (W={window}, T={threshold:.3})")
            }
        }
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResult {
    pub parameters: ParameterSet,
    pub run_id: RunId,
    pub metrics: PerformanceMetrics,
    pub series: SimulatedSeries,
}

impl ParameterResult {
    pub fn sharpe(&self) -> Option<f64> {
        self.metrics.sharpe_ratio
    }
}

/// Run one grid point: signal → simulate → evaluate.
pub fn evaluate(
    series: &PriceSeries,
    parameters: ParameterSet,
    initial_cash: f64,
    risk_free_rate: f64,
) -> Result<ParameterResult, ExploreError> {
    evaluate_hashed(
        series,
        &series.content_hash(),
        parameters,
        initial_cash,
        risk_free_rate,
    )
}

fn evaluate_hashed(
    series: &PriceSeries,
    dataset_hash: &str,
    parameters: ParameterSet,
    initial_cash: f64,
    risk_free_rate: f64,
) -> Result<ParameterResult, ExploreError> {
    let strategy = parameters.build_strategy()?;
    let frame = strategy.generate(series);
    let simulated = simulate_frame(&frame, initial_cash)
        .map_err(|source| ExploreError::Simulation { parameters, source })?;
    let metrics = PerformanceMetrics::compute(&simulated.portfolio_values(), risk_free_rate);

    tracing::debug!(
        symbol = series.symbol(),
        %parameters,
        rows = simulated.len(),
        sharpe = ?metrics.sharpe_ratio,
        max_drawdown = ?metrics.max_drawdown,
        "evaluated grid point"
    );

    Ok(ParameterResult {
        parameters,
        run_id: parameters.run_id(dataset_hash, initial_cash, risk_free_rate),
        metrics,
        series: simulated,
    })
}

/// Index of the result with the highest defined Sharpe ratio.
///
/// Strictly greater wins, so ties keep the earliest result. Undefined or
/// non-finite ratios never win.
pub fn select_best(results: &[ParameterResult]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, result) in results.iter().enumerate() {
        let Some(sharpe) = result.sharpe().filter(|s| s.is_finite()) else {
            continue;
        };
        match best {
            Some((_, current)) if sharpe <= current => {}
            _ => best = Some((i, sharpe)),
        }
    }
    best.map(|(i, _)| i)
}

/// All results for one strategy family, in grid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyExploration {
    pub family: StrategyFamily,
    pub results: Vec<ParameterResult>,
    /// Index into `results`.
    pub best: Option<usize>,
}

impl FamilyExploration {
    pub fn new(family: StrategyFamily, results: Vec<ParameterResult>) -> Self {
        let best = select_best(&results);
        Self {
            family,
            results,
            best,
        }
    }

    pub fn best(&self) -> Option<&ParameterResult> {
        self.best.and_then(|i| self.results.get(i))
    }

    pub fn require_best(&self) -> Result<&ParameterResult, ExploreError> {
        self.best().ok_or(ExploreError::NoViableParameters {
            family: self.family,
        })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results ordered by Sharpe ratio, best first; undefined or non-finite
    /// ratios last, in grid order.
    pub fn ranked(&self) -> Vec<&ParameterResult> {
        let defined = |r: &ParameterResult| r.sharpe().filter(|s| s.is_finite());
        let mut ranked: Vec<_> = self.results.iter().collect();
        ranked.sort_by(|a, b| match (defined(a), defined(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked
    }
}

/// Both families explored over one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub symbol: String,
    pub dataset_hash: String,
    pub initial_cash: f64,
    pub risk_free: RiskFreeRate,
    pub momentum: FamilyExploration,
    pub mean_reversion: FamilyExploration,
}

impl Exploration {
    /// The overall pick: mean reversion when its best Sharpe is at least the
    /// momentum best, otherwise whichever family has a viable result.
    pub fn preferred(&self) -> Option<&ParameterResult> {
        match (self.momentum.best(), self.mean_reversion.best()) {
            (Some(mom), Some(mr)) => {
                if mr.sharpe() >= mom.sharpe() {
                    Some(mr)
                } else {
                    Some(mom)
                }
            }
            (Some(mom), None) => Some(mom),
            (None, Some(mr)) => Some(mr),
            (None, None) => None,
        }
    }
}

/// Grid exploration executor.
pub struct ParameterExplorer {
    config: ExplorerConfig,
    risk_free: RiskFreeRate,
}

impl ParameterExplorer {
    /// Validates the config and resolves the risk-free rate without providers.
    pub fn new(config: ExplorerConfig) -> Result<Self, ExploreError> {
        Self::with_providers(config, &[])
    }

    pub fn with_providers(
        config: ExplorerConfig,
        providers: &[&dyn RiskFreeRateProvider],
    ) -> Result<Self, ExploreError> {
        config.validate()?;
        let risk_free = resolve_risk_free_rate(config.simulation.risk_free_rate, providers);
        Ok(Self { config, risk_free })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn risk_free(&self) -> &RiskFreeRate {
        &self.risk_free
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn explore(&self, series: &PriceSeries) -> Result<Exploration, ExploreError> {
        self.explore_with_progress(series, |_, _, _| {})
    }

    /// Explores both grids, calling `progress(index, total, result)` after each
    /// grid point. Under parallel execution calls arrive out of order.
    pub fn explore_with_progress<F>(
        &self,
        series: &PriceSeries,
        progress: F,
    ) -> Result<Exploration, ExploreError>
    where
        F: Fn(usize, usize, &ParameterResult) + Send + Sync,
    {
        let momentum_sets = self.config.momentum.parameter_sets();
        let mean_reversion_sets = self.config.mean_reversion.parameter_sets();
        let total = momentum_sets.len() + mean_reversion_sets.len();
        let dataset_hash = series.content_hash();

        tracing::info!(
            symbol = series.symbol(),
            rows = series.len(),
            grid_points = total,
            parallel = self.config.parallel,
            risk_free_rate = self.risk_free.rate,
            risk_free_source = %self.risk_free.source,
            "starting parameter exploration"
        );

        let momentum = self.run_grid(series, &dataset_hash, &momentum_sets, 0, total, &progress)?;
        let mean_reversion = self.run_grid(
            series,
            &dataset_hash,
            &mean_reversion_sets,
            momentum_sets.len(),
            total,
            &progress,
        )?;

        let exploration = Exploration {
            symbol: series.symbol().to_string(),
            dataset_hash,
            initial_cash: self.config.simulation.initial_cash,
            risk_free: self.risk_free.clone(),
            momentum: FamilyExploration::new(StrategyFamily::Momentum, momentum),
            mean_reversion: FamilyExploration::new(StrategyFamily::MeanReversion, mean_reversion),
        };

        tracing::info!(
            symbol = %exploration.symbol,
            best_momentum = ?exploration.momentum.best().map(|r| r.parameters.to_string()),
            best_mean_reversion = ?exploration.mean_reversion.best().map(|r| r.parameters.to_string()),
            "parameter exploration finished"
        );
        Ok(exploration)
    }

    fn run_grid<F>(
        &self,
        series: &PriceSeries,
        dataset_hash: &str,
        sets: &[ParameterSet],
        offset: usize,
        total: usize,
        progress: &F,
    ) -> Result<Vec<ParameterResult>, ExploreError>
    where
        F: Fn(usize, usize, &ParameterResult) + Send + Sync,
    {
        let cash = self.config.simulation.initial_cash;
        let rf = self.risk_free.rate;
        let run = |(idx, params): (usize, &ParameterSet)| -> Result<ParameterResult, ExploreError> {
            let result = evaluate_hashed(series, dataset_hash, *params, cash, rf)?;
            progress(offset + idx, total, &result);
            Ok(result)
        };

        if self.config.parallel {
            sets.par_iter().enumerate().map(run).collect()
        } else {
            sets.iter().enumerate().map(run).collect()
        }
    }
}
