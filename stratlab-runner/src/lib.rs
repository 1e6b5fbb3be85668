//! StratLab Runner: parameter exploration, metrics, comparison, export.
//!
//! This crate builds on `stratlab-core` to provide:
//! - Performance metrics with explicit "undefined" results
//! - Risk-free rate resolution with a provider seam and fallback
//! - Serializable exploration config (TOML)
//! - Grid exploration over both strategy families, optionally on rayon
//! - Single-configuration strategy comparison
//! - JSON / CSV / Markdown export with schema versioning

pub mod comparison;
pub mod config;
pub mod explorer;
pub mod export;
pub mod metrics;
pub mod risk_free;

pub use comparison::{compare_strategies, decide_winner, StrategyComparison, Winner};
pub use config::{
    ComparisonConfig, ConfigError, ExplorerConfig, MeanReversionGrid, MomentumGrid,
    SimulationConfig,
};
pub use explorer::{
    evaluate, select_best, Exploration, ExploreError, FamilyExploration, ParameterExplorer,
    ParameterResult, ParameterSet, RunId,
};
pub use metrics::{DrawdownStats, PerformanceMetrics};
pub use risk_free::{
    percent_quote_to_fraction, resolve_risk_free_rate, RateFetchError, RateSource, RiskFreeRate,
    RiskFreeRateProvider, FALLBACK_RISK_FREE_RATE,
};
