//! StratLab Core: price series, indicators, signal strategies, portfolio simulation.
//!
//! This crate contains the deterministic half of the backtester:
//! - Domain types (single-symbol price series)
//! - Close-price adapter from polars frames with varying label shapes
//! - Lagged rolling-mean indicator with a look-ahead guard
//! - Momentum and mean-reversion signal strategies
//! - All-in/all-out portfolio simulator
//! - Latest-row trade recommendation
//!
//! Nothing here performs I/O or holds global state.

pub mod domain;
pub mod frame;
pub mod indicators;
pub mod recommendation;
pub mod signals;
pub mod simulator;

pub use domain::{PricePoint, PriceSeries, SeriesError};
pub use frame::{price_series_from_frame, FrameError};
pub use recommendation::{latest_recommendation, PositionState, TradeAction, TradeRecommendation};
pub use signals::{
    MeanReversion, Momentum, Signal, SignalFrame, SignalRow, SignalStrategy, StrategyFamily,
};
pub use simulator::{
    simulate, simulate_frame, PortfolioState, SimulatedRow, SimulatedSeries, SimulationError,
    TradeRecord, DEFAULT_INITIAL_CASH,
};
