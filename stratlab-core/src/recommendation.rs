//! Latest-row trade recommendation.
//!
//! A read-only projection of the final simulated row. `action` follows the
//! last position change; `state` follows the raw signal label, not the held
//! position, so a mean-reversion series that is long on a `Neutral` row
//! reports `Flat`. The simulator's actual held state is carried separately
//! in `in_market`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::signals::Signal;
use crate::simulator::SimulatedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Long,
    Flat,
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "Long"),
            Self::Flat => write!(f, "Flat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub price: f64,
    pub rolling_mean: f64,
    pub signal: Signal,
    pub action: TradeAction,
    pub state: PositionState,
    pub in_market: bool,
}

impl TradeAction {
    pub fn from_position_change(position_change: i8) -> Self {
        match position_change {
            1 => Self::Buy,
            -1 => Self::Sell,
            _ => Self::Hold,
        }
    }
}

impl PositionState {
    pub fn from_signal(signal: Signal) -> Self {
        if signal.value() > 0 {
            Self::Long
        } else {
            Self::Flat
        }
    }
}

/// Recommendation for the most recent row, or `None` for an empty series.
pub fn latest_recommendation(series: &SimulatedSeries) -> Option<TradeRecommendation> {
    let row = series.last()?;
    Some(TradeRecommendation {
        symbol: series.symbol.clone(),
        as_of: row.date,
        price: row.close,
        rolling_mean: row.rolling_mean,
        signal: row.signal,
        action: TradeAction::from_position_change(row.position_change),
        state: PositionState::from_signal(row.signal),
        in_market: row.in_market,
    })
}

impl fmt::Display for TradeRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}) as of {} at {:.2}",
            self.symbol, self.action, self.state, self.as_of, self.price
        )
    }
}
