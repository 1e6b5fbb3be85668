//! Portfolio simulator: replays position changes through an all-in/all-out
//! cash/units state machine.
//!
//! Rows are processed strictly in order, one pass, no lookahead. Per row:
//!
//! | state  | change | effect                                   |
//! |--------|--------|------------------------------------------|
//! | flat   | +1     | units = cash / price, cash = 0, go long  |
//! | long   | +1     | none (re-entry is idempotent)            |
//! | long   | -1     | cash = units * price, units = 0, go flat |
//! | any    | other  | none                                     |
//!
//! A value `cash + units * price` is emitted for every row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signals::{Signal, SignalFrame, StrategyFamily};

/// Starting cash used when the caller has no preference.
pub const DEFAULT_INITIAL_CASH: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid price {price} at row {row}: prices must be finite and > 0")]
    InvalidPrice { row: usize, price: f64 },
    #[error("length mismatch: {changes} position changes vs {prices} prices")]
    LengthMismatch { changes: usize, prices: usize },
    #[error("invalid initial cash {0}: must be finite and > 0")]
    InvalidInitialCash(f64),
}

/// What a single row did to the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Enter,
    Exit,
}

/// Cash/units state. Never both positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub cash: f64,
    pub units_held: f64,
    pub in_market: bool,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            units_held: 0.0,
            in_market: false,
        }
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.units_held * price
    }

    /// Apply one row's position change at `price`. Caller guarantees a valid price.
    pub fn apply(&mut self, position_change: i8, price: f64) -> Option<Transition> {
        match (self.in_market, position_change) {
            (false, 1) => {
                self.units_held = self.cash / price;
                self.cash = 0.0;
                self.in_market = true;
                Some(Transition::Enter)
            }
            (true, -1) => {
                self.cash = self.units_held * price;
                self.units_held = 0.0;
                self.in_market = false;
                Some(Transition::Exit)
            }
            _ => None,
        }
    }
}

fn check_price(row: usize, price: f64) -> Result<(), SimulationError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidPrice { row, price })
    }
}

fn check_cash(initial_cash: f64) -> Result<(), SimulationError> {
    if initial_cash.is_finite() && initial_cash > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidInitialCash(initial_cash))
    }
}

/// Portfolio value per row for a bare position-change/price pair of slices.
pub fn simulate(
    position_changes: &[i8],
    prices: &[f64],
    initial_cash: f64,
) -> Result<Vec<f64>, SimulationError> {
    if position_changes.len() != prices.len() {
        return Err(SimulationError::LengthMismatch {
            changes: position_changes.len(),
            prices: prices.len(),
        });
    }
    check_cash(initial_cash)?;

    let mut state = PortfolioState::new(initial_cash);
    let mut values = Vec::with_capacity(prices.len());
    for (row, (&change, &price)) in position_changes.iter().zip(prices).enumerate() {
        check_price(row, price)?;
        state.apply(change, price);
        values.push(state.value(price));
    }
    Ok(values)
}

/// A signal row after simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rolling_mean: f64,
    pub signal: Signal,
    pub position_change: i8,
    pub portfolio_value: f64,
    /// Held state after this row. Distinct from the raw `signal` label.
    pub in_market: bool,
}

/// One entry and, if it happened inside the sample, its exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
}

impl TradeRecord {
    /// Fractional return of a closed trade.
    pub fn return_pct(&self) -> Option<f64> {
        self.exit_price.map(|exit| exit / self.entry_price - 1.0)
    }

    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }
}

/// Full simulated trace for one strategy parameterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSeries {
    pub symbol: String,
    pub family: StrategyFamily,
    pub label: String,
    pub initial_cash: f64,
    pub rows: Vec<SimulatedRow>,
}

impl SimulatedSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn portfolio_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.portfolio_value).collect()
    }

    pub fn last(&self) -> Option<&SimulatedRow> {
        self.rows.last()
    }

    /// Round trips reconstructed from the held-state column.
    pub fn trades(&self) -> Vec<TradeRecord> {
        let mut trades = Vec::new();
        let mut open: Option<TradeRecord> = None;
        let mut was_in_market = false;

        for row in &self.rows {
            match (was_in_market, row.in_market) {
                (false, true) => {
                    open = Some(TradeRecord {
                        entry_date: row.date,
                        entry_price: row.close,
                        exit_date: None,
                        exit_price: None,
                    });
                }
                (true, false) => {
                    if let Some(mut trade) = open.take() {
                        trade.exit_date = Some(row.date);
                        trade.exit_price = Some(row.close);
                        trades.push(trade);
                    }
                }
                _ => {}
            }
            was_in_market = row.in_market;
        }
        trades.extend(open);
        trades
    }
}

/// Simulate a signal frame, keeping its columns alongside the portfolio value.
pub fn simulate_frame(
    frame: &SignalFrame,
    initial_cash: f64,
) -> Result<SimulatedSeries, SimulationError> {
    check_cash(initial_cash)?;

    let mut state = PortfolioState::new(initial_cash);
    let mut rows = Vec::with_capacity(frame.len());
    for (row, signal_row) in frame.rows.iter().enumerate() {
        check_price(row, signal_row.close)?;
        if let Some(transition) = state.apply(signal_row.position_change, signal_row.close) {
            tracing::trace!(
                symbol = %frame.symbol,
                strategy = %frame.label,
                date = %signal_row.date,
                price = signal_row.close,
                ?transition,
                "portfolio transition"
            );
        }
        rows.push(SimulatedRow {
            date: signal_row.date,
            close: signal_row.close,
            rolling_mean: signal_row.rolling_mean,
            signal: signal_row.signal,
            position_change: signal_row.position_change,
            portfolio_value: state.value(signal_row.close),
            in_market: state.in_market,
        });
    }

    Ok(SimulatedSeries {
        symbol: frame.symbol.clone(),
        family: frame.family,
        label: frame.label.clone(),
        initial_cash,
        rows,
    })
}
