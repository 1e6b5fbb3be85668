//! Momentum: long while the close is above its lagged rolling mean.
//!
//! Never emits `Signal::Exit`: the stance is either long or neutral, and the
//! drop from long to neutral is what produces a `-1` position change.

use super::{Signal, SignalStrategy, StrategyFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct Momentum {
    pub window: usize,
}

impl Momentum {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "window must be >= 1");
        Self { window }
    }

    pub fn default_params() -> Self {
        Self::new(20)
    }
}

impl SignalStrategy for Momentum {
    fn family(&self) -> StrategyFamily {
        StrategyFamily::Momentum
    }

    fn label(&self) -> String {
        format!("Momentum (W={})", self.window)
    }

    fn window(&self) -> usize {
        self.window
    }

    fn classify(&self, close: f64, rolling_mean: f64) -> Signal {
        if close > rolling_mean {
            Signal::Long
        } else {
            Signal::Neutral
        }
    }
}
