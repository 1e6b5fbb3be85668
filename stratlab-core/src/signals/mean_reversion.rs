//! Mean reversion: buy closes below the lower band, exit above the upper.
//!
//! Bands are `mean * (1 - threshold)` and `mean * (1 + threshold)`. Both
//! edges are exclusive: a close exactly on a band is `Neutral`.

use super::{Signal, SignalStrategy, StrategyFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversion {
    pub window: usize,
    pub threshold: f64,
}

impl MeanReversion {
    pub fn new(window: usize, threshold: f64) -> Self {
        assert!(window >= 1, "window must be >= 1");
        assert!(
            threshold.is_finite() && threshold >= 0.0,
            "threshold must be finite and >= 0"
        );
        Self { window, threshold }
    }

    pub fn default_params() -> Self {
        Self::new(20, 0.02)
    }

    /// (lower, upper) band around a rolling mean.
    pub fn bands(&self, rolling_mean: f64) -> (f64, f64) {
        (
            rolling_mean * (1.0 - self.threshold),
            rolling_mean * (1.0 + self.threshold),
        )
    }
}

impl SignalStrategy for MeanReversion {
    fn family(&self) -> StrategyFamily {
        StrategyFamily::MeanReversion
    }

    fn label(&self) -> String {
        format!("Mean Reversion (W={}, T={:.3})", self.window, self.threshold)
    }

    fn window(&self) -> usize {
        self.window
    }

    fn classify(&self, close: f64, rolling_mean: f64) -> Signal {
        let (lower, upper) = self.bands(rolling_mean);
        if close < lower {
            Signal::Long
        } else if close > upper {
            Signal::Exit
        } else {
            Signal::Neutral
        }
    }
}
