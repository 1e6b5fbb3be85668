//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a lookback window, including the current close.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        // Fresh sum per window. A window of equal closes yields that close exactly.
        for i in (self.period - 1)..n {
            let window = &closes[(i + 1 - self.period)..=i];
            if window.iter().any(|c| c.is_nan()) {
                continue;
            }
            let first = window[0];
            result[i] = if window.iter().all(|&c| c == first) {
                first
            } else {
                window.iter().sum::<f64>() / self.period as f64
            };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let result = Sma::new(5).compute(&closes);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().enumerate().take(4) {
            assert!(value.is_nan(), "expected NaN at index {i}");
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let result = Sma::new(1).compute(&[100.0, 200.0, 300.0]);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let closes = [10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0];
        let result = Sma::new(3).compute(&closes);
        // windows touching index 2 are NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_constant_series_is_exact() {
        for price in [100.0, 0.1, 0.7, 1.1, 33.33] {
            let result = Sma::new(10).compute(&[price; 50]);
            assert!(
                result[9..].iter().all(|&v| v == price),
                "mean drifted from {price}"
            );
        }
    }

    #[test]
    fn sma_flat_run_after_moves_is_exact() {
        let mut closes = vec![3.0, 9.5, 0.2, 7.7];
        closes.extend([0.1; 30]);
        let result = Sma::new(5).compute(&closes);
        assert!(result[8..].iter().all(|&v| v == 0.1));
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn sma_too_few_closes() {
        let result = Sma::new(5).compute(&[10.0, 11.0]);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn sma_zero_period_panics() {
        let _ = Sma::new(0);
    }
}
