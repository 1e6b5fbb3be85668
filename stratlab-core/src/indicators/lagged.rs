//! One-period lag wrapper.
//!
//! `Lagged<I>` moves every value of the inner indicator forward by one index,
//! so the value reported at t was computed from closes up to t-1 only.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Lagged<I> {
    inner: I,
    name: String,
}

impl<I: Indicator> Lagged<I> {
    pub fn new(inner: I) -> Self {
        let name = format!("lag1_{}", inner.name());
        Self { inner, name }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: Indicator> Indicator for Lagged<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.inner.lookback() + 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let raw = self.inner.compute(closes);
        let mut shifted = vec![f64::NAN; raw.len()];
        if raw.len() > 1 {
            shifted[1..].copy_from_slice(&raw[..raw.len() - 1]);
        }
        shifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Sma;

    #[test]
    fn shifts_by_one() {
        let lagged = Lagged::new(Sma::new(1));
        let result = lagged.compute(&[1.0, 2.0, 3.0]);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[1.0, 2.0]);
    }

    #[test]
    fn name_and_lookback() {
        let lagged = Lagged::new(Sma::new(20));
        assert_eq!(lagged.name(), "lag1_sma_20");
        assert_eq!(lagged.lookback(), 20);
        assert_eq!(lagged.inner().period(), 20);
    }

    #[test]
    fn empty_and_single() {
        let lagged = Lagged::new(Sma::new(1));
        assert!(lagged.compute(&[]).is_empty());
        let single = lagged.compute(&[5.0]);
        assert_eq!(single.len(), 1);
        assert!(single[0].is_nan());
    }
}
