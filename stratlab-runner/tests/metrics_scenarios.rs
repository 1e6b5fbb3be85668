//! Hand-computed metric scenarios and metric properties.

use chrono::NaiveDate;
use proptest::prelude::*;
use stratlab_core::{simulate, PriceSeries};
use stratlab_runner::metrics::{drawdown_stats, sharpe_ratio, total_return};
use stratlab_runner::{evaluate, ParameterSet, PerformanceMetrics};

/// A single 20% drop from the peak, then a full recovery.
///
/// values = [100, 110, 88, 95, 110, 115]
/// peak 110 at index 1, trough 88 at index 2 (drawdown 22/110 = 0.2),
/// back to 110 at index 4: recovery 2 periods after the trough.
#[test]
fn twenty_percent_drop_and_recovery() {
    let values = [100.0, 110.0, 88.0, 95.0, 110.0, 115.0];
    let dd = drawdown_stats(&values).unwrap();
    assert!((dd.max_drawdown - 0.20).abs() < 1e-12);
    assert_eq!(dd.peak_index, 1);
    assert_eq!(dd.trough_index, 2);
    assert_eq!(dd.duration, 1);
    assert_eq!(dd.recovery_time, Some(2));
}

/// Buy on the first row and hold: portfolio value tracks the price exactly.
#[test]
fn buy_and_hold_portfolio_inherits_price_drawdown() {
    let prices = [100.0, 110.0, 88.0, 95.0, 110.0, 115.0];
    let values = simulate(&[1, 0, 0, 0, 0, 0], &prices, 100.0).unwrap();
    for (v, p) in values.iter().zip(prices) {
        assert!((v - p).abs() < 1e-9);
    }
    let m = PerformanceMetrics::compute(&values, 0.02);
    assert!((m.max_drawdown.unwrap() - 0.20).abs() < 1e-9);
    assert_eq!(m.recovery_time, Some(2));
    assert!((m.total_return.unwrap() - 0.15).abs() < 1e-9);
}

#[test]
fn never_trading_strategy_has_undefined_metrics() {
    // steadily falling prices: momentum never goes long
    let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
    let series =
        PriceSeries::from_closes("DOWN", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &closes);
    let result = evaluate(&series, ParameterSet::Momentum { window: 10 }, 100.0, 0.02).unwrap();

    assert!(result.series.rows.iter().all(|r| !r.in_market));
    assert_eq!(result.metrics.sharpe_ratio, None);
    assert_eq!(result.metrics.max_drawdown, None);
    assert_eq!(result.metrics.total_return, Some(0.0));
}

#[test]
fn sharpe_sign_follows_excess_return() {
    let rising: Vec<f64> = (0..100)
        .map(|i| 100.0 * 1.001_f64.powi(i) * if i % 2 == 0 { 1.0 } else { 1.0005 })
        .collect();
    assert!(sharpe_ratio(&rising, 0.0).unwrap() > 0.0);

    let falling: Vec<f64> = rising.iter().rev().copied().collect();
    assert!(sharpe_ratio(&falling, 0.0).unwrap() < 0.0);
}

proptest! {
    #[test]
    fn zero_drawdown_iff_non_decreasing(values in prop::collection::vec(1.0..1000.0_f64, 2..60)) {
        prop_assume!(values.iter().any(|&v| v != values[0]));
        let dd = drawdown_stats(&values).unwrap();
        let non_decreasing = values.windows(2).all(|w| w[1] >= w[0]);
        prop_assert_eq!(dd.max_drawdown == 0.0, non_decreasing);
        prop_assert!((0.0..1.0).contains(&dd.max_drawdown));
        prop_assert!(dd.peak_index <= dd.trough_index);
    }

    #[test]
    fn total_return_matches_endpoints(values in prop::collection::vec(1.0..1000.0_f64, 2..60)) {
        let expected = values[values.len() - 1] / values[0] - 1.0;
        prop_assert!((total_return(&values).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn sharpe_is_finite_or_absent(values in prop::collection::vec(1.0..1000.0_f64, 0..60), rf in 0.0..0.1_f64) {
        if let Some(s) = sharpe_ratio(&values, rf) {
            prop_assert!(s.is_finite());
        }
    }
}
