//! Integration tests for grid exploration: determinism, ordering, best
//! selection, and error propagation.

use chrono::NaiveDate;
use std::collections::HashSet;
use stratlab_core::{latest_recommendation, PriceSeries, SimulationError, StrategyFamily};
use stratlab_runner::{
    ExploreError, ExplorerConfig, ParameterExplorer, ParameterSet, RateSource,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn oscillating(n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 12.0 * (t * 0.15).sin() + 4.0 * (t * 0.7).cos() + t * 0.05
        })
        .collect();
    PriceSeries::from_closes("TSLA", start(), &closes)
}

fn config(parallel: bool) -> ExplorerConfig {
    let mut config = ExplorerConfig::default();
    config.parallel = parallel;
    config.simulation.risk_free_rate = Some(0.02);
    config
}

/// Constant prices: zero volatility everywhere, so no grid point is viable.
#[test]
fn constant_prices_have_no_best_parameters() {
    let series = PriceSeries::from_closes("FLAT", start(), &[50.0; 50]);
    let exploration = ParameterExplorer::new(config(true))
        .unwrap()
        .explore(&series)
        .unwrap();

    assert_eq!(exploration.momentum.len(), 4);
    assert_eq!(exploration.mean_reversion.len(), 16);
    for result in exploration
        .momentum
        .results
        .iter()
        .chain(&exploration.mean_reversion.results)
    {
        assert_eq!(result.metrics.sharpe_ratio, None, "{}", result.parameters);
        assert_eq!(result.metrics.max_drawdown, None);
    }

    assert!(exploration.momentum.best().is_none());
    assert!(exploration.mean_reversion.best().is_none());
    assert!(exploration.preferred().is_none());
    assert!(matches!(
        exploration.mean_reversion.require_best(),
        Err(ExploreError::NoViableParameters {
            family: StrategyFamily::MeanReversion
        })
    ));
}

#[test]
fn parallel_matches_sequential() {
    let series = oscillating(300);
    let parallel = ParameterExplorer::new(config(true))
        .unwrap()
        .explore(&series)
        .unwrap();
    let sequential = ParameterExplorer::new(config(false))
        .unwrap()
        .explore(&series)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.momentum.best, sequential.momentum.best);
    assert_eq!(parallel.mean_reversion.best, sequential.mean_reversion.best);
}

#[test]
fn results_keep_grid_order() {
    let exploration = ParameterExplorer::new(config(true))
        .unwrap()
        .explore(&oscillating(200))
        .unwrap();

    let momentum: Vec<usize> = exploration
        .momentum
        .results
        .iter()
        .map(|r| r.parameters.window())
        .collect();
    assert_eq!(momentum, vec![10, 20, 30, 50]);

    let mr: Vec<ParameterSet> = exploration
        .mean_reversion
        .results
        .iter()
        .map(|r| r.parameters)
        .collect();
    assert_eq!(mr, ExplorerConfig::default().mean_reversion.parameter_sets());

    let ids: HashSet<&str> = exploration
        .momentum
        .results
        .iter()
        .chain(&exploration.mean_reversion.results)
        .map(|r| r.run_id.as_str())
        .collect();
    assert_eq!(ids.len(), 20, "run ids must be unique per grid point");
}

#[test]
fn best_is_highest_defined_sharpe() {
    let exploration = ParameterExplorer::new(config(false))
        .unwrap()
        .explore(&oscillating(300))
        .unwrap();

    for family in [&exploration.momentum, &exploration.mean_reversion] {
        let Some(best) = family.best() else { continue };
        let best_sharpe = best.sharpe().unwrap();
        for (i, r) in family.results.iter().enumerate() {
            if let Some(s) = r.sharpe() {
                assert!(s <= best_sharpe);
                if s == best_sharpe {
                    assert!(i >= family.best.unwrap(), "ties must keep the earliest");
                }
            }
        }
    }
}

#[test]
fn duplicate_grid_points_keep_first() {
    let mut cfg = config(true);
    cfg.momentum.windows = vec![30, 30, 30];
    let exploration = ParameterExplorer::new(cfg)
        .unwrap()
        .explore(&oscillating(300))
        .unwrap();

    let results = &exploration.momentum.results;
    assert!(results[0].sharpe().is_some());
    assert_eq!(results[0].metrics, results[1].metrics);
    assert_eq!(results[0].run_id, results[2].run_id);
    assert_eq!(exploration.momentum.best, Some(0));
}

#[test]
fn invalid_price_propagates() {
    let mut closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
    closes[60] = -5.0;
    let series = PriceSeries::from_closes("BAD", start(), &closes);

    for parallel in [false, true] {
        let err = ParameterExplorer::new(config(parallel))
            .unwrap()
            .explore(&series)
            .unwrap_err();
        match err {
            ExploreError::Simulation { source, .. } => {
                assert!(matches!(source, SimulationError::InvalidPrice { price, .. } if price == -5.0));
            }
            other => panic!("expected a simulation error, got {other}"),
        }
    }
}

#[test]
fn short_series_yields_empty_results_not_errors() {
    // shorter than every window: all frames are empty
    let series = PriceSeries::from_closes("TINY", start(), &[10.0, 11.0, 12.0]);
    let exploration = ParameterExplorer::new(config(true))
        .unwrap()
        .explore(&series)
        .unwrap();
    assert!(exploration
        .momentum
        .results
        .iter()
        .all(|r| r.series.is_empty() && r.metrics.sharpe_ratio.is_none()));
    assert!(exploration.preferred().is_none());
}

#[test]
fn preferred_result_recommends_from_its_series() {
    let exploration = ParameterExplorer::new(config(true))
        .unwrap()
        .explore(&oscillating(300))
        .unwrap();
    assert_eq!(exploration.risk_free.source, RateSource::Supplied);

    let preferred = exploration.preferred().expect("oscillating prices are tradable");
    let rec = latest_recommendation(&preferred.series).unwrap();
    assert_eq!(rec.symbol, "TSLA");
    assert_eq!(Some(rec.as_of), preferred.series.last().map(|r| r.date));
}

#[test]
fn flat_prices_never_signal_anywhere_in_the_grid() {
    for price in [0.1, 0.7, 1.1, 33.33] {
        let series = PriceSeries::from_closes("FLAT", start(), &[price; 60]);
        let exploration = ParameterExplorer::new(config(true))
            .unwrap()
            .explore(&series)
            .unwrap();
        for result in exploration
            .momentum
            .results
            .iter()
            .chain(&exploration.mean_reversion.results)
        {
            assert!(
                result.series.rows.iter().all(|r| r.signal.value() == 0 && !r.in_market),
                "{} signalled on a flat series at {price}",
                result.parameters
            );
        }
        assert!(exploration.preferred().is_none());
    }
}
