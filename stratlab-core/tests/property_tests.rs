//! Property tests for signal and simulator invariants.
//!
//! Uses proptest to verify:
//! 1. Momentum never emits an exit label
//! 2. Simulation preserves length, and an idle first row is worth the starting cash
//! 3. Cash and units are never both non-zero
//! 4. Re-entry while long leaves cash and units untouched
//! 5. All-zero position changes keep the portfolio at its starting cash

use chrono::NaiveDate;
use proptest::prelude::*;
use stratlab_core::{
    simulate, simulate_frame, MeanReversion, Momentum, PortfolioState, PriceSeries, Signal,
    SignalStrategy,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), 0..120)
}

fn arb_change() -> impl Strategy<Value = i8> {
    prop::sample::select(vec![-2i8, -1, 0, 0, 0, 1, 2])
}

fn arb_cash() -> impl Strategy<Value = f64> {
    1.0..10_000.0_f64
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), closes)
}

// ── 1. Momentum domain ───────────────────────────────────────────────

proptest! {
    #[test]
    fn momentum_never_exits(closes in arb_closes(), window in 1usize..60) {
        let frame = Momentum::new(window).generate(&series(&closes));
        prop_assert!(frame.rows.iter().all(|r| r.signal != Signal::Exit));
        prop_assert!(frame.rows.iter().all(|r| (-1..=1).contains(&r.position_change)));
        prop_assert_eq!(frame.len(), closes.len().saturating_sub(window));
    }

    #[test]
    fn position_change_is_first_difference(
        closes in arb_closes(),
        window in 1usize..30,
        threshold in 0.0..0.1_f64,
    ) {
        let frame = MeanReversion::new(window, threshold).generate(&series(&closes));
        let mut prior = 0i8;
        for row in &frame.rows {
            prop_assert_eq!(row.position_change, row.signal.value() - prior);
            prior = row.signal.value();
        }
    }
}

// ── 2–5. Simulator ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn length_preserved_and_idle_start(
        rows in prop::collection::vec((arb_change(), arb_price()), 1..150),
        cash in arb_cash(),
    ) {
        let (changes, prices): (Vec<i8>, Vec<f64>) = rows.into_iter().unzip();
        let values = simulate(&changes, &prices, cash).unwrap();
        prop_assert_eq!(values.len(), changes.len());
        if changes[0] != 1 {
            prop_assert_eq!(values[0], cash);
        }
    }

    #[test]
    fn cash_and_units_exclusive(
        rows in prop::collection::vec((arb_change(), arb_price()), 0..150),
        cash in arb_cash(),
    ) {
        let mut state = PortfolioState::new(cash);
        for (change, price) in rows {
            state.apply(change, price);
            prop_assert!((state.cash == 0.0) != (state.units_held == 0.0));
            prop_assert_eq!(state.in_market, state.units_held > 0.0);
        }
    }

    #[test]
    fn reentry_never_changes_holdings(
        entry in arb_price(),
        later in prop::collection::vec(arb_price(), 1..20),
        cash in arb_cash(),
    ) {
        let mut state = PortfolioState::new(cash);
        state.apply(1, entry);
        let snapshot = state;
        for price in later {
            prop_assert!(state.apply(1, price).is_none());
            prop_assert_eq!(state, snapshot);
        }
    }

    #[test]
    fn all_zero_changes_are_flat(prices in prop::collection::vec(arb_price(), 0..150), cash in arb_cash()) {
        let values = simulate(&vec![0; prices.len()], &prices, cash).unwrap();
        prop_assert!(values.iter().all(|&v| v == cash));
    }

    #[test]
    fn frame_simulation_matches_slice_simulation(
        closes in arb_closes(),
        window in 1usize..30,
        threshold in 0.0..0.1_f64,
    ) {
        let frame = MeanReversion::new(window, threshold).generate(&series(&closes));
        let sim = simulate_frame(&frame, 100.0).unwrap();
        let values = simulate(&frame.position_changes(), &frame.closes(), 100.0).unwrap();
        prop_assert_eq!(sim.portfolio_values(), values);
    }
}
