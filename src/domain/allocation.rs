//! Allocation engine: initial investment and proportional rebalancing.
//!
//! Both operations are pure reallocation: no cash enters or leaves the
//! portfolio, and after `invest` the state holds zero cash for good.

use chrono::NaiveDate;

use super::error::PairfolioError;
use super::portfolio::{PortfolioState, TradeKind, TradeRecord};
use super::schedule::RebalancePolicy;

fn validate_prices(date: NaiveDate, price_a: f64, price_b: f64) -> Result<(), PairfolioError> {
    if price_a <= 0.0 {
        return Err(PairfolioError::invalid_input(format!(
            "non-positive price {price_a} for instrument A on {date}"
        )));
    }
    if price_b <= 0.0 {
        return Err(PairfolioError::invalid_input(format!(
            "non-positive price {price_b} for instrument B on {date}"
        )));
    }
    Ok(())
}

/// Deploy all cash into the two instruments at the target weights.
///
/// Requires a freshly funded state (`cash > 0`). Sets `cash` to zero and
/// returns the `Initial` trade record.
pub fn invest(
    state: &mut PortfolioState,
    date: NaiveDate,
    price_a: f64,
    price_b: f64,
    policy: &RebalancePolicy,
) -> Result<TradeRecord, PairfolioError> {
    validate_prices(date, price_a, price_b)?;
    policy.validate()?;
    if state.cash <= 0.0 {
        return Err(PairfolioError::invalid_input(format!(
            "initial investment requires positive cash, have {}",
            state.cash
        )));
    }

    state.shares_a = state.cash * policy.weight_a / price_a;
    state.shares_b = state.cash * policy.weight_b / price_b;
    state.cash = 0.0;

    Ok(TradeRecord {
        date,
        kind: TradeKind::Initial,
        shares_a: state.shares_a,
        shares_b: state.shares_b,
        price_a,
        price_b,
        cash: state.cash,
        delta_a: None,
        delta_b: None,
    })
}

/// Redistribute the current portfolio value across the two instruments at
/// the target weights.
///
/// A zero-value portfolio is a no-op (`Ok(None)`) — a data anomaly, not an
/// error. Calling twice at the same prices leaves the state unchanged; the
/// second record carries zero deltas.
pub fn rebalance(
    state: &mut PortfolioState,
    date: NaiveDate,
    price_a: f64,
    price_b: f64,
    policy: &RebalancePolicy,
) -> Result<Option<TradeRecord>, PairfolioError> {
    validate_prices(date, price_a, price_b)?;
    policy.validate()?;

    let current_value = state.total_value(price_a, price_b);
    if current_value == 0.0 {
        return Ok(None);
    }

    let target_shares_a = current_value * policy.weight_a / price_a;
    let target_shares_b = current_value * policy.weight_b / price_b;

    let delta_a = target_shares_a - state.shares_a;
    let delta_b = target_shares_b - state.shares_b;

    state.shares_a = target_shares_a;
    state.shares_b = target_shares_b;

    Ok(Some(TradeRecord {
        date,
        kind: TradeKind::Rebalance,
        shares_a: state.shares_a,
        shares_b: state.shares_b,
        price_a,
        price_b,
        cash: state.cash,
        delta_a: Some(delta_a),
        delta_b: Some(delta_b),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::Frequency;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn policy() -> RebalancePolicy {
        RebalancePolicy::new(Frequency::Monthly, 0.75, 0.25).unwrap()
    }

    #[test]
    fn invest_splits_cash_by_weights() {
        // $100k at 75/25 with prices $10/$20.
        let mut state = PortfolioState::new(100_000.0);
        let trade = invest(&mut state, date(), 10.0, 20.0, &policy()).unwrap();

        assert!((state.shares_a - 7500.0).abs() < 1e-9);
        assert!((state.shares_b - 1250.0).abs() < 1e-9);
        assert!((state.cash - 0.0).abs() < f64::EPSILON);

        assert_eq!(trade.kind, TradeKind::Initial);
        assert!(trade.delta_a.is_none());
        assert!(trade.delta_b.is_none());
        assert!((trade.shares_a - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn invest_conserves_value() {
        let mut state = PortfolioState::new(50_000.0);
        invest(&mut state, date(), 13.37, 42.0, &policy()).unwrap();
        assert!((state.total_value(13.37, 42.0) - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn invest_rejects_zero_price() {
        let mut state = PortfolioState::new(100_000.0);
        let result = invest(&mut state, date(), 0.0, 20.0, &policy());
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
        // State untouched on failure.
        assert!((state.cash - 100_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invest_rejects_negative_price() {
        let mut state = PortfolioState::new(100_000.0);
        let result = invest(&mut state, date(), 10.0, -1.0, &policy());
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn invest_rejects_empty_state() {
        let mut state = PortfolioState::new(0.0);
        let result = invest(&mut state, date(), 10.0, 20.0, &policy());
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn invest_rejects_bad_weights() {
        let mut state = PortfolioState::new(100_000.0);
        let bad = RebalancePolicy {
            frequency: Frequency::Monthly,
            weight_a: 0.6,
            weight_b: 0.6,
        };
        let result = invest(&mut state, date(), 10.0, 20.0, &bad);
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn rebalance_hits_target_weights() {
        // Continuing from entry at $10/$20, prices move to $12/$18.
        let mut state = PortfolioState::new(100_000.0);
        invest(&mut state, date(), 10.0, 20.0, &policy()).unwrap();

        let trade = rebalance(&mut state, date(), 12.0, 18.0, &policy())
            .unwrap()
            .expect("non-zero portfolio rebalances");

        // Pre-rebalance value: 7500*12 + 1250*18 = 112,500.
        assert!((state.shares_a - 7031.25).abs() < 1e-9);
        assert!((state.shares_b - 1562.5).abs() < 1e-9);
        assert!((state.cash - 0.0).abs() < f64::EPSILON);

        assert_eq!(trade.kind, TradeKind::Rebalance);
        assert!((trade.delta_a.unwrap() - (7031.25 - 7500.0)).abs() < 1e-9);
        assert!((trade.delta_b.unwrap() - (1562.5 - 1250.0)).abs() < 1e-9);

        // Value conserved across the rebalance.
        assert!((state.total_value(12.0, 18.0) - 112_500.0).abs() < 1e-6);
    }

    #[test]
    fn rebalance_twice_is_idempotent() {
        let mut state = PortfolioState::new(100_000.0);
        invest(&mut state, date(), 10.0, 20.0, &policy()).unwrap();
        rebalance(&mut state, date(), 12.0, 18.0, &policy()).unwrap();

        let before = state.clone();
        let second = rebalance(&mut state, date(), 12.0, 18.0, &policy())
            .unwrap()
            .unwrap();

        assert_eq!(state, before);
        assert!(second.delta_a.unwrap().abs() < 1e-9);
        assert!(second.delta_b.unwrap().abs() < 1e-9);
    }

    #[test]
    fn rebalance_zero_value_is_noop() {
        let mut state = PortfolioState::new(0.0);
        let result = rebalance(&mut state, date(), 10.0, 20.0, &policy()).unwrap();
        assert!(result.is_none());
        assert_eq!(state, PortfolioState::new(0.0));
    }

    #[test]
    fn rebalance_rejects_non_positive_prices() {
        let mut state = PortfolioState::new(100_000.0);
        invest(&mut state, date(), 10.0, 20.0, &policy()).unwrap();
        let result = rebalance(&mut state, date(), -5.0, 18.0, &policy());
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn rebalance_weight_fractions_match_targets() {
        let mut state = PortfolioState::new(100_000.0);
        invest(&mut state, date(), 10.0, 20.0, &policy()).unwrap();
        rebalance(&mut state, date(), 17.3, 9.9, &policy()).unwrap();

        let value = state.total_value(17.3, 9.9);
        assert!((state.shares_a * 17.3 / value - 0.75).abs() < 1e-6);
        assert!((state.shares_b * 9.9 / value - 0.25).abs() < 1e-6);
    }
}
