//! Portfolio state, trade log, and daily snapshots.

use chrono::NaiveDate;

/// The one mutable entity in a simulation: current cash and share counts.
/// Mutated only by the allocation engine; `cash` is zero from the initial
/// investment onward.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares_a: f64,
    pub shares_b: f64,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        PortfolioState {
            cash: initial_capital,
            shares_a: 0.0,
            shares_b: 0.0,
        }
    }

    /// Mark-to-market value at the given prices.
    pub fn total_value(&self, price_a: f64, price_b: f64) -> f64 {
        self.shares_a * price_a + self.shares_b * price_b + self.cash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Initial,
    Rebalance,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeKind::Initial => write!(f, "initial"),
            TradeKind::Rebalance => write!(f, "rebalance"),
        }
    }
}

/// Append-only trade log entry. Deltas are present only for rebalances.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub kind: TradeKind,
    pub shares_a: f64,
    pub shares_b: f64,
    pub price_a: f64,
    pub price_b: f64,
    pub cash: f64,
    pub delta_a: Option<f64>,
    pub delta_b: Option<f64>,
}

/// Daily valuation: `total_value == value_a + value_b + cash` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub total_value: f64,
    pub value_a: f64,
    pub value_b: f64,
    pub cash: f64,
}

impl PortfolioSnapshot {
    pub fn take(state: &PortfolioState, date: NaiveDate, price_a: f64, price_b: f64) -> Self {
        let value_a = state.shares_a * price_a;
        let value_b = state.shares_b * price_b;
        PortfolioSnapshot {
            date,
            total_value: value_a + value_b + state.cash,
            value_a,
            value_b,
            cash: state.cash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_all_cash() {
        let state = PortfolioState::new(100_000.0);
        assert!((state.cash - 100_000.0).abs() < f64::EPSILON);
        assert!((state.shares_a - 0.0).abs() < f64::EPSILON);
        assert!((state.shares_b - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_value_marks_to_market() {
        let state = PortfolioState {
            cash: 0.0,
            shares_a: 7500.0,
            shares_b: 1250.0,
        };
        let value = state.total_value(12.0, 18.0);
        assert!((value - 112_500.0).abs() < 1e-9);
    }

    #[test]
    fn total_value_includes_cash() {
        let state = PortfolioState {
            cash: 500.0,
            shares_a: 10.0,
            shares_b: 0.0,
        };
        assert!((state.total_value(10.0, 99.0) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_components_sum_to_total() {
        let state = PortfolioState {
            cash: 0.0,
            shares_a: 7500.0,
            shares_b: 1250.0,
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let snap = PortfolioSnapshot::take(&state, date, 10.0, 20.0);

        assert_eq!(snap.date, date);
        assert!((snap.value_a - 75_000.0).abs() < 1e-9);
        assert!((snap.value_b - 25_000.0).abs() < 1e-9);
        assert!((snap.total_value - (snap.value_a + snap.value_b + snap.cash)).abs() < 1e-6);
    }
}
