//! Simulation driver: one forward pass over the price series.

use chrono::NaiveDate;

use super::allocation::{invest, rebalance};
use super::error::PairfolioError;
use super::portfolio::{PortfolioSnapshot, PortfolioState, TradeRecord};
use super::price_series::PriceSeries;
use super::schedule::{schedule_rebalance_dates, RebalancePolicy};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub policy: RebalancePolicy,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), PairfolioError> {
        if self.initial_capital <= 0.0 {
            return Err(PairfolioError::invalid_input(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        self.policy.validate()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_capital: 100_000.0,
            policy: RebalancePolicy::default(),
        }
    }
}

/// Read-only outcome of a run, handed to analytics and reporting.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub snapshots: Vec<PortfolioSnapshot>,
    pub trades: Vec<TradeRecord>,
    pub rebalance_dates: Vec<NaiveDate>,
    pub initial_capital: f64,
    pub policy: RebalancePolicy,
}

impl SimulationResult {
    pub fn final_value(&self) -> f64 {
        self.snapshots
            .last()
            .map(|s| s.total_value)
            .unwrap_or(self.initial_capital)
    }
}

/// Run the full backtest: invest on the first trading date, rebalance on
/// each scheduled date, snapshot every date.
///
/// Rebalances happen before the day's snapshot, so the snapshot reflects
/// post-rebalance holdings at that day's closes.
pub fn run_simulation(
    series: &PriceSeries,
    config: &SimulationConfig,
) -> Result<SimulationResult, PairfolioError> {
    config.validate()?;
    if series.is_empty() {
        return Err(PairfolioError::InsufficientData { have: 0, need: 1 });
    }

    let rebalance_dates = schedule_rebalance_dates(&config.policy, series);

    let mut state = PortfolioState::new(config.initial_capital);
    let mut trades = Vec::with_capacity(rebalance_dates.len() + 1);
    let mut snapshots = Vec::with_capacity(series.len());

    let mut pending = rebalance_dates.iter().copied().peekable();

    for (i, row) in series.rows().iter().enumerate() {
        if i == 0 {
            trades.push(invest(
                &mut state,
                row.date,
                row.close_a,
                row.close_b,
                &config.policy,
            )?);
        } else if pending.peek() == Some(&row.date) {
            pending.next();
            if let Some(trade) =
                rebalance(&mut state, row.date, row.close_a, row.close_b, &config.policy)?
            {
                trades.push(trade);
            }
        }

        snapshots.push(PortfolioSnapshot::take(
            &state, row.date, row.close_a, row.close_b,
        ));
    }

    Ok(SimulationResult {
        snapshots,
        trades,
        rebalance_dates,
        initial_capital: config.initial_capital,
        policy: config.policy,
    })
}
