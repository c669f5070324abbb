//! Performance metrics over the snapshot series.
//!
//! Conventions follow the simulator's reporting: simple daily returns
//! compounded multiplicatively (not log returns), sample stdev annualized
//! by sqrt(252), and a fixed 3% risk-free rate for the sharpe ratio.

use chrono::Datelike;

use super::error::PairfolioError;
use super::portfolio::PortfolioSnapshot;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const DAYS_PER_YEAR: f64 = 365.25;
pub const RISK_FREE_RATE: f64 = 0.03;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
}

impl PerformanceMetrics {
    /// Pure function of the snapshot series and starting capital.
    ///
    /// Requires at least two snapshots; a single-day run has no elapsed
    /// time to annualize over. Zero volatility clamps the sharpe ratio to
    /// zero instead of failing.
    pub fn compute(
        snapshots: &[PortfolioSnapshot],
        initial_capital: f64,
    ) -> Result<Self, PairfolioError> {
        if snapshots.len() < 2 {
            return Err(PairfolioError::InsufficientData {
                have: snapshots.len(),
                need: 2,
            });
        }
        if initial_capital <= 0.0 {
            return Err(PairfolioError::invalid_input(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }

        let final_value = snapshots[snapshots.len() - 1].total_value;
        let total_return = (final_value - initial_capital) / initial_capital;

        let days = (snapshots[snapshots.len() - 1].date - snapshots[0].date).num_days();
        let years = days as f64 / DAYS_PER_YEAR;
        if years <= 0.0 {
            // Unreachable with a validated series; kept as a guard.
            return Err(PairfolioError::invalid_input(format!(
                "no elapsed time to annualize over: snapshots span {} to {}",
                snapshots[0].date,
                snapshots[snapshots.len() - 1].date
            )));
        }
        let annualized_return = (final_value / initial_capital).powf(1.0 / years) - 1.0;

        let returns = daily_returns(snapshots);
        let volatility = sample_stddev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
        let max_drawdown = max_drawdown(&returns);

        let sharpe_ratio = if volatility > 0.0 {
            (annualized_return - RISK_FREE_RATE) / volatility
        } else {
            0.0
        };

        Ok(PerformanceMetrics {
            total_return,
            annualized_return,
            volatility,
            max_drawdown,
            sharpe_ratio,
        })
    }
}

fn daily_returns(snapshots: &[PortfolioSnapshot]) -> Vec<f64> {
    snapshots
        .windows(2)
        .map(|w| {
            let prev = w[0].total_value;
            if prev > 0.0 {
                w[1].total_value / prev - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Sample (n-1) standard deviation; 0 for fewer than two observations.
fn sample_stddev(returns: &[f64]) -> f64 {
    let n = returns.len();
    if n < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}

/// Largest peak-to-trough decline of the multiplicative cumulative-return
/// series. The running peak is taken over the cumulative values themselves,
/// so the first value is never a drawdown. Zero or negative, never below -1
/// for non-negative values; zero with a single return.
fn max_drawdown(returns: &[f64]) -> f64 {
    let Some((first, rest)) = returns.split_first() else {
        return 0.0;
    };
    let mut cumulative = 1.0 + *first;
    let mut peak = cumulative;
    let mut max_dd = 0.0_f64;

    for r in rest {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = (cumulative - peak) / peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Calendar-year breakdown of the snapshot series.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyReturn {
    pub year: i32,
    pub start_value: f64,
    pub end_value: f64,
    pub return_pct: f64,
    pub max_drawdown: f64,
}

/// Per-year return and intra-year drawdown, in year order. Each year's
/// return is measured from its first to its last snapshot.
pub fn yearly_returns(snapshots: &[PortfolioSnapshot]) -> Vec<YearlyReturn> {
    let mut out: Vec<YearlyReturn> = Vec::new();
    let mut year_slice_start = 0;

    for i in 0..snapshots.len() {
        let year = snapshots[i].date.year();
        let is_last = i + 1 == snapshots.len();
        if !is_last && snapshots[i + 1].date.year() == year {
            continue;
        }

        let slice = &snapshots[year_slice_start..=i];
        let start_value = slice[0].total_value;
        let end_value = slice[slice.len() - 1].total_value;
        out.push(YearlyReturn {
            year,
            start_value,
            end_value,
            return_pct: if start_value > 0.0 {
                (end_value - start_value) / start_value
            } else {
                0.0
            },
            max_drawdown: max_drawdown(&daily_returns(slice)),
        });
        year_slice_start = i + 1;
    }
    out
}
