//! Rebalance policy and calendar scheduling.
//!
//! Candidate dates are calendar month-starts or quarter-starts strictly
//! after the first trading date; each candidate is then mapped to the first
//! trading date strictly after it. Kept as pure functions so the schedule
//! is testable without running a simulation.

use chrono::{Datelike, NaiveDate};

use super::error::PairfolioError;
use super::price_series::PriceSeries;

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Monthly,
    Quarterly,
    None,
}

impl Frequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Frequency::Monthly),
            "quarterly" => Some(Frequency::Quarterly),
            "none" => Some(Frequency::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::None => write!(f, "none"),
        }
    }
}

/// Immutable simulation-wide rebalancing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalancePolicy {
    pub frequency: Frequency,
    pub weight_a: f64,
    pub weight_b: f64,
}

impl RebalancePolicy {
    pub fn new(frequency: Frequency, weight_a: f64, weight_b: f64) -> Result<Self, PairfolioError> {
        let policy = RebalancePolicy {
            frequency,
            weight_a,
            weight_b,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PairfolioError> {
        if self.weight_a < 0.0 || self.weight_b < 0.0 {
            return Err(PairfolioError::invalid_input(format!(
                "weights must be non-negative, got {} and {}",
                self.weight_a, self.weight_b
            )));
        }
        if (self.weight_a + self.weight_b - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PairfolioError::invalid_input(format!(
                "weights must sum to 1, got {} + {} = {}",
                self.weight_a,
                self.weight_b,
                self.weight_a + self.weight_b
            )));
        }
        Ok(())
    }
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        RebalancePolicy {
            frequency: Frequency::Monthly,
            weight_a: 0.75,
            weight_b: 0.25,
        }
    }
}

/// First day of the month following `date`.
fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
}

/// Calendar period starts strictly after `first`, up to and including `last`.
fn candidate_starts(frequency: Frequency, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let step_months = match frequency {
        Frequency::Monthly => 1,
        Frequency::Quarterly => 3,
        Frequency::None => return Vec::new(),
    };

    let mut candidates = Vec::new();
    let mut cursor = next_month_start(first);
    if frequency == Frequency::Quarterly {
        // Advance to the next quarter boundary (Jan/Apr/Jul/Oct).
        while (cursor.month() - 1) % 3 != 0 {
            cursor = next_month_start(cursor);
        }
    }
    while cursor <= last {
        candidates.push(cursor);
        for _ in 0..step_months {
            cursor = next_month_start(cursor);
        }
    }
    candidates
}

/// Map the policy's calendar candidates onto actual trading dates.
///
/// Each candidate becomes the first trading date strictly after it;
/// candidates with no later trading date are dropped. The result is
/// deduplicated and ordered, and never contains the first trading date.
pub fn schedule_rebalance_dates(policy: &RebalancePolicy, series: &PriceSeries) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Vec::new();
    };

    let mut dates: Vec<NaiveDate> = candidate_starts(policy.frequency, first, last)
        .into_iter()
        .filter_map(|candidate| series.next_trading_date_after(candidate))
        .collect();
    dates.dedup();
    dates
}
