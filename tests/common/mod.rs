#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};
use pairfolio::domain::error::PairfolioError;
pub use pairfolio::domain::price_series::{DailyClose, PriceSeries};
use pairfolio::domain::schedule::{Frequency, RebalancePolicy};
use pairfolio::domain::simulation::SimulationConfig;
use pairfolio::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<DailyClose>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, symbol: &str, closes: Vec<DailyClose>) -> Self {
        self.data.insert(symbol.to_string(), closes);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DailyClose>, PairfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PairfolioError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|c| start.is_none_or(|s| c.date >= s) && end.is_none_or(|e| c.date <= e))
            .collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PairfolioError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(closes) if !closes.is_empty() => {
                let min = closes.iter().map(|c| c.date).min().unwrap();
                let max = closes.iter().map(|c| c.date).max().unwrap();
                Ok(Some((min, max, closes.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_close(date_str: &str, close: f64) -> DailyClose {
    DailyClose {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        close,
    }
}

/// Weekday-only closes: `count` trading dates starting at `start_date`,
/// stepping the price by `step` per day.
pub fn generate_closes(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<DailyClose> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let mut closes = Vec::with_capacity(count);
    let mut cursor = start;
    let mut price = start_price;
    while closes.len() < count {
        if matches!(
            cursor.weekday(),
            chrono::Weekday::Sat | chrono::Weekday::Sun
        ) {
            cursor = cursor.succ_opt().unwrap();
            continue;
        }
        closes.push(DailyClose {
            date: cursor,
            close: price,
        });
        price += step;
        cursor = cursor.succ_opt().unwrap();
    }
    closes
}

/// Aligned two-symbol series over the same trading dates.
pub fn make_series(start_date: &str, count: usize, price_a: f64, price_b: f64) -> PriceSeries {
    let closes_a = generate_closes(start_date, count, price_a, 0.0);
    let closes_b = generate_closes(start_date, count, price_b, 0.0);
    PriceSeries::inner_join(&closes_a, &closes_b).unwrap()
}

pub fn sample_config() -> SimulationConfig {
    SimulationConfig {
        initial_capital: 100_000.0,
        policy: RebalancePolicy::new(Frequency::Monthly, 0.75, 0.25).unwrap(),
    }
}

pub fn sample_policy(frequency: Frequency) -> RebalancePolicy {
    RebalancePolicy::new(frequency, 0.75, 0.25).unwrap()
}
