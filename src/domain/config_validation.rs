//! Configuration validation.
//!
//! Validates all config fields before a simulation runs, so bad values fail
//! fast with the offending section/key instead of mid-run.

use chrono::NaiveDate;

use crate::domain::error::PairfolioError;
use crate::domain::schedule::{Frequency, WEIGHT_SUM_TOLERANCE};
use crate::ports::config_port::ConfigPort;

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    validate_initial_capital(config)?;
    validate_weights(config)?;
    validate_frequency(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    validate_symbol(config, "symbol_a")?;
    validate_symbol(config, "symbol_b")?;
    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => Ok(()),
        _ => Err(PairfolioError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    let value = config.get_double("simulation", "initial_capital", 100_000.0);
    if value <= 0.0 {
        return Err(PairfolioError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_weights(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    let weight_a = config.get_double("simulation", "weight_a", 0.75);
    let weight_b = config.get_double("simulation", "weight_b", 0.25);

    for (key, value) in [("weight_a", weight_a), ("weight_b", weight_b)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(PairfolioError::ConfigInvalid {
                section: "simulation".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be between 0 and 1"),
            });
        }
    }

    if (weight_a + weight_b - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(PairfolioError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "weight_a".to_string(),
            reason: format!("weights must sum to 1, got {}", weight_a + weight_b),
        });
    }
    Ok(())
}

fn validate_frequency(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    let value = config
        .get_string("simulation", "frequency")
        .unwrap_or_else(|| "monthly".to_string());
    if Frequency::parse(&value).is_none() {
        return Err(PairfolioError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "frequency".to_string(),
            reason: "frequency must be monthly, quarterly, or none".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), PairfolioError> {
    // Both dates are optional; when present they must parse and be ordered.
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(PairfolioError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, PairfolioError> {
    match config.get_string("simulation", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|_| {
            PairfolioError::ConfigInvalid {
                section: "simulation".to_string(),
                key: key.to_string(),
                reason: format!("invalid {key} format, expected YYYY-MM-DD"),
            }
        }),
    }
}

fn validate_symbol(config: &dyn ConfigPort, key: &str) -> Result<(), PairfolioError> {
    match config.get_string("data", key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PairfolioError::ConfigMissing {
            section: "data".to_string(),
            key: key.to_string(),
        }),
    }
}
