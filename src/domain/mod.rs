//! Core domain types and logic.

pub mod allocation;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod price_series;
pub mod schedule;
pub mod simulation;
