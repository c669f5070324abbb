//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    parse_optional_date, validate_data_config, validate_simulation_config,
};
use crate::domain::error::PairfolioError;
use crate::domain::metrics::{yearly_returns, PerformanceMetrics};
use crate::domain::price_series::PriceSeries;
use crate::domain::schedule::{Frequency, RebalancePolicy};
use crate::domain::simulation::{run_simulation, SimulationConfig, SimulationResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pairfolio", about = "Fixed-weight two-asset rebalancing backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory for report files
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [simulation] initial_capital
        #[arg(long)]
        capital: Option<f64>,
        /// Override [simulation] frequency (monthly|quarterly|none)
        #[arg(long)]
        frequency: Option<String>,
        /// Override [simulation] start_date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Override [simulation] end_date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Run monthly and quarterly side by side and compare
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Write per-frequency reports under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show data range for the configured symbols
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            capital,
            frequency,
            start,
            end,
            dry_run,
        } => {
            let overrides = Overrides {
                capital,
                frequency,
                start,
                end,
            };
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_deref(), &overrides)
            }
        }
        Command::Compare { config, output } => run_compare(&config, output.as_deref()),
        Command::Info { config } => run_info(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub capital: Option<f64>,
    pub frequency: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PairfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Build the engine configuration from `[simulation]`, applying CLI
/// overrides on top.
pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<SimulationConfig, PairfolioError> {
    let initial_capital = overrides
        .capital
        .unwrap_or_else(|| adapter.get_double("simulation", "initial_capital", 100_000.0));

    let frequency_str = overrides
        .frequency
        .clone()
        .or_else(|| adapter.get_string("simulation", "frequency"))
        .unwrap_or_else(|| "monthly".to_string());
    let frequency =
        Frequency::parse(&frequency_str).ok_or_else(|| PairfolioError::ConfigInvalid {
            section: "simulation".into(),
            key: "frequency".into(),
            reason: format!("unknown frequency {frequency_str:?}"),
        })?;

    let policy = RebalancePolicy::new(
        frequency,
        adapter.get_double("simulation", "weight_a", 0.75),
        adapter.get_double("simulation", "weight_b", 0.25),
    )?;

    let config = SimulationConfig {
        initial_capital,
        policy,
    };
    config.validate()?;
    Ok(config)
}

/// Resolve the simulation date range: CLI overrides win over config keys;
/// both default to the full available range.
pub fn resolve_date_range(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), PairfolioError> {
    let start = match overrides.start {
        Some(d) => Some(d),
        None => parse_optional_date(adapter, "start_date")?,
    };
    let end = match overrides.end {
        Some(d) => Some(d),
        None => parse_optional_date(adapter, "end_date")?,
    };
    Ok((start, end))
}

/// Fetch both symbols and inner-join them into the aligned price table.
pub fn load_price_series(
    data_port: &dyn DataPort,
    adapter: &dyn ConfigPort,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<PriceSeries, PairfolioError> {
    let symbol_a = require_symbol(adapter, "symbol_a")?;
    let symbol_b = require_symbol(adapter, "symbol_b")?;

    eprintln!("Fetching daily closes for {symbol_a} and {symbol_b}...");
    let closes_a = data_port.fetch_daily_closes(&symbol_a, start, end)?;
    let closes_b = data_port.fetch_daily_closes(&symbol_b, start, end)?;

    let series = PriceSeries::inner_join(&closes_a, &closes_b)?;
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        eprintln!("  {} trading dates, {} to {}", series.len(), first, last);
    }
    Ok(series)
}

fn require_symbol(adapter: &dyn ConfigPort, key: &str) -> Result<String, PairfolioError> {
    adapter
        .get_string("data", key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PairfolioError::ConfigMissing {
            section: "data".into(),
            key: key.into(),
        })
}

fn data_port_from_config(adapter: &dyn ConfigPort) -> Result<CsvAdapter, PairfolioError> {
    let path = adapter
        .get_string("data", "path")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PairfolioError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path)))
}

fn run_backtest(config_path: &Path, output: Option<&Path>, overrides: &Overrides) -> ExitCode {
    // Stage 1: load and validate config.
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&adapter).and_then(|()| validate_data_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: build engine configuration.
    let sim_config = match build_simulation_config(&adapter, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // CLI flag wins over [report] output_dir; no report without either.
    let output = output.map(Path::to_path_buf).or_else(|| {
        adapter
            .get_string("report", "output_dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    });

    // Stages 3-5: fetch, simulate, report.
    match execute(&adapter, &sim_config, overrides) {
        Ok((result, metrics)) => {
            print_summary(&result, &metrics);

            let yearly = yearly_returns(&result.snapshots);
            if !yearly.is_empty() {
                eprintln!("\n=== Year by Year ===");
                for y in &yearly {
                    eprintln!(
                        "  {}: {:+.2}% (max drawdown {:.2}%)",
                        y.year,
                        y.return_pct * 100.0,
                        y.max_drawdown * 100.0
                    );
                }
            }

            if let Some(dir) = output {
                if let Err(e) = CsvReportAdapter.write(&result, &metrics, &yearly, &dir) {
                    eprintln!("error: failed to write report: {e}");
                    return (&e).into();
                }
                eprintln!("\nReport written to: {}", dir.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn execute(
    adapter: &dyn ConfigPort,
    sim_config: &SimulationConfig,
    overrides: &Overrides,
) -> Result<(SimulationResult, PerformanceMetrics), PairfolioError> {
    let data_port = data_port_from_config(adapter)?;
    let (start, end) = resolve_date_range(adapter, overrides)?;
    let series = load_price_series(&data_port, adapter, start, end)?;

    eprintln!(
        "Running simulation: ${:.2} at {:.0}/{:.0}, {} rebalancing",
        sim_config.initial_capital,
        sim_config.policy.weight_a * 100.0,
        sim_config.policy.weight_b * 100.0,
        sim_config.policy.frequency,
    );

    let result = run_simulation(&series, sim_config)?;
    let metrics = PerformanceMetrics::compute(&result.snapshots, result.initial_capital)?;
    Ok((result, metrics))
}

fn print_summary(result: &SimulationResult, metrics: &PerformanceMetrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Final Value:      ${:.2}", result.final_value());
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", metrics.volatility * 100.0);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:     {:.3}", metrics.sharpe_ratio);
    eprintln!("Rebalances:       {}", result.rebalance_dates.len());
}

fn run_compare(config_path: &Path, output: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_simulation_config(&adapter).and_then(|()| validate_data_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut runs = Vec::new();
    for frequency in ["monthly", "quarterly"] {
        eprintln!("\n--- {frequency} rebalancing ---");
        let overrides = Overrides {
            frequency: Some(frequency.to_string()),
            ..Overrides::default()
        };
        let sim_config = match build_simulation_config(&adapter, &overrides) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        match execute(&adapter, &sim_config, &overrides) {
            Ok((result, metrics)) => {
                print_summary(&result, &metrics);
                if let Some(dir) = output {
                    let yearly = yearly_returns(&result.snapshots);
                    let subdir = dir.join(frequency);
                    if let Err(e) = CsvReportAdapter.write(&result, &metrics, &yearly, &subdir) {
                        eprintln!("error: failed to write report: {e}");
                        return (&e).into();
                    }
                    eprintln!("Report written to: {}", subdir.display());
                }
                runs.push((result, metrics));
            }
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    let [(monthly, m_metrics), (quarterly, q_metrics)] = &runs[..] else {
        return ExitCode::from(1);
    };

    eprintln!("\n=== Monthly vs Quarterly ===");
    eprintln!("{:<18} {:>14} {:>14} {:>14}", "metric", "monthly", "quarterly", "diff");
    let rows = [
        ("final value", monthly.final_value(), quarterly.final_value()),
        ("total return %", m_metrics.total_return * 100.0, q_metrics.total_return * 100.0),
        (
            "annualized %",
            m_metrics.annualized_return * 100.0,
            q_metrics.annualized_return * 100.0,
        ),
        ("volatility %", m_metrics.volatility * 100.0, q_metrics.volatility * 100.0),
        ("max drawdown %", m_metrics.max_drawdown * 100.0, q_metrics.max_drawdown * 100.0),
        ("sharpe", m_metrics.sharpe_ratio, q_metrics.sharpe_ratio),
    ];
    for (name, m, q) in rows {
        eprintln!("{name:<18} {m:>14.2} {q:>14.2} {:>14.2}", q - m);
    }
    eprintln!(
        "{:<18} {:>14} {:>14} {:>14}",
        "rebalances",
        monthly.rebalance_dates.len(),
        quarterly.rebalance_dates.len(),
        quarterly.rebalance_dates.len() as i64 - monthly.rebalance_dates.len() as i64,
    );

    ExitCode::SUCCESS
}

fn run_info(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_data_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let data_port = match data_port_from_config(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for key in ["symbol_a", "symbol_b"] {
        let symbol = match require_symbol(&adapter, key) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        match data_port.get_data_range(&symbol) {
            Ok(Some((first, last, count))) => {
                println!("{symbol}: {count} rows, {first} to {last}");
            }
            Ok(None) => eprintln!("{symbol}: no data found"),
            Err(e) => {
                eprintln!("error querying {symbol}: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter).and_then(|()| validate_data_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid");
    ExitCode::SUCCESS
}

fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter).and_then(|()| validate_data_config(&adapter))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let sim_config = match build_simulation_config(&adapter, &Overrides::default()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nSimulation configuration:");
    eprintln!("  initial capital: ${:.2}", sim_config.initial_capital);
    eprintln!(
        "  weights:         {:.2} / {:.2}",
        sim_config.policy.weight_a, sim_config.policy.weight_b
    );
    eprintln!("  frequency:       {}", sim_config.policy.frequency);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}
