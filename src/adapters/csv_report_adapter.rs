//! CSV/text report adapter implementing ReportPort.
//!
//! Writes three files into the output directory: `snapshots.csv` (the
//! daily valuation series), `trades.csv` (initial investment plus every
//! rebalance), and `summary.txt` (metrics, rebalance dates, and the
//! per-year table).

use std::fs;
use std::path::Path;

use crate::domain::error::PairfolioError;
use crate::domain::metrics::{PerformanceMetrics, YearlyReturn};
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn write_snapshots(
        &self,
        result: &SimulationResult,
        path: &Path,
    ) -> Result<(), PairfolioError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| PairfolioError::Data {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        wtr.write_record(["date", "total_value", "value_a", "value_b", "cash"])
            .map_err(csv_error)?;
        for snap in &result.snapshots {
            wtr.write_record([
                snap.date.format("%Y-%m-%d").to_string(),
                format!("{:.4}", snap.total_value),
                format!("{:.4}", snap.value_a),
                format!("{:.4}", snap.value_b),
                format!("{:.4}", snap.cash),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(&self, result: &SimulationResult, path: &Path) -> Result<(), PairfolioError> {
        let mut wtr = csv::Writer::from_path(path).map_err(|e| PairfolioError::Data {
            reason: format!("failed to create {}: {}", path.display(), e),
        })?;

        wtr.write_record([
            "date", "kind", "shares_a", "shares_b", "price_a", "price_b", "cash", "delta_a",
            "delta_b",
        ])
        .map_err(csv_error)?;
        for trade in &result.trades {
            let delta = |d: Option<f64>| d.map(|v| format!("{v:.6}")).unwrap_or_default();
            wtr.write_record([
                trade.date.format("%Y-%m-%d").to_string(),
                trade.kind.to_string(),
                format!("{:.6}", trade.shares_a),
                format!("{:.6}", trade.shares_b),
                format!("{:.4}", trade.price_a),
                format!("{:.4}", trade.price_b),
                format!("{:.4}", trade.cash),
                delta(trade.delta_a),
                delta(trade.delta_b),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(
        &self,
        result: &SimulationResult,
        metrics: &PerformanceMetrics,
        yearly: &[YearlyReturn],
        path: &Path,
    ) -> Result<(), PairfolioError> {
        let mut out = String::new();
        out.push_str("Portfolio Performance Summary\n");
        out.push_str("=============================\n");
        out.push_str(&format!(
            "Initial capital:   ${:.2}\n",
            result.initial_capital
        ));
        out.push_str(&format!("Final value:       ${:.2}\n", result.final_value()));
        out.push_str(&format!(
            "Target weights:    {:.0}% / {:.0}%\n",
            result.policy.weight_a * 100.0,
            result.policy.weight_b * 100.0
        ));
        out.push_str(&format!("Frequency:         {}\n", result.policy.frequency));
        out.push_str(&format!(
            "Total return:      {:.2}%\n",
            metrics.total_return * 100.0
        ));
        out.push_str(&format!(
            "Annualized return: {:.2}%\n",
            metrics.annualized_return * 100.0
        ));
        out.push_str(&format!(
            "Volatility:        {:.2}%\n",
            metrics.volatility * 100.0
        ));
        out.push_str(&format!(
            "Max drawdown:      {:.2}%\n",
            metrics.max_drawdown * 100.0
        ));
        out.push_str(&format!("Sharpe ratio:      {:.3}\n", metrics.sharpe_ratio));

        out.push_str(&format!(
            "\nRebalances: {}\n",
            result.rebalance_dates.len()
        ));
        for (i, date) in result.rebalance_dates.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, date));
        }

        if !yearly.is_empty() {
            out.push_str("\nYear-by-year\n");
            out.push_str("year,start_value,end_value,return_pct,max_drawdown\n");
            for y in yearly {
                out.push_str(&format!(
                    "{},{:.2},{:.2},{:.2}%,{:.2}%\n",
                    y.year,
                    y.start_value,
                    y.end_value,
                    y.return_pct * 100.0,
                    y.max_drawdown * 100.0
                ));
            }
        }

        fs::write(path, out)?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> PairfolioError {
    PairfolioError::Data {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &SimulationResult,
        metrics: &PerformanceMetrics,
        yearly: &[YearlyReturn],
        output_dir: &Path,
    ) -> Result<(), PairfolioError> {
        fs::create_dir_all(output_dir)?;
        self.write_snapshots(result, &output_dir.join("snapshots.csv"))?;
        self.write_trades(result, &output_dir.join("trades.csv"))?;
        self.write_summary(result, metrics, yearly, &output_dir.join("summary.txt"))?;
        Ok(())
    }
}
