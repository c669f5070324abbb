//! Report generation port trait.

use std::path::Path;

use crate::domain::error::PairfolioError;
use crate::domain::metrics::{PerformanceMetrics, YearlyReturn};
use crate::domain::simulation::SimulationResult;

/// Port for rendering a finished simulation into files.
pub trait ReportPort {
    fn write(
        &self,
        result: &SimulationResult,
        metrics: &PerformanceMetrics,
        yearly: &[YearlyReturn],
        output_dir: &Path,
    ) -> Result<(), PairfolioError>;
}
