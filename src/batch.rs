//! Batch runner for many independent FTP computations
//!
//! Holds one engine config and runs portfolios (or both methods on one
//! portfolio) in parallel. Each task builds its own schedule; nothing is
//! shared between tasks except the read-only config.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calculator::FtpSchedule;
use crate::cohort::CohortInputs;
use crate::config::EngineConfig;
use crate::error::FtpResult;
use crate::method::ComputeMethod;

/// Pre-configured runner for batch FTP computations
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::from_env();
/// let schedules = runner.run_batch(&portfolios, ComputeMethod::Stock);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: EngineConfig,
}

impl BatchRunner {
    /// Runner with the default engine config
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner configured from `FTP_*` environment variables
    pub fn from_env() -> Self {
        Self::with_config(EngineConfig::from_env())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute one portfolio
    pub fn run(&self, inputs: &CohortInputs, method: ComputeMethod) -> FtpResult<FtpSchedule> {
        inputs.compute(method, &self.config)
    }

    /// Compute many portfolios with the same method, in parallel
    ///
    /// Results keep the order of `portfolios`; a failure in one portfolio
    /// does not affect the others.
    pub fn run_batch(
        &self,
        portfolios: &[CohortInputs],
        method: ComputeMethod,
    ) -> Vec<FtpResult<FtpSchedule>> {
        let results: Vec<_> = portfolios
            .par_iter()
            .map(|inputs| self.run(inputs, method))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "{} batch: {} portfolios, {} failed",
            method,
            portfolios.len(),
            failed
        );
        results
    }

    /// Compute one portfolio with every method, in parallel
    pub fn run_methods(&self, inputs: &CohortInputs) -> FtpResult<Vec<FtpSchedule>> {
        ComputeMethod::ALL
            .par_iter()
            .map(|&method| self.run(inputs, method))
            .collect()
    }

    /// Stock versus flux funding cost for one portfolio
    pub fn compare_methods(&self, inputs: &CohortInputs) -> FtpResult<MethodComparison> {
        let stock = self.run(inputs, ComputeMethod::Stock)?;
        let flux = self.run(inputs, ComputeMethod::Flux)?;
        Ok(MethodComparison::new(inputs.dims(), &stock, &flux))
    }
}

/// Funding cost of one portfolio under both methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub rows: usize,
    pub cols: usize,
    pub stock_interest_by_bucket: Vec<f64>,
    pub flux_interest_by_bucket: Vec<f64>,
    pub stock_total_interest: f64,
    pub flux_total_interest: f64,
    /// Largest absolute difference between the two `ftp_rate` matrices
    pub max_ftp_rate_gap: f64,
}

impl MethodComparison {
    fn new(dims: (usize, usize), stock: &FtpSchedule, flux: &FtpSchedule) -> Self {
        let stock_interest_by_bucket = stock.outputs.total_interest_by_bucket();
        let flux_interest_by_bucket = flux.outputs.total_interest_by_bucket();

        let max_ftp_rate_gap = stock
            .outputs
            .ftp_rate
            .iter()
            .zip(flux.outputs.ftp_rate.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);

        Self {
            rows: dims.0,
            cols: dims.1,
            stock_total_interest: stock_interest_by_bucket.iter().sum(),
            flux_total_interest: flux_interest_by_bucket.iter().sum(),
            stock_interest_by_bucket,
            flux_interest_by_bucket,
            max_ftp_rate_gap,
        }
    }
}

/// Sum `ftp_int` per bucket across schedules of possibly different widths
pub fn aggregate_interest_by_bucket(schedules: &[FtpSchedule]) -> Vec<f64> {
    let width = schedules
        .iter()
        .map(|s| s.outputs.ftp_int.ncols())
        .max()
        .unwrap_or(0);

    let mut totals = vec![0.0; width];
    for schedule in schedules {
        let by_bucket = schedule.outputs.total_interest_by_bucket();
        for (bucket, amount) in by_bucket.into_iter().enumerate() {
            totals[bucket] += amount;
        }
    }
    totals
}
