//! Calculator facade
//!
//! Two layers:
//! - [`FtpSchedule`]: an immutable computed result, produced by a pure
//!   function of the inputs, the method and the engine config
//! - [`FtpCalculator`]: holds the inputs and a [`CalculatorState`] that moves
//!   from `Uninitialized` to `Computed` on a successful `compute`
//!
//! A failed `compute` never touches the stored state.

use std::fmt;

use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::cohort::CohortInputs;
use crate::config::EngineConfig;
use crate::decompose::decompose;
use crate::error::{FtpError, FtpResult};
use crate::method::ComputeMethod;
use crate::outputs::{FtpOutputs, OutputMatrix};
use crate::pricing::assign_rates;

/// A fully computed FTP schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpSchedule {
    pub method: ComputeMethod,
    pub config: EngineConfig,
    pub outputs: FtpOutputs,
}

impl FtpSchedule {
    /// Validate inputs, decompose with `method`, then assign rates
    pub fn compute(
        inputs: &CohortInputs,
        method: ComputeMethod,
        config: &EngineConfig,
    ) -> FtpResult<Self> {
        inputs.check_dims()?;

        let (n, m) = inputs.dims();
        debug!("computing {} schedule for {} cohorts x {} buckets", method, n, m);

        let decomposition = decompose(inputs, method, config);
        let rates = assign_rates(&decomposition, inputs.rates(), config);

        Ok(Self {
            method,
            config: config.clone(),
            outputs: FtpOutputs::assemble(decomposition, rates),
        })
    }

    pub fn get(&self, kind: OutputMatrix) -> &Array2<f64> {
        self.outputs.get(kind)
    }
}

impl CohortInputs {
    /// Compute a schedule from these inputs without any stored state
    pub fn compute(&self, method: ComputeMethod, config: &EngineConfig) -> FtpResult<FtpSchedule> {
        FtpSchedule::compute(self, method, config)
    }
}

/// Computation state of a calculator
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CalculatorState {
    #[default]
    Uninitialized,
    Computed(FtpSchedule),
}

/// Computed-state report for a calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorSummary {
    pub rows: usize,
    pub cols: usize,
    pub computed: bool,
    pub method: Option<ComputeMethod>,
}

impl fmt::Display for CalculatorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FtpCalculator(rows={}, cols={}, computed={}",
            self.rows, self.cols, self.computed
        )?;
        if let Some(method) = self.method {
            write!(f, ", method={}", method)?;
        }
        write!(f, ")")
    }
}

/// FTP calculator holding immutable inputs and the last computed schedule
///
/// # Example
/// ```
/// use ftp_engine::FtpCalculator;
/// use ndarray::array;
///
/// let mut calc = FtpCalculator::new(
///     array![[1000.0]],
///     array![[1.0, 0.5, 0.2]],
///     array![[0.01, 0.02]],
/// );
/// assert!(calc.stock_amort().is_err());
/// calc.compute("stock").unwrap();
/// assert_eq!(calc.stock_amort().unwrap()[[0, 1]], 500.0);
/// ```
#[derive(Debug, Clone)]
pub struct FtpCalculator {
    inputs: CohortInputs,
    config: EngineConfig,
    state: CalculatorState,
}

impl FtpCalculator {
    /// Create a calculator with the default engine config
    pub fn new(outstanding: Array2<f64>, profiles: Array2<f64>, rates: Array2<f64>) -> Self {
        Self::from_inputs(CohortInputs::new(outstanding, profiles, rates))
    }

    pub fn from_inputs(inputs: CohortInputs) -> Self {
        Self::with_config(inputs, EngineConfig::default())
    }

    pub fn with_config(inputs: CohortInputs, config: EngineConfig) -> Self {
        Self {
            inputs,
            config,
            state: CalculatorState::Uninitialized,
        }
    }

    /// Run the computation for a method named "stock" or "flux"
    pub fn compute(&mut self, method: &str) -> FtpResult<()> {
        let method: ComputeMethod = method.parse()?;
        self.compute_with(method)
    }

    /// Run the computation for a typed method
    pub fn compute_with(&mut self, method: ComputeMethod) -> FtpResult<()> {
        let schedule = FtpSchedule::compute(&self.inputs, method, &self.config)?;
        let (n, m) = self.inputs.dims();
        info!("{} schedule computed ({} x {})", method, n, m);
        self.state = CalculatorState::Computed(schedule);
        Ok(())
    }

    /// (N, M), available in any state
    pub fn dims(&self) -> (usize, usize) {
        self.inputs.dims()
    }

    pub fn inputs(&self) -> &CohortInputs {
        &self.inputs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.state, CalculatorState::Computed(_))
    }

    /// Method of the stored schedule, if any
    pub fn method(&self) -> Option<ComputeMethod> {
        match &self.state {
            CalculatorState::Computed(schedule) => Some(schedule.method),
            CalculatorState::Uninitialized => None,
        }
    }

    pub fn schedule(&self) -> FtpResult<&FtpSchedule> {
        match &self.state {
            CalculatorState::Computed(schedule) => Ok(schedule),
            CalculatorState::Uninitialized => Err(FtpError::NotComputed("schedule")),
        }
    }

    /// Consume the calculator, keeping the computed schedule
    pub fn into_schedule(self) -> FtpResult<FtpSchedule> {
        match self.state {
            CalculatorState::Computed(schedule) => Ok(schedule),
            CalculatorState::Uninitialized => Err(FtpError::NotComputed("schedule")),
        }
    }

    /// Read an output matrix by name
    pub fn output(&self, kind: OutputMatrix) -> FtpResult<&Array2<f64>> {
        match &self.state {
            CalculatorState::Computed(schedule) => Ok(schedule.get(kind)),
            CalculatorState::Uninitialized => Err(FtpError::NotComputed(kind.as_str())),
        }
    }

    pub fn stock_amort(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::StockAmort)
    }

    pub fn stock_instal(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::StockInstal)
    }

    pub fn varstock_amort(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::VarstockAmort)
    }

    pub fn varstock_instal(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::VarstockInstal)
    }

    pub fn ftp_rate(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::FtpRate)
    }

    pub fn ftp_int(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::FtpInt)
    }

    pub fn market_rate(&self) -> FtpResult<&Array2<f64>> {
        self.output(OutputMatrix::MarketRate)
    }

    pub fn summary(&self) -> CalculatorSummary {
        let (rows, cols) = self.dims();
        CalculatorSummary {
            rows,
            cols,
            computed: self.is_computed(),
            method: self.method(),
        }
    }
}

impl fmt::Display for FtpCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateBlending;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn stock_calculator() -> FtpCalculator {
        FtpCalculator::new(
            array![[1000.0], [1200.0], [1350.0]],
            array![
                [1.00, 0.50, 0.20, 0.05],
                [1.00, 0.50, 0.20, 0.05],
                [1.00, 0.50, 0.20, 0.05]
            ],
            array![
                [0.01300, 0.01400, 0.01600],
                [0.01360, 0.01460, 0.01660],
                [0.01430, 0.01530, 0.01730]
            ],
        )
    }

    fn flux_calculator() -> FtpCalculator {
        FtpCalculator::new(
            array![[800.0], [900.0]],
            array![[1.00, 0.60, 0.30], [1.00, 0.60, 0.30]],
            array![[0.01200, 0.01300], [0.01250, 0.01350]],
        )
    }

    #[test]
    fn test_compute_stock_method() {
        let mut calc = stock_calculator();
        calc.compute("stock").unwrap();

        let stock_amort = calc.stock_amort().unwrap();
        assert_eq!(stock_amort.dim(), (3, 4));
        assert_eq!(stock_amort.row(0).to_vec(), vec![1000.0, 500.0, 200.0, 50.0]);
        assert_eq!(stock_amort[[2, 3]], 67.5);

        let stock_instal = calc.stock_instal().unwrap();
        assert_eq!(stock_instal.row(0).to_vec(), vec![0.0, 500.0, 300.0, 150.0]);

        let varstock_amort = calc.varstock_amort().unwrap();
        assert_eq!(varstock_amort[[1, 0]], 700.0);
        assert_eq!(varstock_amort[[1, 1]], 400.0);
        assert_eq!(varstock_amort[[2, 0]], 750.0);

        let ftp_rate = calc.ftp_rate().unwrap();
        assert_abs_diff_eq!(ftp_rate[[0, 0]], 0.0137894737, epsilon = 1e-8);
        assert_abs_diff_eq!(ftp_rate[[0, 1]], 0.0146666667, epsilon = 1e-8);
        assert_abs_diff_eq!(ftp_rate[[0, 2]], 0.016, epsilon = 1e-10);
        assert_eq!(ftp_rate[[0, 3]], 0.0);

        let ftp_int = calc.ftp_int().unwrap();
        assert_abs_diff_eq!(ftp_int[[0, 0]], 1.0916666667, epsilon = 1e-8);
        assert_abs_diff_eq!(ftp_int[[0, 1]], 0.55, epsilon = 1e-10);

        let market_rate = calc.market_rate().unwrap();
        assert_eq!(market_rate[[0, 0]], 0.0);
        assert_abs_diff_eq!(market_rate[[0, 1]], 0.013, epsilon = 1e-10);
        assert_abs_diff_eq!(market_rate[[0, 3]], 0.016, epsilon = 1e-10);
    }

    #[test]
    fn test_compute_flux_method() {
        let mut calc = flux_calculator();
        calc.compute("flux").unwrap();

        let varstock_amort = calc.varstock_amort().unwrap();
        assert_eq!(varstock_amort.dim(), (2, 3));
        assert_eq!(varstock_amort.row(0).to_vec(), vec![800.0, 480.0, 240.0]);
        assert_eq!(varstock_amort.row(1).to_vec(), vec![420.0, 252.0, 126.0]);

        let stock_amort = calc.stock_amort().unwrap();
        assert_eq!(stock_amort.row(1).to_vec(), vec![900.0, 492.0, 126.0]);

        let market_rate = calc.market_rate().unwrap();
        assert_abs_diff_eq!(market_rate[[0, 1]], 0.012, epsilon = 1e-10);
        assert_abs_diff_eq!(market_rate[[0, 2]], 0.013, epsilon = 1e-10);
    }

    #[test]
    fn test_default_flux_keeps_negative_new_production() {
        // 400 observed, but 480 survives from the first cohort
        let mut calc = FtpCalculator::new(
            array![[800.0], [400.0]],
            array![[1.00, 0.60, 0.30], [1.00, 0.60, 0.30]],
            array![[0.01200, 0.01300], [0.01250, 0.01350]],
        );
        calc.compute("flux").unwrap();

        assert_eq!(calc.varstock_amort().unwrap()[[1, 0]], -80.0);
        assert_eq!(calc.stock_amort().unwrap()[[1, 0]], 400.0);

        let floored = EngineConfig {
            floor_new_production: true,
            ..EngineConfig::default()
        };
        let mut calc = FtpCalculator::with_config(calc.inputs().clone(), floored);
        calc.compute("flux").unwrap();
        assert_eq!(calc.varstock_amort().unwrap()[[1, 0]], 0.0);
        assert_eq!(calc.stock_amort().unwrap()[[1, 0]], 480.0);
    }

    #[test]
    fn test_general_invariants_hold_for_both_methods() {
        for (mut calc, method) in [(stock_calculator(), "stock"), (flux_calculator(), "flux")] {
            calc.compute(method).unwrap();
            let (n, m) = calc.dims();
            let sa = calc.stock_amort().unwrap();
            let si = calc.stock_instal().unwrap();
            let vi = calc.varstock_instal().unwrap();
            let fr = calc.ftp_rate().unwrap();
            let fi = calc.ftp_int().unwrap();
            let mr = calc.market_rate().unwrap();

            for i in 0..n {
                assert_eq!(si[[i, 0]], 0.0);
                assert_eq!(vi[[i, 0]], 0.0);
                assert_eq!(mr[[i, 0]], 0.0);
                assert_eq!(fr[[i, m - 1]], 0.0);
                assert_eq!(fi[[i, m - 1]], 0.0);

                let repaid: f64 = (1..m).map(|j| si[[i, j]]).sum();
                assert_abs_diff_eq!(repaid + sa[[i, m - 1]], sa[[i, 0]], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_accessors_fail_before_compute() {
        let calc = stock_calculator();
        assert_eq!(calc.stock_amort(), Err(FtpError::NotComputed("stock_amort")));
        assert!(calc.stock_instal().is_err());
        assert!(calc.varstock_amort().is_err());
        assert!(calc.varstock_instal().is_err());
        assert!(calc.ftp_rate().is_err());
        assert!(calc.ftp_int().is_err());
        assert!(calc.market_rate().is_err());
        assert!(calc.schedule().is_err());
    }

    #[test]
    fn test_dims_available_before_and_after_compute() {
        let mut calc = stock_calculator();
        assert_eq!(calc.dims(), (3, 4));
        calc.compute("stock").unwrap();
        assert_eq!(calc.dims(), (3, 4));
    }

    #[test]
    fn test_unknown_method() {
        let mut calc = stock_calculator();
        let err = calc.compute("invalid").unwrap_err();
        assert_eq!(err, FtpError::UnknownMethod("invalid".to_string()));
        assert!(!calc.is_computed());
    }

    #[test]
    fn test_unknown_method_checked_before_dimensions() {
        let mut calc = FtpCalculator::new(
            array![[1000.0], [1200.0]],
            array![[1.00, 0.50]],
            array![[0.01300]],
        );
        assert!(matches!(calc.compute("invalid"), Err(FtpError::UnknownMethod(_))));
    }

    #[test]
    fn test_dimension_mismatch_leaves_calculator_uninitialized() {
        let mut calc = FtpCalculator::new(
            array![[1000.0], [1200.0]],
            array![[1.00, 0.50]],
            array![[0.01300]],
        );
        let err = calc.compute("stock").unwrap_err();
        assert!(matches!(err, FtpError::DimensionMismatch { .. }));
        assert!(!calc.is_computed());
        assert!(calc.stock_amort().is_err());
        assert_eq!(calc.dims(), (2, 2));
    }

    #[test]
    fn test_failed_recompute_keeps_previous_schedule() {
        let mut calc = stock_calculator();
        calc.compute("stock").unwrap();
        assert!(calc.compute("bogus").is_err());
        assert_eq!(calc.method(), Some(ComputeMethod::Stock));
        assert!(calc.stock_amort().is_ok());
    }

    #[test]
    fn test_recompute_replaces_schedule() {
        let mut calc = flux_calculator();
        calc.compute("stock").unwrap();
        let stock_va = calc.varstock_amort().unwrap()[[1, 0]];
        calc.compute("flux").unwrap();
        assert_eq!(calc.method(), Some(ComputeMethod::Flux));
        // Same new layer for cohort 1 either way; only the rebuilt totals differ
        assert_eq!(stock_va, 420.0);
        assert_eq!(calc.stock_amort().unwrap()[[1, 1]], 492.0);
    }

    #[test]
    fn test_summary_reports_state() {
        let mut calc = stock_calculator();
        assert!(calc.to_string().to_lowercase().contains("computed=false"));
        calc.compute("stock").unwrap();
        let text = calc.to_string();
        assert_eq!(text, "FtpCalculator(rows=3, cols=4, computed=true, method=stock)");
        assert_eq!(calc.summary().method, Some(ComputeMethod::Stock));
    }

    #[test]
    fn test_inherited_layer_config_reaches_schedule() {
        let inputs = stock_calculator().inputs().clone();
        let config = EngineConfig::default().with_blending(RateBlending::InheritedLayer);
        let mut calc = FtpCalculator::with_config(inputs, config);
        calc.compute("stock").unwrap();
        assert_abs_diff_eq!(calc.ftp_int().unwrap()[[1, 0]], 1.3253333333, epsilon = 1e-8);
        assert_eq!(calc.schedule().unwrap().config.blending, RateBlending::InheritedLayer);
    }

    #[test]
    fn test_pure_compute_matches_facade() {
        let mut calc = flux_calculator();
        calc.compute_with(ComputeMethod::Flux).unwrap();
        let schedule = calc
            .inputs()
            .compute(ComputeMethod::Flux, &EngineConfig::default())
            .unwrap();
        assert_eq!(calc.schedule().unwrap(), &schedule);
        assert_eq!(calc.into_schedule().unwrap(), schedule);
    }
}
