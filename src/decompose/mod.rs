//! Balance decomposition into per-cohort layers
//!
//! Both methods produce the same four matrices: total balances
//! (`stock_amort`), the layer genuinely new to each cohort (`varstock_amort`),
//! and the installment (first difference) of each.

mod flux;
mod stock;

pub use flux::decompose_flux;
pub use stock::decompose_stock;

use ndarray::{s, Array2};

use crate::cohort::CohortInputs;
use crate::config::EngineConfig;
use crate::method::ComputeMethod;

/// Balance and installment matrices produced by a decomposer
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub stock_amort: Array2<f64>,
    pub stock_instal: Array2<f64>,
    pub varstock_amort: Array2<f64>,
    pub varstock_instal: Array2<f64>,
}

impl Decomposition {
    /// Derive both installment matrices from the two balance matrices
    pub(crate) fn from_balances(stock_amort: Array2<f64>, varstock_amort: Array2<f64>) -> Self {
        Self {
            stock_instal: installments(&stock_amort),
            varstock_instal: installments(&varstock_amort),
            stock_amort,
            varstock_amort,
        }
    }
}

/// Run the decomposer for `method`
///
/// Inputs must already have passed `check_dims`.
pub fn decompose(
    inputs: &CohortInputs,
    method: ComputeMethod,
    config: &EngineConfig,
) -> Decomposition {
    match method {
        ComputeMethod::Stock => decompose_stock(inputs),
        ComputeMethod::Flux => decompose_flux(inputs, config.floor_new_production),
    }
}

/// First difference along columns: `instal[i,0] = 0`,
/// `instal[i,j] = amort[i,j-1] - amort[i,j]`
pub fn installments(amort: &Array2<f64>) -> Array2<f64> {
    let mut instal = Array2::zeros(amort.raw_dim());
    if amort.ncols() > 1 {
        let diff = &amort.slice(s![.., ..-1]) - &amort.slice(s![.., 1..]);
        instal.slice_mut(s![.., 1..]).assign(&diff);
    }
    instal
}

/// Cell value, or 0 outside the matrix
pub(crate) fn cell_or_zero(matrix: &Array2<f64>, row: usize, col: usize) -> f64 {
    matrix.get([row, col]).copied().unwrap_or(0.0)
}
