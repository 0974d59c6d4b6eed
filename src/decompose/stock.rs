//! Stock method
//!
//! `outstanding[i]` is the total balance of cohort i at its own origin,
//! amortizing along its own profile row. The layer new to cohort i is that
//! total net of what remains alive one period later from cohort i-1.

use log::debug;
use ndarray::Array2;

use super::{cell_or_zero, Decomposition};
use crate::cohort::CohortInputs;

pub fn decompose_stock(inputs: &CohortInputs) -> Decomposition {
    let (n, m) = inputs.dims();

    // stock_amort[i,j] = outstanding[i] * profile[i,j]
    let stock_amort = &inputs.outstanding * &inputs.profiles;

    // varstock_amort[i,j] = stock_amort[i,j] - stock_amort[i-1,j+1]
    let mut varstock_amort = Array2::<f64>::zeros((n, m));
    for i in 0..n {
        for j in 0..m {
            let inherited = if i == 0 {
                0.0
            } else {
                cell_or_zero(&stock_amort, i - 1, j + 1)
            };
            varstock_amort[[i, j]] = stock_amort[[i, j]] - inherited;
        }
    }

    debug!("stock decomposition complete: {} cohorts x {} buckets", n, m);
    Decomposition::from_balances(stock_amort, varstock_amort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_cohorts() -> CohortInputs {
        CohortInputs::new(
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

    #[test]
    fn test_stock_amort_is_outstanding_times_profile() {
        let d = decompose_stock(&three_cohorts());
        assert_eq!(d.stock_amort.row(0).to_vec(), vec![1000.0, 500.0, 200.0, 50.0]);
        assert_eq!(d.stock_amort[[1, 0]], 1200.0);
        assert_eq!(d.stock_amort[[2, 3]], 67.5);
    }

    #[test]
    fn test_stock_instal_is_diff_of_adjacent() {
        let d = decompose_stock(&three_cohorts());
        assert_eq!(d.stock_instal.row(0).to_vec(), vec![0.0, 500.0, 300.0, 150.0]);
    }

    #[test]
    fn test_varstock_layers() {
        let d = decompose_stock(&three_cohorts());
        // First cohort has nothing to inherit
        assert_eq!(d.varstock_amort.row(0), d.stock_amort.row(0));
        assert_eq!(d.varstock_amort[[1, 0]], 700.0);
        assert_eq!(d.varstock_amort[[1, 1]], 400.0);
        assert_eq!(d.varstock_amort[[2, 0]], 750.0);
        // Last column has no j+1 neighbour to net out
        assert_eq!(d.varstock_amort[[1, 3]], d.stock_amort[[1, 3]]);
    }

    #[test]
    fn test_varstock_instal() {
        let d = decompose_stock(&three_cohorts());
        assert_eq!(d.varstock_instal[[1, 0]], 0.0);
        assert_eq!(d.varstock_instal[[1, 1]], 300.0);
        assert_eq!(d.varstock_instal[[1, 2]], 210.0);
    }

    #[test]
    fn test_single_bucket_profile() {
        let inputs = CohortInputs::new(
            array![[100.0], [50.0]],
            array![[1.0], [1.0]],
            Array2::zeros((2, 0)),
        );
        let d = decompose_stock(&inputs);
        assert_eq!(d.varstock_amort, array![[100.0], [50.0]]);
        assert_eq!(d.stock_instal, array![[0.0], [0.0]]);
    }
}
