//! Flux method
//!
//! `outstanding[i]` is the observed total at cohort i's time. New production
//! is what that total holds beyond the prior total's remainder one period
//! later; it decays along cohort i's own profile, and totals are rebuilt by
//! stacking each new layer on the remainder of the previous total.

use log::debug;
use ndarray::Array2;

use super::{cell_or_zero, Decomposition};
use crate::cohort::CohortInputs;

/// Decompose with the flux method
///
/// When `floor_new_production` is set, a cohort whose observed total is below
/// the inherited remainder gets zero new production instead of a negative one.
pub fn decompose_flux(inputs: &CohortInputs, floor_new_production: bool) -> Decomposition {
    let (n, m) = inputs.dims();
    let mut varstock_amort = Array2::<f64>::zeros((n, m));
    let mut stock_amort = Array2::<f64>::zeros((n, m));

    // Row i only needs row i-1 of stock_amort, so one forward pass suffices
    for i in 0..n {
        let inherited = if i == 0 {
            0.0
        } else {
            cell_or_zero(&stock_amort, i - 1, 1)
        };

        let mut new_production = inputs.balance(i) - inherited;
        if floor_new_production && new_production < 0.0 {
            debug!(
                "cohort {}: outstanding {} below inherited {}, new production floored at 0",
                i,
                inputs.balance(i),
                inherited
            );
            new_production = 0.0;
        }

        for j in 0..m {
            varstock_amort[[i, j]] = if j == 0 {
                new_production
            } else {
                new_production * inputs.profiles[[i, j]]
            };

            let carried = if i == 0 {
                0.0
            } else {
                cell_or_zero(&stock_amort, i - 1, j + 1)
            };
            stock_amort[[i, j]] = varstock_amort[[i, j]] + carried;
        }
    }

    debug!("flux decomposition complete: {} cohorts x {} buckets", n, m);
    Decomposition::from_balances(stock_amort, varstock_amort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_cohorts() -> CohortInputs {
        CohortInputs::new(
            array![[800.0], [900.0]],
            array![[1.00, 0.60, 0.30], [1.00, 0.60, 0.30]],
            array![[0.01200, 0.01300], [0.01250, 0.01350]],
        )
    }

    #[test]
    fn test_flux_first_row_matches_outstanding_times_profile() {
        let d = decompose_flux(&two_cohorts(), true);
        assert_eq!(d.varstock_amort.row(0).to_vec(), vec![800.0, 480.0, 240.0]);
        assert_eq!(d.stock_amort.row(0), d.varstock_amort.row(0));
    }

    #[test]
    fn test_flux_new_production_nets_inherited_remainder() {
        let d = decompose_flux(&two_cohorts(), true);
        assert_eq!(d.varstock_amort.row(1).to_vec(), vec![420.0, 252.0, 126.0]);
        assert_eq!(d.stock_amort.row(1).to_vec(), vec![900.0, 492.0, 126.0]);
    }

    #[test]
    fn test_flux_installments() {
        let d = decompose_flux(&two_cohorts(), true);
        assert_eq!(d.stock_instal[[0, 1]], 320.0);
        assert_eq!(d.stock_instal[[1, 1]], 408.0);
        assert_eq!(d.stock_instal[[1, 2]], 366.0);
        assert_eq!(d.varstock_instal.row(1).to_vec(), vec![0.0, 168.0, 126.0]);
    }

    #[test]
    fn test_flux_total_reconstructs_outstanding() {
        let d = decompose_flux(&two_cohorts(), true);
        assert_eq!(d.stock_amort[[0, 0]], 800.0);
        assert_eq!(d.stock_amort[[1, 0]], 900.0);
    }

    #[test]
    fn test_flux_negative_new_production_is_floored() {
        // 400 observed, but 480 survives from the first cohort
        let inputs = CohortInputs::new(
            array![[800.0], [400.0]],
            array![[1.00, 0.60, 0.30], [1.00, 0.60, 0.30]],
            array![[0.012, 0.013], [0.0125, 0.0135]],
        );

        let floored = decompose_flux(&inputs, true);
        assert_eq!(floored.varstock_amort.row(1).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(floored.stock_amort.row(1).to_vec(), vec![480.0, 240.0, 0.0]);

        let raw = decompose_flux(&inputs, false);
        assert_eq!(raw.varstock_amort[[1, 0]], -80.0);
        assert_eq!(raw.stock_amort[[1, 0]], 400.0);
    }
}
