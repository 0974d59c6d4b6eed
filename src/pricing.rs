//! Matched-maturity rate and interest assignment
//!
//! Runs after either decomposer. For each cohort/bucket cell:
//! - `market_rate`: the cohort's own period rate, shifted right one column so
//!   it lines up with the balance it applies to (column 0 has no period)
//! - `ftp_rate`: installment-weighted average of the market rates still to
//!   be paid down after the bucket
//! - `ftp_int`: the rate-weighted installments divided by the number of
//!   periods per year

use log::debug;
use ndarray::{s, Array2};

use crate::config::{EngineConfig, RateBlending};
use crate::decompose::Decomposition;

/// The three rate matrices of an FTP schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RateAssignment {
    pub ftp_rate: Array2<f64>,
    pub ftp_int: Array2<f64>,
    pub market_rate: Array2<f64>,
}

/// Assign rates using the configured blending policy
///
/// `rates` is N x (M - 1), already validated against the decomposition.
pub fn assign_rates(
    decomposition: &Decomposition,
    rates: &Array2<f64>,
    config: &EngineConfig,
) -> RateAssignment {
    debug!("assigning rates with {} blending", config.blending);
    match config.blending {
        RateBlending::OwnCurve => own_curve(
            &decomposition.varstock_instal,
            rates,
            config.periods_per_year,
        ),
        RateBlending::InheritedLayer => {
            inherited_layer(decomposition, rates, config.periods_per_year)
        }
    }
}

/// Market rate aligned with balance columns: column 0 is 0,
/// `market_rate[i,j] = rates[i,j-1]`
pub fn shifted_market_rate(rates: &Array2<f64>) -> Array2<f64> {
    let (n, periods) = rates.dim();
    let mut market_rate = Array2::zeros((n, periods + 1));
    market_rate.slice_mut(s![.., 1..]).assign(rates);
    market_rate
}

/// Baseline: each cohort's layer priced on its own curve
fn own_curve(
    varstock_instal: &Array2<f64>,
    rates: &Array2<f64>,
    periods_per_year: f64,
) -> RateAssignment {
    let (n, m) = varstock_instal.dim();
    let market_rate = shifted_market_rate(rates);
    let mut ftp_rate = Array2::zeros((n, m));
    let mut ftp_int = Array2::zeros((n, m));

    for i in 0..n {
        // Running sums over k > j, walking columns right to left
        let mut weighted = 0.0;
        let mut remaining = 0.0;
        for j in (0..m).rev() {
            ftp_rate[[i, j]] = if remaining != 0.0 {
                weighted / remaining
            } else {
                0.0
            };
            ftp_int[[i, j]] = weighted / periods_per_year;

            weighted += varstock_instal[[i, j]] * market_rate[[i, j]];
            remaining += varstock_instal[[i, j]];
        }
    }

    RateAssignment {
        ftp_rate,
        ftp_int,
        market_rate,
    }
}

/// Blend the prior cohort's total installments into each cell's average,
/// then back out a market rate per bucket that is consistent with the
/// blended FTP rate over the cohort's total installments.
///
/// Row 0 has no prior cohort and matches `own_curve`.
fn inherited_layer(
    d: &Decomposition,
    rates: &Array2<f64>,
    periods_per_year: f64,
) -> RateAssignment {
    let vi = &d.varstock_instal;
    let si = &d.stock_instal;
    let (n, m) = vi.dim();
    let mut ftp_rate = Array2::<f64>::zeros((n, m));
    let mut ftp_int = Array2::<f64>::zeros((n, m));
    let mut market_rate = Array2::<f64>::zeros((n, m));

    for i in 0..n {
        for j in (1..m).rev() {
            let col = j - 1;

            let mut weighted = 0.0;
            let mut remaining = 0.0;
            for k in col..m - 1 {
                weighted += vi[[i, k + 1]] * rates[[i, k]];
                remaining += vi[[i, k + 1]];
                // Prior cohort's layer still alive beyond the next bucket
                if i > 0 && k > col {
                    weighted += si[[i - 1, k + 1]] * market_rate[[i - 1, k + 1]];
                    remaining += si[[i - 1, k + 1]];
                }
            }
            ftp_rate[[i, col]] = if remaining != 0.0 {
                weighted / remaining
            } else {
                0.0
            };
            ftp_int[[i, col]] = weighted / periods_per_year;

            market_rate[[i, j]] = if j == m - 1 {
                rates[[i, j - 1]]
            } else {
                let instal = si[[i, j]];
                if instal != 0.0 {
                    let remaining_total: f64 = (j..m).map(|k| si[[i, k]]).sum();
                    let later: f64 = (j + 1..m).map(|k| si[[i, k]] * market_rate[[i, k]]).sum();
                    (ftp_rate[[i, j - 1]] * remaining_total - later) / instal
                } else {
                    0.0
                }
            };
        }
    }

    RateAssignment {
        ftp_rate,
        ftp_int,
        market_rate,
    }
}
