//! Cohort inputs and structural validation
//!
//! Holds the three input matrices of an FTP run:
//! - `outstanding`: N x 1, one balance per cohort
//! - `profiles`: N x M, fraction of balance still outstanding per time bucket
//! - `rates`: N x (M - 1), annualized market rate per period
//!
//! Only shapes are checked here. Profile and rate values are taken as given.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{FtpError, FtpResult};

/// Check that the three input shapes are consistent
///
/// Shapes are `(rows, cols)`. All inputs must have the same row count,
/// `outstanding` must be a single column and `profiles` must have exactly one
/// more column than `rates`.
pub fn check_dims(
    outstanding: (usize, usize),
    profiles: (usize, usize),
    rates: (usize, usize),
) -> FtpResult<()> {
    let (n, outstanding_cols) = outstanding;
    let (profile_rows, profile_cols) = profiles;
    let (rate_rows, rate_cols) = rates;

    if profile_rows != n {
        return Err(FtpError::DimensionMismatch {
            input: "profiles",
            expected_rows: n,
            expected_cols: profile_cols,
            rows: profile_rows,
            cols: profile_cols,
        });
    }
    if rate_rows != n {
        return Err(FtpError::DimensionMismatch {
            input: "rates",
            expected_rows: n,
            expected_cols: rate_cols,
            rows: rate_rows,
            cols: rate_cols,
        });
    }
    if outstanding_cols != 1 {
        return Err(FtpError::DimensionMismatch {
            input: "outstanding",
            expected_rows: n,
            expected_cols: 1,
            rows: n,
            cols: outstanding_cols,
        });
    }
    if profile_cols != rate_cols + 1 {
        return Err(FtpError::DimensionMismatch {
            input: "profiles",
            expected_rows: n,
            expected_cols: rate_cols + 1,
            rows: profile_rows,
            cols: profile_cols,
        });
    }

    Ok(())
}

/// The three input matrices of an FTP run
///
/// Construction does not validate; [`CohortInputs::check_dims`] runs at the
/// start of every computation so that a mismatch surfaces from `compute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortInputs {
    pub(crate) outstanding: Array2<f64>,
    pub(crate) profiles: Array2<f64>,
    pub(crate) rates: Array2<f64>,
}

impl CohortInputs {
    pub fn new(outstanding: Array2<f64>, profiles: Array2<f64>, rates: Array2<f64>) -> Self {
        Self {
            outstanding,
            profiles,
            rates,
        }
    }

    /// Build inputs from plain vectors, one balance and one row per cohort
    ///
    /// Fails with `DimensionMismatch` if any profile or rate row is ragged.
    pub fn from_rows(
        outstanding: &[f64],
        profiles: &[Vec<f64>],
        rates: &[Vec<f64>],
    ) -> FtpResult<Self> {
        let outstanding = Array2::from_shape_vec((outstanding.len(), 1), outstanding.to_vec())
            .map_err(|_| FtpError::DimensionMismatch {
                input: "outstanding",
                expected_rows: outstanding.len(),
                expected_cols: 1,
                rows: outstanding.len(),
                cols: 1,
            })?;

        Ok(Self {
            outstanding,
            profiles: rows_to_array("profiles", profiles)?,
            rates: rows_to_array("rates", rates)?,
        })
    }

    /// Validate the input shapes
    pub fn check_dims(&self) -> FtpResult<()> {
        check_dims(
            self.outstanding.dim(),
            self.profiles.dim(),
            self.rates.dim(),
        )
    }

    /// (N, M): cohort count and time-bucket count
    pub fn dims(&self) -> (usize, usize) {
        (self.outstanding.nrows(), self.profiles.ncols())
    }

    pub fn outstanding(&self) -> &Array2<f64> {
        &self.outstanding
    }

    pub fn profiles(&self) -> &Array2<f64> {
        &self.profiles
    }

    pub fn rates(&self) -> &Array2<f64> {
        &self.rates
    }

    /// Balance of cohort `i`
    pub(crate) fn balance(&self, i: usize) -> f64 {
        self.outstanding[[i, 0]]
    }
}

fn rows_to_array(input: &'static str, rows: &[Vec<f64>]) -> FtpResult<Array2<f64>> {
    let ncols = rows.first().map(Vec::len).unwrap_or(0);

    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(FtpError::DimensionMismatch {
            input,
            expected_rows: rows.len(),
            expected_cols: ncols,
            rows: rows.len(),
            cols: bad.len(),
        });
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat).map_err(|_| FtpError::DimensionMismatch {
        input,
        expected_rows: rows.len(),
        expected_cols: ncols,
        rows: rows.len(),
        cols: ncols,
    })
}
