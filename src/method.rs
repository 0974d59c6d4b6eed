//! Decomposition method selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FtpError;

/// Method used to decompose cohort balances into layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMethod {
    /// Outstanding is the total stock at each cohort's origin
    Stock,
    /// Outstanding is an observed total; new production is inferred
    Flux,
}

impl ComputeMethod {
    pub const ALL: [ComputeMethod; 2] = [ComputeMethod::Stock, ComputeMethod::Flux];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeMethod::Stock => "stock",
            ComputeMethod::Flux => "flux",
        }
    }
}

impl FromStr for ComputeMethod {
    type Err = FtpError;

    /// Names are matched exactly: "stock" or "flux"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stock" => Ok(ComputeMethod::Stock),
            "flux" => Ok(ComputeMethod::Flux),
            other => Err(FtpError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for ComputeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
