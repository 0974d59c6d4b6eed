//! Engine configuration
//!
//! Defaults reproduce the baseline FTP conventions. Each option can be
//! overridden from the environment:
//!   FTP_RATE_BLENDING         own-curve | inherited-layer
//!   FTP_PERIODS_PER_YEAR      divisor turning annual rates into period interest (default 12)
//!   FTP_FLOOR_NEW_PRODUCTION  1/true to floor negative flux new production at zero

use std::env;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::FtpError;

/// Default number of interest periods per year (monthly accrual)
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 12.0;

/// How a cell's funding rate treats balance inherited from the prior cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateBlending {
    /// Each cohort is priced on its own rate curve only
    #[default]
    OwnCurve,
    /// Prior cohort's installments, at the prior cohort's market rate, are
    /// blended into the weighted average; market rates are then backed out
    /// of the blended FTP rate
    InheritedLayer,
}

impl RateBlending {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateBlending::OwnCurve => "own-curve",
            RateBlending::InheritedLayer => "inherited-layer",
        }
    }
}

impl FromStr for RateBlending {
    type Err = FtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "own-curve" => Ok(RateBlending::OwnCurve),
            "inherited-layer" => Ok(RateBlending::InheritedLayer),
            other => Err(FtpError::UnknownBlending(other.to_string())),
        }
    }
}

impl fmt::Display for RateBlending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a computation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rate blending policy for cells funded by more than one layer
    pub blending: RateBlending,

    /// Divisor applied to rate-weighted installments in `ftp_int`
    pub periods_per_year: f64,

    /// Floor flux new production at zero when the inherited remainder
    /// exceeds the observed outstanding. Off by default, so that
    /// `stock_amort[i,0]` always rebuilds `outstanding[i]`.
    pub floor_new_production: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blending: RateBlending::OwnCurve,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            floor_new_production: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any `FTP_*` environment variables that parse
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by any values `lookup` returns for the `FTP_*` keys
    ///
    /// Unparseable values fall back to the default. A non-positive
    /// `FTP_PERIODS_PER_YEAR` is ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let blending = match lookup("FTP_RATE_BLENDING") {
            Some(s) => s.parse().unwrap_or_else(|e| {
                warn!("{}; using {}", e, defaults.blending);
                defaults.blending
            }),
            None => defaults.blending,
        };

        let periods_per_year = lookup("FTP_PERIODS_PER_YEAR")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|p| *p > 0.0)
            .unwrap_or(defaults.periods_per_year);

        let floor_new_production = lookup("FTP_FLOOR_NEW_PRODUCTION")
            .map(|s| parse_flag(&s))
            .unwrap_or(defaults.floor_new_production);

        Self {
            blending,
            periods_per_year,
            floor_new_production,
        }
    }

    pub fn with_blending(mut self, blending: RateBlending) -> Self {
        self.blending = blending;
        self
    }
}

fn parse_flag(s: &str) -> bool {
    !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
