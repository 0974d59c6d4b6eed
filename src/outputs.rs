//! Output bundle of an FTP computation

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::decompose::Decomposition;
use crate::error::FtpError;
use crate::pricing::RateAssignment;

/// Names of the seven output matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMatrix {
    StockAmort,
    StockInstal,
    VarstockAmort,
    VarstockInstal,
    FtpRate,
    FtpInt,
    MarketRate,
}

impl OutputMatrix {
    pub const ALL: [OutputMatrix; 7] = [
        OutputMatrix::StockAmort,
        OutputMatrix::StockInstal,
        OutputMatrix::VarstockAmort,
        OutputMatrix::VarstockInstal,
        OutputMatrix::FtpRate,
        OutputMatrix::FtpInt,
        OutputMatrix::MarketRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMatrix::StockAmort => "stock_amort",
            OutputMatrix::StockInstal => "stock_instal",
            OutputMatrix::VarstockAmort => "varstock_amort",
            OutputMatrix::VarstockInstal => "varstock_instal",
            OutputMatrix::FtpRate => "ftp_rate",
            OutputMatrix::FtpInt => "ftp_int",
            OutputMatrix::MarketRate => "market_rate",
        }
    }
}

impl FromStr for OutputMatrix {
    type Err = FtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputMatrix::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FtpError::UnknownOutput(s.to_string()))
    }
}

impl fmt::Display for OutputMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven N x M matrices produced together by one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpOutputs {
    pub stock_amort: Array2<f64>,
    pub stock_instal: Array2<f64>,
    pub varstock_amort: Array2<f64>,
    pub varstock_instal: Array2<f64>,
    pub ftp_rate: Array2<f64>,
    pub ftp_int: Array2<f64>,
    pub market_rate: Array2<f64>,
}

impl FtpOutputs {
    pub(crate) fn assemble(decomposition: Decomposition, rates: RateAssignment) -> Self {
        Self {
            stock_amort: decomposition.stock_amort,
            stock_instal: decomposition.stock_instal,
            varstock_amort: decomposition.varstock_amort,
            varstock_instal: decomposition.varstock_instal,
            ftp_rate: rates.ftp_rate,
            ftp_int: rates.ftp_int,
            market_rate: rates.market_rate,
        }
    }

    /// Look up an output by name
    pub fn get(&self, kind: OutputMatrix) -> &Array2<f64> {
        match kind {
            OutputMatrix::StockAmort => &self.stock_amort,
            OutputMatrix::StockInstal => &self.stock_instal,
            OutputMatrix::VarstockAmort => &self.varstock_amort,
            OutputMatrix::VarstockInstal => &self.varstock_instal,
            OutputMatrix::FtpRate => &self.ftp_rate,
            OutputMatrix::FtpInt => &self.ftp_int,
            OutputMatrix::MarketRate => &self.market_rate,
        }
    }

    /// All outputs paired with their names, in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (OutputMatrix, &Array2<f64>)> {
        OutputMatrix::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Total funding cost per bucket across all cohorts
    pub fn total_interest_by_bucket(&self) -> Vec<f64> {
        self.ftp_int.columns().into_iter().map(|c| c.sum()).collect()
    }
}
