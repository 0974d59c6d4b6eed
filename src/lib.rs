//! FTP Engine - Funds Transfer Pricing for loan and deposit cohorts
//!
//! This library provides:
//! - Stock and flux decomposition of cohort balances into incremental layers
//! - Matched-maturity FTP rate, interest and market rate assignment
//! - A calculator facade with explicit computed/uncomputed state
//! - CSV loading, JSON/CSV output and parallel batch runs

pub mod batch;
pub mod calculator;
pub mod cohort;
pub mod config;
pub mod decompose;
pub mod error;
pub mod loader;
pub mod method;
pub mod outputs;
pub mod pricing;

// Re-export commonly used types
pub use batch::{BatchRunner, MethodComparison};
pub use calculator::{CalculatorState, CalculatorSummary, FtpCalculator, FtpSchedule};
pub use cohort::CohortInputs;
pub use config::{EngineConfig, RateBlending};
pub use error::{FtpError, FtpResult, LoadError};
pub use method::ComputeMethod;
pub use outputs::{FtpOutputs, OutputMatrix};
