//! Compare stock and flux funding cost across portfolio directories
//!
//! Usage: cargo run --bin compare_methods -- data/ftp/retail data/ftp/corporate
//!
//! Each directory holds outstanding.csv, profiles.csv and rates.csv. With no
//! arguments the default data/ftp inputs are used.
//! Prints one JSON object per directory, keyed by path.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};

use ftp_engine::loader::{self, DEFAULT_INPUT_PATH};
use ftp_engine::{BatchRunner, CohortInputs};

fn main() -> Result<()> {
    env_logger::init();

    let dirs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    let portfolios: Vec<(String, Result<CohortInputs>)> = if dirs.is_empty() {
        let inputs = loader::load_default_inputs()
            .with_context(|| format!("loading inputs from {}", DEFAULT_INPUT_PATH));
        vec![(DEFAULT_INPUT_PATH.to_string(), inputs)]
    } else {
        dirs.iter()
            .map(|dir| {
                let inputs = loader::load_inputs(dir)
                    .with_context(|| format!("loading inputs from {}", dir.display()));
                (dir.display().to_string(), inputs)
            })
            .collect()
    };

    let runner = BatchRunner::from_env();
    info!("comparing {} portfolios with {:?}", portfolios.len(), runner.config());

    let results: Vec<(String, Result<Value>)> = portfolios
        .into_par_iter()
        .map(|(name, inputs)| {
            let result = inputs
                .and_then(|inputs| Ok(runner.compare_methods(&inputs)?))
                .and_then(|comparison| Ok(serde_json::to_value(comparison)?));
            (name, result)
        })
        .collect();

    let mut report = Map::new();
    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(value) => {
                report.insert(name, value);
            }
            Err(e) => {
                warn!("{}: {:#}", name, e);
                failed += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(report))?);

    if failed > 0 {
        bail!("{} portfolio(s) failed", failed);
    }
    Ok(())
}
