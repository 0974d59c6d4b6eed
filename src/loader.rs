//! CSV loading of FTP inputs and writing of output matrices
//!
//! Matrix files are header-less, comma separated, one row per cohort.
//! Lines starting with `#` are ignored.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

use crate::calculator::FtpSchedule;
use crate::cohort::CohortInputs;
use crate::error::LoadError;
use crate::outputs::FtpOutputs;

/// Default directory holding the three input files
pub const DEFAULT_INPUT_PATH: &str = "data/ftp";

pub const OUTSTANDING_FILE: &str = "outstanding.csv";
pub const PROFILES_FILE: &str = "profiles.csv";
pub const RATES_FILE: &str = "rates.csv";

/// Read a numeric matrix from any reader
pub fn load_matrix_from_reader<R: Read>(reader: R) -> Result<Array2<f64>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut values = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0;

    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let expected = *ncols.get_or_insert(record.len());
        if record.len() != expected {
            return Err(LoadError::Ragged {
                row,
                expected,
                got: record.len(),
            });
        }

        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| LoadError::Parse {
                value: field.to_string(),
                row,
                col,
            })?;
            values.push(value);
        }
        nrows += 1;
    }

    let ncols = ncols.unwrap_or(0);
    Array2::from_shape_vec((nrows, ncols), values).map_err(|_| LoadError::Ragged {
        row: nrows,
        expected: ncols,
        got: 0,
    })
}

/// Read a numeric matrix from a CSV file
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<Array2<f64>, LoadError> {
    let path = path.as_ref();
    let matrix = load_matrix_from_reader(File::open(path)?)?;
    debug!("loaded {} ({}x{})", path.display(), matrix.nrows(), matrix.ncols());
    Ok(matrix)
}

/// Load outstanding, profiles and rates from a directory
///
/// Shapes are not checked here; that happens when the inputs are computed.
pub fn load_inputs<P: AsRef<Path>>(dir: P) -> Result<CohortInputs, LoadError> {
    let dir = dir.as_ref();
    let inputs = CohortInputs::new(
        load_matrix(dir.join(OUTSTANDING_FILE))?,
        load_matrix(dir.join(PROFILES_FILE))?,
        load_matrix(dir.join(RATES_FILE))?,
    );
    info!("loaded inputs from {}", dir.display());
    Ok(inputs)
}

/// Load inputs from the default `data/ftp` location
pub fn load_default_inputs() -> Result<CohortInputs, LoadError> {
    load_inputs(DEFAULT_INPUT_PATH)
}

/// Write a matrix as header-less CSV rows
pub fn write_matrix_csv<W: Write>(writer: W, matrix: &Array2<f64>) -> Result<(), LoadError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in matrix.rows() {
        csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write every output matrix to `<dir>/<name>.csv`
pub fn write_outputs<P: AsRef<Path>>(dir: P, outputs: &FtpOutputs) -> Result<(), LoadError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    for (kind, matrix) in outputs.iter() {
        let path = dir.join(format!("{}.csv", kind));
        write_matrix_csv(File::create(&path)?, matrix)?;
        debug!("wrote {}", path.display());
    }

    info!("wrote {} output matrices to {}", outputs.iter().count(), dir.display());
    Ok(())
}

/// Write a schedule as pretty-printed JSON
pub fn write_schedule_json<W: Write>(writer: W, schedule: &FtpSchedule) -> Result<(), LoadError> {
    serde_json::to_writer_pretty(writer, schedule)?;
    Ok(())
}
