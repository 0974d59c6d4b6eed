//! FTP Engine CLI
//!
//! Computes FTP schedules from a directory holding outstanding.csv,
//! profiles.csv and rates.csv.
//!
//! ```bash
//! ftp compute --input-dir data/ftp --method stock
//! ftp compute --input-dir data/ftp --method flux --format json
//! ftp compute --input-dir data/ftp --method flux --output-dir out/ --blending inherited-layer
//! ftp dims --input-dir data/ftp
//! ```

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use ftp_engine::loader::{self, DEFAULT_INPUT_PATH};
use ftp_engine::{EngineConfig, FtpCalculator, OutputMatrix, RateBlending};

/// Funds Transfer Pricing calculator
#[derive(Parser)]
#[command(name = "ftp", version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an FTP schedule
    Compute(ComputeArgs),
    /// Print (cohorts, buckets) of the inputs
    Dims(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Directory with outstanding.csv, profiles.csv and rates.csv
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input_dir: PathBuf,
}

#[derive(Args)]
struct ComputeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Decomposition method: stock or flux
    #[arg(short, long, default_value = "stock")]
    method: String,

    /// Rate blending policy (overrides FTP_RATE_BLENDING)
    #[arg(short, long)]
    blending: Option<String>,

    /// Print only this output matrix (e.g. ftp_rate)
    #[arg(long)]
    matrix: Option<String>,

    /// Also write every output matrix as CSV into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned columns
    Table,
    /// JSON
    Json,
    /// Header-less CSV rows
    Csv,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute(args) => compute(args, cli.format),
        Commands::Dims(args) => dims(args, cli.format),
    }
}

fn dims(args: InputArgs, format: OutputFormat) -> Result<()> {
    let inputs = loader::load_inputs(&args.input_dir)
        .with_context(|| format!("loading inputs from {}", args.input_dir.display()))?;
    let (rows, cols) = inputs.dims();

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "rows": rows, "cols": cols })),
        _ => println!("{} {}", rows, cols),
    }
    Ok(())
}

fn compute(args: ComputeArgs, format: OutputFormat) -> Result<()> {
    let start = Instant::now();

    let mut config = EngineConfig::from_env();
    if let Some(name) = &args.blending {
        config.blending = name.parse::<RateBlending>()?;
    }
    let selected = args
        .matrix
        .as_deref()
        .map(str::parse::<OutputMatrix>)
        .transpose()?;

    let inputs = loader::load_inputs(&args.input.input_dir)
        .with_context(|| format!("loading inputs from {}", args.input.input_dir.display()))?;

    let mut calculator = FtpCalculator::with_config(inputs, config);
    calculator.compute(&args.method)?;
    info!("{} in {:?}", calculator, start.elapsed());

    if let Some(dir) = &args.output_dir {
        let schedule = calculator.schedule()?;
        loader::write_outputs(dir, &schedule.outputs)
            .with_context(|| format!("writing outputs to {}", dir.display()))?;
    }

    match format {
        OutputFormat::Json => match selected {
            Some(kind) => println!("{}", serde_json::to_string(calculator.output(kind)?)?),
            None => {
                loader::write_schedule_json(io::stdout().lock(), calculator.schedule()?)?;
                println!();
            }
        },
        OutputFormat::Csv => {
            let kind = selected.unwrap_or(OutputMatrix::FtpRate);
            loader::write_matrix_csv(io::stdout().lock(), calculator.output(kind)?)?;
        }
        OutputFormat::Table => {
            println!("{}", calculator);
            let kinds: Vec<OutputMatrix> = match selected {
                Some(kind) => vec![kind],
                None => OutputMatrix::ALL.to_vec(),
            };
            for kind in kinds {
                print_table(kind, calculator.output(kind)?);
            }
        }
    }

    Ok(())
}

fn print_table(kind: OutputMatrix, matrix: &ndarray::Array2<f64>) {
    println!("\n{}:", kind);
    print!("{:>6}", "cohort");
    for j in 0..matrix.ncols() {
        print!(" {:>14}", format!("t{}", j));
    }
    println!();
    println!("{}", "-".repeat(6 + 15 * matrix.ncols()));

    for (i, row) in matrix.rows().into_iter().enumerate() {
        print!("{:>6}", i);
        for value in row {
            print!(" {:>14.6}", value);
        }
        println!();
    }
}
