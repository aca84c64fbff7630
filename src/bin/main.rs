//! digitsvm Command Line Interface
//!
//! Runs the digit classification pipeline on CSV pixel tables and inspects
//! table statistics.

use clap::{Args, Parser, Subcommand, ValueEnum};
use digitsvm::core::Result;
use digitsvm::data::Table;
use digitsvm::pipeline::Pipeline;
use digitsvm::preprocessing::{separate_label, ZeroVariance};
use digitsvm::utils::stats::{describe, label_counts, round2};
use digitsvm::PipelineConfig;
use env_logger::Env;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "digitsvm")]
#[command(about = "Digit classification with a linear Support Vector Classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "digitsvm contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, standardize, split, fit and evaluate
    Run(RunArgs),
    /// Show the shape and column statistics of a CSV table
    Describe(DescribeArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Labeled training table
    #[arg(long, default_value = "input/train.csv")]
    train: PathBuf,

    /// Unlabeled test table
    #[arg(long, default_value = "input/test.csv")]
    test: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the label column
    #[arg(long)]
    label_column: Option<String>,

    /// Divisor applied to every pixel value
    #[arg(long)]
    divisor: Option<f64>,

    /// Split seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows used for training
    #[arg(long)]
    train_size: Option<f64>,

    /// Fraction of rows used for the holdout evaluation
    #[arg(long)]
    test_size: Option<f64>,

    /// Regularization parameter C
    #[arg(short = 'C', long)]
    c: Option<f64>,

    /// Convergence tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Maximum SMO iterations per class pair
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Kernel cache size in MB
    #[arg(long)]
    cache_size: Option<usize>,

    /// Treatment of zero-variance columns
    #[arg(long)]
    zero_variance: Option<CliZeroVariance>,

    /// Standardize the test table with the training statistics
    #[arg(long)]
    standardize_test: bool,

    /// Predict labels for the test table
    #[arg(long)]
    predict_test: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum CliZeroVariance {
    /// Keep the division by zero (NaN/inf values, fit fails)
    #[value(name = "propagate")]
    Propagate,
    /// Divide constant columns by 1
    #[value(name = "unit")]
    Unit,
}

impl From<CliZeroVariance> for ZeroVariance {
    fn from(cli_policy: CliZeroVariance) -> Self {
        match cli_policy {
            CliZeroVariance::Propagate => ZeroVariance::Propagate,
            CliZeroVariance::Unit => ZeroVariance::Unit,
        }
    }
}

#[derive(Args)]
struct DescribeArgs {
    /// CSV table with a header row
    file: PathBuf,

    /// Label column to summarize separately, if present
    #[arg(long, default_value = "label")]
    label_column: String,

    /// Number of columns to show
    #[arg(long, default_value = "10")]
    limit: usize,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Describe(args) => describe_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {path:?}");
            PipelineConfig::from_file(path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(label_column) = &args.label_column {
        config.label_column = label_column.clone();
    }
    if let Some(divisor) = args.divisor {
        config.divisor = divisor;
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
    }
    if let Some(train_size) = args.train_size {
        config.split.train_fraction = train_size;
    }
    if let Some(test_size) = args.test_size {
        config.split.test_fraction = test_size;
    }
    if let Some(c) = args.c {
        config.optimizer.c = c;
    }
    if let Some(tolerance) = args.tolerance {
        config.optimizer.epsilon = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.optimizer.max_iterations = max_iterations;
    }
    if let Some(cache_size) = args.cache_size {
        config.optimizer.cache_size = cache_size * 1024 * 1024; // Convert MB to bytes
    }
    if let Some(policy) = &args.zero_variance {
        config.zero_variance = policy.clone().into();
    }
    config.standardize_test |= args.standardize_test;
    config.predict_test |= args.predict_test;

    config.validate()?;
    Ok(config)
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    info!(
        "Parameters: C={}, tolerance={}, seed={}, train={}, test={}",
        config.optimizer.c,
        config.optimizer.epsilon,
        config.split.seed,
        config.split.train_fraction,
        config.split.test_fraction
    );

    let output = Pipeline::with_config(config).run(&args.train, &args.test)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output.write_report(&mut out)?;

    if let Some(predictions) = &output.test_predictions {
        writeln!(out, "# Format: row_index predicted_label")?;
        for (i, label) in predictions.iter().enumerate() {
            writeln!(out, "{i} {label}")?;
        }
    }

    Ok(())
}

fn describe_command(args: DescribeArgs) -> Result<()> {
    info!("Loading table from {:?}", args.file);
    let table = Table::from_path(&args.file)?;
    let (rows, columns) = table.shape();
    println!("Shape: ({rows}, {columns})");

    let (names, features, labels) = if table.column_index(&args.label_column).is_some() {
        let separated = separate_label(table, &args.label_column)?;
        (
            separated.feature_names,
            separated.features,
            Some(separated.labels),
        )
    } else {
        let (names, values) = table.into_parts();
        (names, values, None)
    };

    if let Some(labels) = labels {
        println!("Label counts:");
        for (label, count) in label_counts(&labels) {
            println!("  {label}: {count}");
        }
    }

    let stats = describe(features.view());
    println!(
        "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "max"
    );
    for (name, column) in names.iter().zip(&stats).take(args.limit) {
        println!(
            "{:<12} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            name,
            column.count,
            round2(column.mean),
            round2(column.std),
            column.min,
            column.max
        );
    }
    if stats.len() > args.limit {
        println!("  ... ({} more)", stats.len() - args.limit);
    }

    Ok(())
}
