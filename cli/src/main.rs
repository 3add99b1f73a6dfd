//! CLI entry point: train the loan approval classifier from a CSV dataset.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use loan_learning::{
    BinaryClassificationMetrics, FeaturePipelineSpec, LearningBackend, LearningError,
    LogisticRegressionBackend, ModelSchema, TrainingConfig,
};
use loan_processing::{
    DatasetPreview, Pipeline, PipelineConfig, PreparedDataset, PreprocessingError,
    PreprocessingSummary, load_csv,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Train the loan approval classifier",
    long_about = "Loads a loan dataset, cleans it, trains a logistic regression \
                  classifier, reports its accuracy on held-out rows and saves the model.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  LOAN_DATASET_PATH     Default input CSV path\n  \
                  LOAN_MODEL_PATH       Default model output path\n  \
                  RUST_LOG              Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  # Train with defaults (./data.csv -> ./model.json)\n  \
                  train-model\n\n  \
                  # Reproducible split, custom paths\n  \
                  train-model -i loans.csv -o models/loan.json --seed 42\n\n  \
                  # Preview the cleaned split without training\n  \
                  train-model -i loans.csv --dry-run"
)]
struct Args {
    /// Path to the CSV dataset
    #[arg(short, long, env = "LOAN_DATASET_PATH", default_value = "./data.csv")]
    input: PathBuf,

    /// Where to write the trained model
    #[arg(short, long, env = "LOAN_MODEL_PATH", default_value = "./model.json")]
    output: PathBuf,

    /// JSON file with preparation settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fraction of rows held out for evaluation (0.0 - 1.0)
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for the train/test shuffle
    ///
    /// Without a seed every run produces a different split
    #[arg(long)]
    seed: Option<u64>,

    /// Label column name
    #[arg(long)]
    label: Option<String>,

    /// Comma-separated list of relevant columns (must include the label)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Replacement for missing categorical values
    #[arg(long)]
    missing_value: Option<String>,

    /// Number of rows shown in each dataset preview
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Maximum number of optimizer iterations
    #[arg(long, default_value = "100")]
    max_iterations: u64,

    /// L2 regularization strength
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output a JSON run report to stdout instead of the console report
    ///
    /// Disables all logs so stdout carries only JSON.
    #[arg(long)]
    json: bool,

    /// Load, clean and split the dataset, print the previews, skip training
    #[arg(long)]
    dry_run: bool,
}

/// Machine-readable result of a run, printed with `--json`.
#[derive(Debug, Serialize)]
struct RunReport {
    input: String,
    model_path: Option<String>,
    preprocessing: PreprocessingSummary,
    metrics: Option<BinaryClassificationMetrics>,
    feature_count: Option<usize>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Console output, silenced in `--json` mode.
struct Console {
    enabled: bool,
}

impl Console {
    fn print(&self, text: impl std::fmt::Display) {
        if self.enabled {
            print!("{}", text);
        }
    }

    fn println(&self, text: impl std::fmt::Display) {
        if self.enabled {
            println!("{}", text);
        }
    }
}

fn main() -> ExitCode {
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = error_code(&e);
            error!("[{}] {:#}", code, e);
            if args.json {
                let failure = serde_json::json!({ "code": code, "message": format!("{:#}", e) });
                println!("{}", failure);
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Stable code of the library error behind `e`, if any.
fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(err) = e.downcast_ref::<PreprocessingError>() {
        err.error_code()
    } else if let Some(err) = e.downcast_ref::<LearningError>() {
        err.error_code()
    } else {
        "ERROR"
    }
}

fn run(args: &Args) -> Result<()> {
    let console = Console { enabled: !args.json };
    let config = build_config(args)?;

    // STEP 1: load
    console.print(format!("STEP 1: Reading data from {}...", args.input.display()));
    let data = load_csv(&args.input)?;
    console.println("Done!\n");
    info!("Dataset loaded: {} rows x {} columns", data.height(), data.width());

    // STEP 2: clean and split
    console.println("STEP 2: Data preprocessing...\n");
    let prepared = build_pipeline(args, config.clone())?.process(data)?;

    for column in &prepared.summary.dropped_columns {
        console.println(format!("Dropping column {}...", column));
    }
    for column in &prepared.summary.missing_columns {
        warn!("Relevant column '{}' is not in the dataset", column);
    }

    print_previews(&console, &prepared, config.preview_rows)?;

    let mut report = RunReport {
        input: args.input.display().to_string(),
        model_path: None,
        preprocessing: prepared.summary.clone(),
        metrics: None,
        feature_count: None,
    };

    if args.dry_run {
        console.println("\n\nDry run: skipping training");
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    // STEP 3: train, evaluate, save
    console.println("\n\nSTEP 3: Training the model...");
    let training = TrainingConfig::builder()
        .label_column(&prepared.label_column)
        .max_iterations(args.max_iterations)
        .alpha(args.alpha)
        .build()?;
    let backend = LogisticRegressionBackend::new(training)?;

    let spec = FeaturePipelineSpec::from_frame(&prepared.train, &prepared.label_column)?;
    let model = backend.fit(&spec, &prepared.train)?;
    let metrics = backend.evaluate(&model, &prepared.test, &prepared.label_column)?;

    console.print(format!(
        "\n\nModel trained with accuracy: {}\n\n",
        metrics.accuracy
    ));
    console.println(&metrics.confusion_matrix);

    report.feature_count = Some(model.pipeline().n_features());
    report.metrics = Some(metrics);

    console.print(format!("\nSaving model: {}...", args.output.display()));
    let schema = ModelSchema::from_frame(&prepared.cleaned, &prepared.label_column)?;
    backend
        .save(&model, &schema, &args.output)
        .context("Model was trained but could not be saved")?;
    console.println("Done!");

    report.model_path = Some(args.output.display().to_string());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply flag overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(columns) = &args.columns {
        config.relevant_columns = columns.iter().map(|c| c.trim().to_string()).collect();
    }
    if let Some(label) = &args.label {
        config.label_column = label.clone();
    }
    if let Some(value) = &args.missing_value {
        config.missing_value_replacement = value.clone();
    }
    if let Some(fraction) = args.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(rows) = args.preview_rows {
        config.preview_rows = rows;
    }

    config
        .validate()
        .map_err(PreprocessingError::from)
        .context("Invalid configuration")?;
    Ok(config)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

fn print_previews(console: &Console, prepared: &PreparedDataset, rows: usize) -> Result<()> {
    for table in [&prepared.train, &prepared.test] {
        let preview = DatasetPreview::from_frame(table, rows)?;
        console.print(format!("\n\n{}", preview));
    }
    Ok(())
}
