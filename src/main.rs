use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use rusty_cleaner::config::load_config;
use rusty_cleaner::config::ConfigOverrides;
use rusty_cleaner::Command;
use rusty_cleaner::FillMethod;
use rusty_cleaner::Metrics;
use rusty_cleaner::Session;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

/// Cleaning step as named on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Step {
    /// Drop every row that has a missing value
    RemoveMissing,
    /// Fill missing numeric cells with the column mean
    FillMean,
    /// Fill missing numeric cells with the column median
    FillMedian,
    /// Fill missing cells with the most frequent value of the column
    FillMode,
    /// Drop rows identical to an earlier row
    RemoveDuplicates,
}

impl From<Step> for Command {
    fn from(step: Step) -> Self {
        match step {
            Step::RemoveMissing => Command::RemoveMissing,
            Step::FillMean => Command::FillMissing(FillMethod::Mean),
            Step::FillMedian => Command::FillMissing(FillMethod::Median),
            Step::FillMode => Command::FillMissing(FillMethod::Mode),
            Step::RemoveDuplicates => Command::RemoveDuplicates,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Inspect and clean CSV or Excel data",
    long_about = "Loads a CSV or .xlsx file, reports its quality metrics, applies the \
                  requested cleaning steps in order and writes the result as CSV.\n\n\
                  EXAMPLES:\n  \
                  rusty_cleaner data.csv --step remove-duplicates --step fill-mean\n  \
                  rusty_cleaner sales.xlsx --step remove-missing -o clean.csv --json"
)]
struct Args {
    /// CSV or .xlsx file to clean
    file: PathBuf,

    /// Cleaning step, may be repeated
    #[arg(short, long = "step", value_enum)]
    steps: Vec<Step>,

    /// Where to write the cleaned CSV [default: cleaned_data.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of rows to preview [default: 5]
    #[arg(short, long)]
    preview: Option<usize>,

    /// Print a JSON report instead of text; disables logging
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error) [default: info]
    #[arg(short, long)]
    log_level: Option<String>,

    /// Configuration file [default: rusty_cleaner.toml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    file: &'a Path,
    before: Metrics,
    steps: Vec<Command>,
    after: Metrics,
    output: &'a Path,
}

fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // stdout carries the JSON report alone
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        preview_rows: args.preview,
        output: args.output.clone(),
        log_level: args.log_level.clone(),
    };
    let config = load_config(args.config.as_deref(), &overrides).context("Failed to load configuration")?;
    init_logging(&config.log_level, args.quiet, args.json);

    let bytes = std::fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut session = Session::with_options(config.ingest_options());
    session.load(&bytes, &file_name)?;
    let before = session.metrics()?;
    if !args.json {
        print_overview("UPLOADED DATA", &before, &session, config.preview_rows)?;
    }

    let mut steps = Vec::with_capacity(args.steps.len());
    for step in &args.steps {
        let command = Command::from(*step);
        session.apply(command)?;
        if !args.json {
            println!("Applied: {command}");
        }
        steps.push(command);
    }

    let after = session.metrics()?;
    std::fs::write(&config.output, session.export_csv()?)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    info!(output = %config.output.display(), "Cleaned data saved");

    if args.json {
        let report = Report {
            file: &args.file,
            before,
            steps,
            after,
            output: &config.output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if !steps.is_empty() {
            println!();
            print_overview("CLEANED DATA", &after, &session, config.preview_rows)?;
        }
        println!("Saved cleaned data to {}", config.output.display());
    }
    Ok(())
}

fn print_overview(title: &str, metrics: &Metrics, session: &Session, rows: usize) -> Result<()> {
    println!("{title}");
    println!("{}", "-".repeat(40));
    print!("{metrics}");
    println!();
    println!("Preview:");
    print!("{}", session.preview(rows)?);
    println!();
    Ok(())
}
