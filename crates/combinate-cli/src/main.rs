mod logging;
mod settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use combinate_generate::{
    CloneMode, GenerationEngine, GenerationError, MAX_SUBSET_ITEMS, array_combinate,
    template_from_json_with,
};
use logging::init_logging;
use settings::{CliSettings, SettingsError, load_settings};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "combinate",
    version,
    about = "Expand combination templates into test fixtures"
)]
struct Cli {
    /// Settings file (defaults to ./combinate.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a JSON template into every fixture it describes.
    Expand(ExpandArgs),
    /// Print every subset of a JSON array.
    Subsets(SubsetsArgs),
}

#[derive(Args, Debug)]
struct ExpandArgs {
    /// JSON template file.
    #[arg(value_name = "TEMPLATE")]
    template: PathBuf,
    /// Write fixtures to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
    /// Record the base object and candidate lists before expanding.
    #[arg(long, default_value_t = false)]
    log: bool,
    /// Deep-clone every result.
    #[arg(long, default_value_t = false)]
    mutable: bool,
    /// Warn when more results than this are expected.
    #[arg(long, value_name = "COUNT")]
    warn_threshold: Option<usize>,
    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Print the expansion report instead of the fixtures.
    #[arg(long, default_value_t = false)]
    report: bool,
}

#[derive(Args, Debug)]
struct SubsetsArgs {
    /// JSON array, e.g. '[1, 2, 3]'.
    #[arg(value_name = "JSON_ARRAY")]
    items: String,
    /// Pretty-print JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings.logging).map_err(CliError::Logging)?;

    match cli.command {
        Command::Expand(args) => run_expand(args, &settings),
        Command::Subsets(args) => run_subsets(args, &settings),
    }
}

fn run_expand(args: ExpandArgs, settings: &CliSettings) -> Result<(), CliError> {
    let ExpandArgs {
        template,
        out,
        log,
        mutable,
        warn_threshold,
        pretty,
        report,
    } = args;

    let mut options = settings.generate.clone();
    options.log |= log;
    if mutable {
        options.clone_mode = CloneMode::Deep;
    }
    if warn_threshold.is_some() {
        options.warn_threshold = warn_threshold;
    }

    let content = std::fs::read_to_string(&template)?;
    let document: serde_json::Value = serde_json::from_str(&content)?;
    let engine = GenerationEngine::new(options);
    let template_doc = template_from_json_with(&document, &engine)?;

    tracing::info!(
        event = "template_loaded",
        path = %template.display(),
        fields = template_doc.len()
    );

    let timer = Instant::now();
    let expansion = engine.run(&template_doc);

    tracing::info!(
        event = "expansion_finished",
        results = expansion.report.results,
        duration_ms = duration_millis(timer.elapsed())
    );

    let output = if report {
        serde_json::to_value(&expansion.report)?
    } else {
        serde_json::to_value(&expansion.results)?
    };
    write_output(&output, pretty || settings.output.pretty, out.as_deref())
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn run_subsets(args: SubsetsArgs, settings: &CliSettings) -> Result<(), CliError> {
    let output = subsets_output(&args.items)?;
    write_output(&output, args.pretty || settings.output.pretty, None)
}

fn subsets_output(items: &str) -> Result<serde_json::Value, CliError> {
    let items: serde_json::Value = serde_json::from_str(items)?;
    let items = items.as_array().ok_or_else(|| {
        CliError::InvalidArgument("subsets expects a JSON array".to_string())
    })?;
    if items.len() > MAX_SUBSET_ITEMS {
        return Err(CliError::InvalidArgument(format!(
            "subsets accepts at most {MAX_SUBSET_ITEMS} items, got {}",
            items.len()
        )));
    }

    let subsets = array_combinate(items);
    tracing::info!(event = "subsets_enumerated", count = subsets.len());

    Ok(serde_json::to_value(subsets)?)
}

fn write_output(
    output: &serde_json::Value,
    pretty: bool,
    out: Option<&Path>,
) -> Result<(), CliError> {
    let mut encoded = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };

    match out {
        Some(path) => {
            encoded.push('\n');
            std::fs::write(path, encoded)?;
            tracing::info!(event = "output_written", path = %path.display());
        }
        None => println!("{encoded}"),
    }
    Ok(())
}
