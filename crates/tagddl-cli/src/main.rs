mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tagddl_core::{Error as CoreError, ModelDocument, model_json_schema};
use tagddl_generate::output::write_bytes_atomic;
use tagddl_generate::{
    DirectorySink, GenerateOptions, GenerationError, GenerationReport, Generator,
    TracingDiagnostics,
};
use thiserror::Error;

use config::load_or_create_options;
use logging::init_logging;

const REPORT_FILE: &str = "generation_report.json";

#[derive(Debug, Error)]
enum CliError {
    #[error("model error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("config encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "tagddl", version, about = "Tag-driven PostgreSQL DDL generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate create/drop scripts from a model file.
    Generate(GenerateArgs),
    /// Print the JSON Schema of the model file format.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Model file (JSON).
    #[arg(value_name = "MODEL")]
    model: PathBuf,
    /// Options file (TOML); created with defaults when missing.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for the SQL files and the run report.
    #[arg(long, default_value = "ddl")]
    out: PathBuf,
    /// Append JSON log lines to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Record the chosen database name back into the model file.
    #[arg(long, default_value_t = false)]
    write_back: bool,
    /// Skip the `_drop.sql` files.
    #[arg(long, default_value_t = false)]
    no_drop: bool,
    /// Skip foreign key constraints.
    #[arg(long, default_value_t = false)]
    no_foreign_keys: bool,
    /// Read entity documentation as seed rows.
    #[arg(long, default_value_t = false)]
    inserts: bool,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_generate(args: GenerateArgs) -> CliResult<()> {
    init_logging(args.log_file.as_deref())?;

    let options = resolve_options(&args)?;
    let timer = Instant::now();

    let text = std::fs::read_to_string(&args.model)?;
    let mut document = ModelDocument::from_json(&text)?;
    tracing::info!(event = "model_loaded", path = %args.model.display());

    let generator = Generator::new(options);
    let mut sink = DirectorySink::new(&args.out);
    let mut diagnostics = TracingDiagnostics;

    let report = match generator.run(document.project.as_ref(), &mut sink, &mut diagnostics) {
        Ok(report) => report,
        Err(GenerationError::Failed(report)) => {
            write_report(&args.out, &report)?;
            return Err(GenerationError::Failed(report).into());
        }
        Err(err) => return Err(err.into()),
    };
    write_report(&args.out, &report)?;

    if !report.mutations.is_empty() {
        if args.write_back {
            write_back(&args.model, &mut document, &report)?;
        } else {
            tracing::info!(
                event = "write_back_skipped",
                mutations = report.mutations.len(),
                "model changes not saved; pass --write-back to record them"
            );
        }
    }

    let status = if report.errors == 0 { "success" } else { "partial" };
    tracing::info!(
        event = "run_finished",
        status,
        files = report.files.len(),
        duration_ms = timer.elapsed().as_millis() as u64
    );
    println!(
        "{} files written to {} ({} warnings, {} errors)",
        report.files.len(),
        sink.root().display(),
        report.warnings,
        report.errors
    );
    Ok(())
}

fn resolve_options(args: &GenerateArgs) -> CliResult<GenerateOptions> {
    let mut options = match &args.config {
        Some(path) => load_or_create_options(path)?,
        None => GenerateOptions::default(),
    };
    if args.no_drop {
        options.drop_statements = false;
    }
    if args.no_foreign_keys {
        options.foreign_key_constraint = false;
    }
    if args.inserts {
        options.table_inserts = true;
    }

    options
        .validate()
        .map_err(|err| CliError::InvalidConfig(err.to_string()))?;
    Ok(options)
}

fn write_report(out: &Path, report: &GenerationReport) -> CliResult<()> {
    let path = out.join(REPORT_FILE);
    write_bytes_atomic(&path, report.to_json_pretty()?.as_bytes())?;
    tracing::info!(event = "report_written", path = %path.display());
    Ok(())
}

fn write_back(model: &Path, document: &mut ModelDocument, report: &GenerationReport) -> CliResult<()> {
    let Some(project) = document.project.as_mut() else {
        return Ok(());
    };

    let mut changed = false;
    for mutation in &report.mutations {
        changed |= mutation.apply(project);
    }
    if !changed {
        return Ok(());
    }

    write_bytes_atomic(model, document.to_json_pretty()?.as_bytes())?;
    tracing::info!(event = "model_updated", path = %model.display());
    Ok(())
}

fn run_schema(args: SchemaArgs) -> CliResult<()> {
    let schema = model_json_schema();
    let json = serde_json::to_string_pretty(&schema)?;

    match args.out {
        Some(path) => write_bytes_atomic(&path, json.as_bytes())?,
        None => println!("{json}"),
    }
    Ok(())
}
