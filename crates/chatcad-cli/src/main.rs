//! chatcad CLI - conversational solid modeling front-end
//!
//! Drives the session core from the terminal: apply operation logs from
//! files, inspect the resulting models, export meshes, or run an
//! interactive loop that feeds JSON logs through a full session.

use anyhow::{bail, Context, Result};
use chatcad_engine::{CompositionEngine, ModelRegistry, ModelSummary};
use chatcad_export::ExportFormat;
use chatcad_ops::OperationLog;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod repl;

#[derive(Parser)]
#[command(name = "chatcad")]
#[command(about = "Conversational parametric solid model engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive session loop (reads JSON operation logs from stdin)
    Repl {
        /// Path to a TOML session config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Apply an operation log file and print the resulting models
    Apply {
        /// JSON operation log file
        log: PathBuf,
    },
    /// Apply an operation log file and export a model
    Export {
        /// JSON operation log file
        log: PathBuf,
        /// Output file (format determined by extension: .stl, .obj, .ply)
        output: PathBuf,
        /// Model identifier to export (default: all models combined)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Display information about an operation log file
    Info {
        /// JSON operation log file
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Repl { config }) => repl::run(config.as_deref()),
        Some(Commands::Apply { log }) => apply_log(&log),
        Some(Commands::Export { log, output, model }) => export_log(&log, &output, model),
        Some(Commands::Info { log }) => show_info(&log),
        None => repl::run(None),
    }
}

fn load_log(path: &Path) -> Result<OperationLog> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    OperationLog::from_json(&json)
        .with_context(|| format!("{} is not a valid operation log", path.display()))
}

fn run_log(path: &Path) -> Result<ModelRegistry> {
    let log = load_log(path)?;
    let engine = CompositionEngine::new();
    engine
        .apply(&log, &ModelRegistry::new())
        .context("failed to apply operation log")
}

fn print_summaries(summaries: &[ModelSummary]) {
    for s in summaries {
        let bounds = match s.bounding_box {
            Some([min, max]) => format!(
                "[{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
                min[0], min[1], min[2], max[0], max[1], max[2]
            ),
            None => "empty".to_string(),
        };
        println!(
            "  {} ({}) - {} triangles, volume {:.4}, bounds {}",
            s.id, s.kind, s.triangles, s.volume, bounds
        );
    }
}

fn apply_log(path: &Path) -> Result<()> {
    let registry = run_log(path)?;
    println!("{} model(s):", registry.len());
    print_summaries(&registry.summaries());
    Ok(())
}

fn export_log(path: &Path, output: &Path, model: Option<String>) -> Result<()> {
    let ext = output.extension().and_then(|e| e.to_str()).unwrap_or("");
    let Some(format) = ExportFormat::from_extension(ext) else {
        bail!("unknown output format: {ext}");
    };
    let registry = run_log(path)?;
    let bytes = match model {
        Some(id) => chatcad_engine::export_model(&registry, &id, format)?,
        None => chatcad_engine::export_combined(&registry, format)?,
    };
    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Exported {} to {}", format.extension(), output.display());
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let log = load_log(path)?;
    println!("{} operation(s):", log.len());
    for (i, op) in log.operations.iter().enumerate() {
        println!("  {i}: {op:?}");
    }
    let engine = CompositionEngine::new();
    match engine.apply(&log, &ModelRegistry::new()) {
        Ok(registry) => {
            println!("{} resulting model(s):", registry.len());
            print_summaries(&registry.summaries());
        }
        Err(e) => println!("log does not apply cleanly: {e}"),
    }
    Ok(())
}
