//! The Aster compiler CLI.
//!
//! Subcommands:
//!
//! - `asterc compile <file>` - run the full pipeline; exit 0 on success,
//!   1 when diagnostics contain errors, 2 on usage/environment problems
//! - `asterc emit-core <file>` - print the Core IR JSON envelope
//! - `asterc typecheck <file> [--filter-codes=...]` - print a JSON report
//!   `{source, diagnostics, summary}`
//!
//! Environment: `LOG_LEVEL` (DEBUG/INFO/WARN/ERROR),
//! `ASTER_CAP_EFFECTS_ENFORCE` (default 1), `ASTER_EFFECT_CONFIG`,
//! `ASTER_CAPS`, `ASTER_DEBUG_TYPES`. All environment reading happens
//! here, once; the core crates receive plain data.

mod error;
mod pipeline;
mod render;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use aster_common::config::{self, CapabilityManifest, EffectConfig};
use aster_common::diag::{Diagnostic, Severity};
use clap::{Parser, Subcommand};
use serde::Serialize;

use error::{DriverError, Result};

#[derive(Parser)]
#[command(name = "asterc", version, about = "The Aster compiler")]
struct Cli {
    /// Lexicon used for keyword spellings.
    #[arg(long, global = true, default_value = "en")]
    lexicon: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a module and report diagnostics
    Compile {
        /// Path to the .aster source file
        file: PathBuf,
    },
    /// Print the Core IR JSON envelope for a module
    EmitCore {
        file: PathBuf,
    },
    /// Print a machine-readable diagnostics report
    Typecheck {
        file: PathBuf,

        /// Comma-separated list of codes to keep (e.g. `E301,W031`)
        #[arg(long = "filter-codes")]
        filter_codes: Option<String>,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let level = match std::env::var("LOG_LEVEL").as_deref() {
        Ok("DEBUG") => log::LevelFilter::Debug,
        Ok("INFO") => log::LevelFilter::Info,
        Ok("ERROR") => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let lexicon = aster_lexer::lexicon::get(&cli.lexicon)
        .ok_or_else(|| DriverError::UnknownLexicon(cli.lexicon.clone()))?;
    let options = load_options()?;

    match cli.command {
        Commands::Compile { file } => {
            let outcome = pipeline::run(&read(&file)?, &lexicon, &options);
            render::report_all(&outcome.source, &outcome.diagnostics);
            Ok(exit_for(&outcome.diagnostics))
        }
        Commands::EmitCore { file } => {
            let outcome = pipeline::run(&read(&file)?, &lexicon, &options);
            println!("{}", aster_ir::to_json(&outcome.module));
            render::report_all(&outcome.source, &outcome.diagnostics);
            Ok(exit_for(&outcome.diagnostics))
        }
        Commands::Typecheck { file, filter_codes } => {
            let outcome = pipeline::run(&read(&file)?, &lexicon, &options);
            let report = TypecheckReport::new(&outcome, filter_codes.as_deref());
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serialization cannot fail")
            );
            Ok(exit_for(&outcome.diagnostics))
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| DriverError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn exit_for(diagnostics: &[Diagnostic]) -> ExitCode {
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Assemble checker options from the environment, caching the effect
/// configuration process-wide.
fn load_options() -> Result<aster_typeck::Options> {
    let enforce_capabilities = std::env::var("ASTER_CAP_EFFECTS_ENFORCE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let debug_types = std::env::var("ASTER_DEBUG_TYPES")
        .map(|v| v == "1")
        .unwrap_or(false);

    let effect_config = match std::env::var("ASTER_EFFECT_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path).map_err(|source| DriverError::Read {
                path: path.clone(),
                source,
            })?;
            let loaded = EffectConfig::from_json_str(&text)?;
            config::set_effect_config(loaded);
            config::effect_config()
        }
        Err(_) => config::effect_config(),
    };

    let capabilities = match std::env::var("ASTER_CAPS") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path).map_err(|source| DriverError::Read {
                path: path.clone(),
                source,
            })?;
            Some(Arc::new(CapabilityManifest::from_json_str(&text)?))
        }
        Err(_) => None,
    };

    Ok(aster_typeck::Options {
        effect_config,
        capabilities,
        enforce_capabilities,
        debug_types,
    })
}

// ── Typecheck report ───────────────────────────────────────────────────

#[derive(Serialize)]
struct TypecheckReport<'a> {
    source: &'a str,
    diagnostics: Vec<&'a Diagnostic>,
    summary: Summary,
}

#[derive(Serialize)]
struct Summary {
    errors: usize,
    warnings: usize,
    by_category: BTreeMap<&'static str, usize>,
}

impl<'a> TypecheckReport<'a> {
    fn new(outcome: &'a pipeline::Outcome, filter_codes: Option<&str>) -> Self {
        let keep: Option<Vec<&str>> =
            filter_codes.map(|codes| codes.split(',').map(str::trim).collect());
        let diagnostics: Vec<&Diagnostic> = outcome
            .diagnostics
            .iter()
            .filter(|d| match &keep {
                Some(codes) => codes.contains(&d.code),
                None => true,
            })
            .collect();
        let summary = Summary {
            errors: diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count(),
            warnings: diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .count(),
            by_category: {
                let mut map = BTreeMap::new();
                for diag in &diagnostics {
                    *map.entry(diag.category).or_insert(0) += 1;
                }
                map
            },
        };
        TypecheckReport {
            source: &outcome.source,
            diagnostics,
            summary,
        }
    }
}
