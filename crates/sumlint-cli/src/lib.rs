//! sumlint CLI - vet-style driver shared by the `sumlint` and `oneoflint`
//! binaries
//!
//! The binaries differ only in the analyzer instance they run.

pub mod driver;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sumlint_checker::AnalyzerConfig;
use sumlint_facts::{FactStore, InMemoryFactStore, RedbFactStore};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::driver::{check_tree, DriverError};

/// Environment variable holding the log filter when `--verbose` is off
pub const LOG_ENV: &str = "SUMLINT_LOG";

#[derive(Parser)]
#[command(about = "Checks type switches over closed interfaces for exhaustiveness", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check every unit under a source tree
    Check {
        /// Root of the source tree
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Module path of the root (defaults to the `module` line of go.mod)
        #[arg(long)]
        module: Option<String>,
        /// Log discovered interfaces, implementations and facts
        #[arg(short, long)]
        verbose: bool,
        /// Persist facts in this database instead of memory
        #[arg(long)]
        facts: Option<PathBuf>,
        /// Render diagnostics as annotated source snippets
        #[arg(short, long)]
        pretty: bool,
    },
    /// Dump the facts stored in a fact database as JSON
    Facts {
        /// Fact database written by `check --facts`
        #[arg(long)]
        facts: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Parse a file and output the AST as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Exit status of a run: clean, findings reported, or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Findings,
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Clean => ExitCode::SUCCESS,
            Outcome::Findings => ExitCode::from(2),
            Outcome::Failed => ExitCode::from(1),
        }
    }
}

/// Entry point of both binaries
pub fn main_with(config: AnalyzerConfig) -> ExitCode {
    let cli = Cli::parse();
    run(config, cli.command).into()
}

pub fn run(config: AnalyzerConfig, command: Commands) -> Outcome {
    match command {
        Commands::Check {
            root,
            module,
            verbose,
            facts,
            pretty,
        } => {
            init_tracing(verbose);
            cmd_check(
                config.with_verbose(verbose),
                &root,
                module.as_deref(),
                facts.as_deref(),
                pretty,
            )
        }
        Commands::Facts { facts, pretty } => {
            init_tracing(false);
            cmd_facts(&config, &facts, pretty)
        }
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
    }
}

/// Logs go to stderr: everything from DEBUG with `--verbose`, otherwise
/// whatever `SUMLINT_LOG` selects, warnings by default
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(Level::WARN.as_str()))
    };
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_store(config: &AnalyzerConfig, facts: Option<&Path>) -> Result<Box<dyn FactStore>, DriverError> {
    Ok(match facts {
        Some(path) => Box::new(RedbFactStore::open(path, config.name.clone())?),
        None => Box::new(InMemoryFactStore::new(config.name.clone())),
    })
}

fn cmd_check(
    config: AnalyzerConfig,
    root: &Path,
    module: Option<&str>,
    facts: Option<&Path>,
    pretty: bool,
) -> Outcome {
    let result = open_store(&config, facts)
        .and_then(|mut store| check_tree(&config, root, module, store.as_mut()));
    let reports = match result {
        Ok(reports) => reports,
        Err(err) => {
            report_driver_error(&config, &err);
            return Outcome::Failed;
        }
    };

    for report in &reports {
        if pretty {
            if let Err(err) = report::eprint_pretty(report) {
                eprintln!("{}: cannot write report: {}", config.name, err);
                return Outcome::Failed;
            }
        } else {
            for line in report::vet_lines(report) {
                eprintln!("{}", line);
            }
        }
    }

    if reports.iter().all(|r| r.is_clean()) {
        Outcome::Clean
    } else {
        Outcome::Findings
    }
}

fn report_driver_error(config: &AnalyzerConfig, err: &DriverError) {
    if let DriverError::Parse {
        display,
        text,
        error,
    } = err
    {
        if report::eprint_parse_error(display, text, error).is_ok() {
            return;
        }
    }
    eprintln!("{}: {}", config.name, err);
}

fn cmd_facts(config: &AnalyzerConfig, path: &Path, pretty: bool) -> Outcome {
    if !path.is_file() {
        eprintln!("{}: no fact database at {}", config.name, path.display());
        return Outcome::Failed;
    }
    let facts = match RedbFactStore::open(path, config.name.clone()).and_then(|store| store.facts()) {
        Ok(facts) => facts,
        Err(err) => {
            eprintln!("{}: {}", config.name, err);
            return Outcome::Failed;
        }
    };
    print_json(&facts, pretty)
}

fn cmd_parse(file: &Path, pretty: bool) -> Outcome {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return Outcome::Failed;
        }
    };

    match sumlint_parser::parse(&source) {
        Ok(ast) => print_json(&ast, pretty),
        Err(e) => {
            let display = file.to_string_lossy();
            if report::eprint_parse_error(&display, &source, &e).is_err() {
                eprintln!("{}: {}", display, e);
            }
            Outcome::Failed
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Outcome {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            Outcome::Clean
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            Outcome::Failed
        }
    }
}
