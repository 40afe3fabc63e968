//! Binary entry point for the tsgraph CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Index a single file into the default store
//! tsgraph index-file src/globals.d.ts
//!
//! # Index a project, wiping the store first
//! tsgraph index-project path/to/tsconfig.json --store graph.json --clear
//!
//! # Structured logs for a log collector
//! tsgraph --log-format json --log-level info index-project .
//! ```
//!
//! Every run prints one JSON object on stdout. Logs and configuration
//! diagnostics go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tsgraph::cli::{run_index, IndexTarget};
use tsgraph_core::config::CliOverrides;
use tsgraph_core::error::{IndexError, OutputErrorCode};
use tsgraph_core::output::{emit_response, ErrorResponse, IndexResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Index TypeScript sources into a symbol graph store.
#[derive(Parser, Debug)]
#[command(name = "tsgraph", version, about = "Index TypeScript sources into a symbol graph")]
struct Cli {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of tracing output on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Format of tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Store arguments shared by both commands.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Store file to write (default: index.tsgraph.json).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Wipe the store before indexing.
    #[arg(long)]
    clear: bool,

    /// Directory name that marks third-party packages (default: node_modules).
    #[arg(long)]
    dependency_dir: Option<String>,
}

impl StoreArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            store: self.store.clone(),
            // Absent flag leaves TSGRAPH_CLEAR in charge.
            clear: self.clear.then_some(true),
            dependency_marker: self.dependency_dir.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Index one TypeScript source file.
    IndexFile {
        /// Source file to index.
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Index a project described by a tsconfig.json.
    IndexProject {
        /// A tsconfig.json file or a directory containing one.
        project: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level, cli.log_format);

    match execute(cli) {
        Ok(response) => {
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::SUCCESS
        }
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            report_diagnostics(&err);

            // Errors go to stdout as JSON; diagnostics already went to stderr
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<IndexResponse, IndexError> {
    let (target, store) = match cli.command {
        Command::IndexFile { file, store } => (IndexTarget::File(file), store),
        Command::IndexProject { project, store } => (IndexTarget::Project(project), store),
    };
    run_index(&target, &store.overrides())
}

/// Print configuration diagnostics, one per line.
fn report_diagnostics(err: &IndexError) {
    let mut stderr = io::stderr().lock();
    for line in err.diagnostics() {
        let _ = writeln!(stderr, "{}", line);
    }
    if err.diagnostics().is_empty() {
        let _ = writeln!(stderr, "error: {}", err);
    }
}
