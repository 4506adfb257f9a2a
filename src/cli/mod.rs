//! CLI module for stagehand
//!
//! ## Commands
//!
//! - `samples` - Run the bundled sample fixtures through the pipeline
//! - `markers` - List the known markers and their aliases
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::pipeline::Lifecycle;
use crate::report::ReportError;
use crate::samples::Style;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Nothing was selected to run.
    pub const NO_CASES: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ReportError> for CliError {
    fn from(err: ReportError) -> Self {
        let report = miette::Report::new(err);
        CliError::failure(format!("{report:?}"))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Staged test execution with set-up/tear-down at method, instance and class scope
#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "Staged test execution pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bundled sample fixtures
    Samples {
        /// Which convention's samples to run (default: all)
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
        /// Override the instance lifecycle of every sample
        #[arg(long, value_enum)]
        lifecycle: Option<LifecycleArg>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop after the first failing fixture
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Filter cases by substring of the method name
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Report format
        #[arg(long, value_enum, default_value_t = FormatArg::Console)]
        format: FormatArg,
        /// Disable ANSI colours in console output
        #[arg(long)]
        no_color: bool,
    },

    /// List known markers and their aliases
    Markers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Nunit,
    Xunit,
}

impl From<StyleArg> for Style {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Nunit => Style::Nunit,
            StyleArg::Xunit => Style::Xunit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LifecycleArg {
    PerCase,
    PerFixture,
}

impl From<LifecycleArg> for Lifecycle {
    fn from(arg: LifecycleArg) -> Self {
        match arg {
            LifecycleArg::PerCase => Lifecycle::PerCase,
            LifecycleArg::PerFixture => Lifecycle::PerFixture,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Console,
    Json,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Samples {
            style,
            lifecycle,
            verbose,
            stop_on_fail,
            filter,
            format,
            no_color,
        } => {
            let options = commands::SampleOptions {
                style: style.map(Style::from).unwrap_or_default(),
                lifecycle: lifecycle.map(Lifecycle::from),
                verbose,
                stop_on_fail,
                filter,
                format,
                color: !no_color,
            };
            commands::run_samples(&options)
        }
        Command::Markers => commands::list_markers(),
    }
}

// ============================================================================
// Tests
// ============================================================================
