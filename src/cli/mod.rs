//! CLI module for the gauntlet conformance harness
//!
//! This module provides the command-line interface for running a suite against an executable.
//!
//! ## Usage
//!
//! - `gauntlet --executable-path <PATH> --suite <NAME>` - warm up, run, exit 0 iff all passed
//! - `--timeout-factor <F>` - scale every step's timeout (default 1.0)
//! - `--report-output-path <PATH>` - write the JSON report
//! - `--no-warm` - skip the warm-up pass
//! - `--list-suites` - print the registered suite names
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
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::builder::PossibleValuesParser;

use crate::config::validate_timeout_factor;
use crate::suites;
use crate::version::GAUNTLET_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Invalid invocation of the harness itself.
    pub const USAGE: ExitCode = ExitCode(2);
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
    /// Create a new CLI error with a message and exit code.
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

    /// Create a usage error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }

    /// Render a diagnostic through miette's graphical handler.
    pub fn diagnostic(err: impl miette::Diagnostic + Send + Sync + 'static, exit_code: ExitCode) -> Self {
        Self::new(format!("{:?}", miette::Report::new(err)), exit_code)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Black-box conformance harness: runs scripted scenarios against an executable and scores them
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(version = GAUNTLET_VERSION)]
#[command(about = "Black-box conformance harness for command-line programs", long_about = None)]
pub struct Cli {
    /// Path to the executable file to be tested
    #[arg(long, value_name = "PATH", required_unless_present = "list_suites")]
    pub executable_path: Option<PathBuf>,

    /// Test suite selection
    #[arg(
        long,
        value_name = "NAME",
        required_unless_present = "list_suites",
        value_parser = PossibleValuesParser::new(suites::names())
    )]
    pub suite: Option<String>,

    /// Maximum program execution time multiplier
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0, value_parser = parse_timeout_factor)]
    pub timeout_factor: f64,

    /// Path to the generated JSON report (default: no generation)
    #[arg(long, value_name = "PATH")]
    pub report_output_path: Option<PathBuf>,

    /// Skip the warm-up pass
    #[arg(long)]
    pub no_warm: bool,

    /// Print the names of all registered suites and exit
    #[arg(long, conflicts_with_all = ["executable_path", "suite"])]
    pub list_suites: bool,
}

fn parse_timeout_factor(raw: &str) -> Result<f64, String> {
    let factor: f64 = raw.parse().map_err(|e| format!("'{}' is not a number: {}", raw, e))?;
    validate_timeout_factor(factor).map_err(|e| e.to_string())
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
    if cli.list_suites {
        return commands::list_suites();
    }

    let (Some(executable_path), Some(suite)) = (cli.executable_path, cli.suite) else {
        return Err(CliError::usage("--executable-path and --suite are required"));
    };

    let options = commands::RunOptions {
        executable_path,
        suite,
        timeout_factor: cli.timeout_factor,
        report_output_path: cli.report_output_path,
        warm_up: !cli.no_warm,
    };
    commands::run_suite(&options)
}

// ============================================================================
// Tests
// ============================================================================
