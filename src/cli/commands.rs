//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, EnvCoefficients, HarnessConfig};
use crate::runner::ConsoleReporter;
use crate::suites::{self, Testsuite};

use super::{CliError, CliResult, ExitCode};

/// Options for a single suite run, as parsed from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub executable_path: PathBuf,
    pub suite: String,
    pub timeout_factor: f64,
    pub report_output_path: Option<PathBuf>,
    pub warm_up: bool,
}

impl RunOptions {
    fn to_config(&self) -> Result<HarnessConfig, ConfigError> {
        let config = HarnessConfig::new()
            .with_timeout_factor(self.timeout_factor)?
            .with_warm_up(self.warm_up);
        Ok(match &self.report_output_path {
            Some(path) => config.with_report_output_path(path),
            None => config,
        })
    }
}

/// Warm up, run the selected suite, optionally export the report.
///
/// Exits with 0 when every scenario passed and 1 otherwise.
pub fn run_suite(options: &RunOptions) -> CliResult<ExitCode> {
    let suite = suites::find(&options.suite).ok_or_else(|| {
        CliError::usage(format!(
            "Error: unknown suite '{}' (available: {})",
            options.suite,
            suites::names().join(", ")
        ))
    })?;
    let config = options
        .to_config()
        .map_err(|e| CliError::diagnostic(e, ExitCode::USAGE))?;

    check_executable(&options.executable_path)?;

    run_with_config(suite.as_ref(), &options.executable_path, &config)
}

/// Run `suite` against `executable` under `config`.
pub fn run_with_config(suite: &dyn Testsuite, executable: &Path, config: &HarnessConfig) -> CliResult<ExitCode> {
    let engine = suite.build_engine();
    let mut reporter = ConsoleReporter::default();

    if config.warm_up {
        engine.warm(executable, config.timeout_factor, &mut reporter);
    }
    let result = engine.run(executable, config.timeout_factor, &mut reporter);

    if let Some(path) = &config.report_output_path {
        let coefficients = suite.coefficients(&EnvCoefficients::default());
        result
            .export_report(path, &coefficients)
            .map_err(|e| CliError::diagnostic(e, ExitCode::FAILURE))?;
    }

    Ok(ExitCode(result.exit_code()))
}

/// Print every registered suite name, one per line.
pub fn list_suites() -> CliResult<ExitCode> {
    for name in suites::names() {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}

/// Reject paths that cannot possibly be executed before spending time on a run.
fn check_executable(path: &Path) -> CliResult<()> {
    if !path.exists() {
        return Err(CliError::usage(format!(
            "Error: executable '{}' does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(CliError::usage(format!(
            "Error: executable '{}' is a directory",
            path.display()
        )));
    }
    Ok(())
}
