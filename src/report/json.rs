//! JSON report model and serialization.
//!
//! The field names and the `""` placeholder for absent step parameters are what existing report
//! consumers parse; keep them stable.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gauntlet_core::escape;
use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::{ScenarioRecord, SuiteResult};
use crate::config::CoefficientMap;
use crate::runner::InvocationSpec;

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    #[diagnostic(code(gauntlet::report::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to '{}'", path.display())]
    #[diagnostic(
        code(gauntlet::report::write),
        help("check that the parent directory exists and is writable")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub result: f64,
    pub categories: BTreeMap<String, f64>,
    pub tests: Vec<ScenarioReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub id: usize,
    pub name: String,
    pub categories: Vec<String>,
    pub passed: bool,
    pub verdict: String,
    /// Empty when the scenario passed.
    pub what: String,
    pub runs: Vec<StepReport>,
}

/// One step's invocation parameters; text fields are escaped.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub timeout: f64,
    #[serde(serialize_with = "or_empty")]
    pub stdin: Option<String>,
    #[serde(serialize_with = "or_empty")]
    pub args: Option<Vec<String>>,
    #[serde(serialize_with = "or_empty")]
    pub expected_returncode: Option<i32>,
    #[serde(serialize_with = "or_empty")]
    pub expected_stdout: Option<String>,
    pub stderr_should_be_empty: bool,
}

impl From<&InvocationSpec> for StepReport {
    fn from(invocation: &InvocationSpec) -> Self {
        Self {
            timeout: invocation.timeout(),
            stdin: invocation.stdin().map(escape),
            args: invocation
                .args()
                .map(|args| args.iter().map(|a| escape(a)).collect()),
            expected_returncode: invocation.expected_return_code(),
            expected_stdout: invocation.expected_stdout().map(str::to_owned),
            stderr_should_be_empty: invocation.stderr_should_be_empty(),
        }
    }
}

impl From<&ScenarioRecord> for ScenarioReport {
    fn from(record: &ScenarioRecord) -> Self {
        let passed = record.passed();
        Self {
            id: record.id,
            name: record.name.clone(),
            categories: record.categories.iter().cloned().collect(),
            passed,
            verdict: record.verdict.label().to_string(),
            what: if passed {
                String::new()
            } else {
                record.verdict.what().to_string()
            },
            runs: record.invocations.iter().map(StepReport::from).collect(),
        }
    }
}

/// Absent values are written as `""`.
fn or_empty<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

pub fn build_report(result: &SuiteResult, coefficients: &CoefficientMap) -> Report {
    Report {
        result: result.weighted_score(coefficients),
        categories: result.category_ratios(coefficients),
        tests: result.records().iter().map(ScenarioReport::from).collect(),
    }
}

/// Pretty JSON with a four-space indent and a trailing newline.
pub fn to_json(report: &Report) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    let mut text = String::from_utf8_lossy(&buf).into_owned();
    text.push('\n');
    Ok(text)
}

pub fn write_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let text = to_json(report)?;
    fs::write(path, text).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
