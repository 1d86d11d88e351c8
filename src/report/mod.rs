//! Suite results, category scoring and report export.
//!
//! ## Scoring
//!
//! - Category ratio: `passed / total` over the scenarios tagged with that category. A category
//!   with no scenarios has ratio `0.0`.
//! - Weighted score: `Σ ratio(category) * weight(category)` over the keys of the supplied
//!   [`CoefficientMap`]. Categories used by scenarios but missing from the map do not contribute.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod json;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::CoefficientMap;
use crate::runner::{InvocationSpec, Scenario, ScenarioRun, StepLog, Verdict};

pub use json::{Report, ReportError, ScenarioReport, StepReport};

/// A scenario's identity and invocations, paired with the verdict it produced.
#[derive(Debug, Clone)]
pub struct ScenarioRecord {
    pub id: usize,
    pub name: String,
    pub categories: BTreeSet<String>,
    pub invocations: Vec<InvocationSpec>,
    pub verdict: Verdict,
    /// Executed steps in order; informational only.
    pub steps: Vec<StepLog>,
}

impl ScenarioRecord {
    pub fn new<I, S>(id: usize, name: impl Into<String>, categories: I, invocations: Vec<InvocationSpec>, verdict: Verdict) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            invocations,
            verdict,
            steps: Vec::new(),
        }
    }

    pub fn from_run(id: usize, scenario: &Scenario, run: ScenarioRun) -> Self {
        Self {
            id,
            name: scenario.name().to_string(),
            categories: scenario.categories().clone(),
            invocations: scenario.invocations().cloned().collect(),
            verdict: run.verdict,
            steps: run.steps,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_success()
    }

    /// Elapsed time of the last step that produced an outcome.
    pub fn last_elapsed_ms(&self) -> Option<u64> {
        self.steps.iter().rev().find_map(|s| s.elapsed_ms)
    }
}

/// Verdicts of a measured run, one per scenario, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SuiteResult {
    records: Vec<ScenarioRecord>,
    passed: usize,
    elapsed_ms: u64,
}

impl SuiteResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from already-collected records, e.g. when re-scoring a stored run.
    pub fn from_records(records: impl IntoIterator<Item = ScenarioRecord>) -> Self {
        let mut result = Self::new();
        for record in records {
            result.add(record);
        }
        result
    }

    pub(crate) fn add(&mut self, record: ScenarioRecord) {
        if record.passed() {
            self.passed += 1;
        }
        self.records.push(record);
    }

    pub(crate) fn set_elapsed_ms(&mut self, elapsed_ms: u64) {
        self.elapsed_ms = elapsed_ms;
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total()
    }

    /// Process exit code for the whole suite: 0 iff every scenario passed.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }

    /// Wall-clock duration of the measured pass.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn total_in_category(&self, category: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.categories.contains(category))
            .count()
    }

    pub fn passed_in_category(&self, category: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.passed() && r.categories.contains(category))
            .count()
    }

    /// Pass ratio in `[0, 1]`; `0.0` for a category without scenarios.
    pub fn category_ratio(&self, category: &str) -> f64 {
        let total = self.total_in_category(category);
        if total == 0 {
            return 0.0;
        }
        self.passed_in_category(category) as f64 / total as f64
    }

    /// Ratios for every category named in `coefficients`.
    pub fn category_ratios(&self, coefficients: &CoefficientMap) -> BTreeMap<String, f64> {
        coefficients
            .categories()
            .map(|category| (category.to_string(), self.category_ratio(category)))
            .collect()
    }

    pub fn weighted_score(&self, coefficients: &CoefficientMap) -> f64 {
        coefficients
            .iter()
            .map(|(category, weight)| self.category_ratio(category) * weight)
            .sum()
    }

    pub fn to_report(&self, coefficients: &CoefficientMap) -> Report {
        json::build_report(self, coefficients)
    }

    /// Serialize the report as pretty JSON and write it to `path`.
    ///
    /// ## Errors
    ///
    /// Returns [`ReportError`] if serialization or the write fails.
    pub fn export_report(&self, path: &Path, coefficients: &CoefficientMap) -> Result<(), ReportError> {
        json::write_report(&self.to_report(coefficients), path)
    }
}
