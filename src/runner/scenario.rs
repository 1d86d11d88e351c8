//! Scenarios: named, ordered sequences of steps scored as one pass/fail unit.
//!
//! ## Execution
//!
//! Steps run strictly left to right. For each step the process runner is invoked, then the
//! uniform precondition check, then the step's checker. The first failure ends the scenario and
//! becomes its verdict; later steps never run. Verdicts of passing steps are not kept, only a
//! per-step [`StepLog`] entry.

use std::collections::BTreeSet;
use std::path::Path;

use gauntlet_core::VerdictKind;
use thiserror::Error;

use super::checker::{Checker, precondition, run_checker};
use super::process::{self, InvocationSpec, RunOutcome};
use super::reporter::SuiteReporter;
use super::verdict::Verdict;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("scenario '{0}' has no steps")]
    Empty(String),
}

/// One process invocation plus an optional checker.
///
/// Without a checker, the uniform precondition check is the entire verification.
pub struct Step {
    invocation: InvocationSpec,
    checker: Option<Box<dyn Checker>>,
}

impl Step {
    pub fn new(invocation: InvocationSpec) -> Self {
        Self {
            invocation,
            checker: None,
        }
    }

    pub fn checked(invocation: InvocationSpec, checker: impl Checker + 'static) -> Self {
        Self {
            invocation,
            checker: Some(Box::new(checker)),
        }
    }

    pub fn invocation(&self) -> &InvocationSpec {
        &self.invocation
    }

    pub fn has_checker(&self) -> bool {
        self.checker.is_some()
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("invocation", &self.invocation)
            .field("checker", &self.checker.as_ref().map(|_| "<checker>"))
            .finish()
    }
}

/// What happened to one step during a measured run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLog {
    pub index: usize,
    pub kind: VerdictKind,
    /// `None` when no outcome was produced (timeout or launch failure).
    pub elapsed_ms: Option<u64>,
}

/// The scenario-level verdict plus the ordered log of executed steps.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub verdict: Verdict,
    pub steps: Vec<StepLog>,
}

#[derive(Debug)]
pub struct Scenario {
    name: String,
    categories: BTreeSet<String>,
    steps: Vec<Step>,
}

impl Scenario {
    /// Build a scenario from a non-empty list of steps. Duplicate categories collapse.
    ///
    /// ## Errors
    ///
    /// Returns [`ScenarioError::Empty`] when `steps` is empty.
    pub fn new<I, S>(name: impl Into<String>, categories: I, steps: Vec<Step>) -> Result<Self, ScenarioError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if steps.is_empty() {
            return Err(ScenarioError::Empty(name));
        }
        Ok(Self {
            name,
            categories: categories.into_iter().map(Into::into).collect(),
            steps,
        })
    }

    /// A scenario with exactly one step.
    pub fn single<I, S>(name: impl Into<String>, categories: I, step: Step) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            steps: vec![step],
        }
    }

    /// Append another step, run after all existing ones.
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn invocations(&self) -> impl Iterator<Item = &InvocationSpec> {
        self.steps.iter().map(Step::invocation)
    }

    /// Execute every step once and discard everything, including launch errors.
    pub fn warm(&self, executable: &Path, timeout_factor: f64) {
        for step in &self.steps {
            let _ = process::execute(executable, &step.invocation, timeout_factor);
        }
    }

    /// Execute the steps in order, stopping at the first failure.
    #[tracing::instrument(skip_all, fields(scenario = %self.name, steps = self.steps.len()))]
    pub fn invoke(&self, executable: &Path, timeout_factor: f64, reporter: &mut dyn SuiteReporter) -> ScenarioRun {
        let count = self.steps.len();
        let mut log = Vec::with_capacity(count);

        for (index, step) in self.steps.iter().enumerate() {
            reporter.on_step_start(index, count);

            let (verdict, elapsed_ms) = run_step(step, executable, timeout_factor);
            log.push(StepLog {
                index,
                kind: verdict.kind(),
                elapsed_ms,
            });

            if verdict.is_failed() {
                tracing::debug!(
                    step = index + 1,
                    verdict = verdict.kind().ident(),
                    stage = ?verdict.kind().stage(),
                    "step failed"
                );
                reporter.on_step_failed(index, count, &verdict);
                return ScenarioRun { verdict, steps: log };
            }

            let elapsed_ms = elapsed_ms.unwrap_or(0);
            tracing::debug!(step = index + 1, elapsed_ms, "step passed");
            reporter.on_step_passed(index, count, elapsed_ms);
        }

        ScenarioRun {
            verdict: Verdict::ok(),
            steps: log,
        }
    }
}

/// Run one step to a verdict. Launch failures and timeouts never escape as errors.
fn run_step(step: &Step, executable: &Path, timeout_factor: f64) -> (Verdict, Option<u64>) {
    let invocation = &step.invocation;

    let outcome = match process::execute(executable, invocation, timeout_factor) {
        Ok(RunOutcome::Completed(outcome)) => outcome,
        Ok(RunOutcome::TimedOut) => {
            let verdict = Verdict::new(
                VerdictKind::Timeout,
                format!("executed in more than {:?}s", invocation.scaled_timeout(timeout_factor)),
            );
            return (verdict, None);
        }
        Err(err) => {
            tracing::warn!(error = %err, "program could not be launched");
            let verdict = Verdict::new(VerdictKind::WrongReturnCode, format!("failed to launch program: {err}"));
            return (verdict, None);
        }
    };
    let elapsed_ms = Some(outcome.elapsed_ms());

    let verdict = precondition(invocation, &outcome);
    if verdict.is_failed() {
        return (verdict, elapsed_ms);
    }

    let verdict = match &step.checker {
        Some(checker) => run_checker(checker.as_ref(), invocation, &outcome),
        None => verdict,
    };
    (verdict, elapsed_ms)
}
