//! Scenario execution: process runner, verdicts, checkers, scenarios and the suite engine.
//!
//! ## Flow
//!
//! `SuiteEngine::run` → for each `Scenario` → `process::execute` → `Outcome` →
//! `checker::precondition` → `Checker` → `Verdict` → `SuiteResult`.
//!
//! Execution is strictly sequential: exactly one child process is in flight at a time.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod checker;
pub mod engine;
pub mod process;
pub mod reporter;
pub mod scenario;
pub mod verdict;

pub use checker::{Checker, ExpectedStdout, precondition, run_checker};
pub use engine::SuiteEngine;
pub use process::{InvocationSpec, Outcome, ProcessError, ReturnCodePolicy, RunOutcome, execute};
pub use reporter::{ConsoleReporter, SilentReporter, SuiteReporter};
pub use scenario::{Scenario, ScenarioError, ScenarioRun, Step, StepLog};
pub use verdict::Verdict;
