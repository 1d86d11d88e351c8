#![forbid(unsafe_code)]
//! gauntlet: a black-box conformance harness
//!
//! The harness launches an externally supplied executable repeatedly with scripted inputs,
//! classifies each observation (exit code, stdout, stderr, wall-clock time) against a fixed verdict
//! taxonomy, and aggregates results into a weighted score per category.
//!
//! ## Layout
//!
//! - `runner`: process runner with timeout, verdicts, checker contract, scenarios, suite engine
//! - `report`: suite results, category scoring, JSON report export
//! - `config`: harness settings and category coefficients
//! - `suites`: registry of built-in suites
//! - `cli`: command-line surface
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli`, `runner` and `report`
//!   modules enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Checkers**: a panicking checker is contained and reported as a `type error` verdict; it never aborts a suite.

pub mod cli;
pub mod config;
pub mod report;
pub mod runner;
pub mod suites;
pub mod version;

pub use gauntlet_core::{VerdictKind, escape};

pub use config::{CoefficientMap, CoefficientSource, EnvCoefficients, FixedCoefficients, HarnessConfig};
pub use report::{Report, ScenarioRecord, SuiteResult};
pub use runner::{Checker, InvocationSpec, Outcome, ReturnCodePolicy, Scenario, Step, SuiteEngine, Verdict};
