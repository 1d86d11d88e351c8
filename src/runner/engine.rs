//! Suite engine: warm-up pass and measured pass over an ordered scenario list.

use std::path::Path;
use std::time::Instant;

use crate::report::{ScenarioRecord, SuiteResult};

use super::reporter::SuiteReporter;
use super::scenario::Scenario;

/// Owns the scenarios of one suite, in registration order.
///
/// Scenarios may be appended until the first run; execution only ever reads them.
#[derive(Debug)]
pub struct SuiteEngine {
    name: String,
    scenarios: Vec<Scenario>,
}

impl SuiteEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    pub fn add(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Run every step of every scenario once, discarding all outcomes.
    ///
    /// Amortizes first-run costs (page cache, dynamic loading) before the measured pass. Nothing
    /// observed here influences [`SuiteEngine::run`].
    #[tracing::instrument(skip_all, fields(suite = %self.name))]
    pub fn warm(&self, executable: &Path, timeout_factor: f64, reporter: &mut dyn SuiteReporter) {
        reporter.on_warm_start(&self.name);
        for scenario in &self.scenarios {
            scenario.warm(executable, timeout_factor);
        }
    }

    /// Execute every scenario in order and collect one verdict per scenario.
    ///
    /// A failing scenario never stops the suite.
    #[tracing::instrument(skip_all, fields(suite = %self.name, scenarios = self.scenarios.len()))]
    pub fn run(&self, executable: &Path, timeout_factor: f64, reporter: &mut dyn SuiteReporter) -> SuiteResult {
        reporter.on_suite_start(&self.name, self.scenarios.len());
        tracing::info!(suite = %self.name, scenarios = self.scenarios.len(), "measured run started");

        let mut result = SuiteResult::new();
        let started = Instant::now();

        for (id, scenario) in self.scenarios.iter().enumerate() {
            reporter.on_scenario_start(scenario.name(), scenario.steps().len());
            let run = scenario.invoke(executable, timeout_factor, reporter);
            tracing::debug!(
                scenario = scenario.name(),
                verdict = run.verdict.kind().ident(),
                steps_run = run.steps.len(),
                "scenario finished"
            );
            reporter.on_scenario_complete(scenario.name(), &run.verdict);
            result.add(ScenarioRecord::from_run(id, scenario, run));
        }

        result.set_elapsed_ms(started.elapsed().as_millis() as u64);
        tracing::info!(
            suite = %self.name,
            passed = result.passed(),
            total = result.total(),
            elapsed_ms = result.elapsed_ms(),
            "measured run finished"
        );
        reporter.on_run_complete(result.passed(), result.total(), result.elapsed_ms());
        result
    }
}
