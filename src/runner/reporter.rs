//! Progress reporting for warm-up and measured runs.
//!
//! The engine never prints directly: it calls a [`SuiteReporter`] at each milestone. The
//! [`ConsoleReporter`] renders the familiar indented progress log; [`SilentReporter`] drops
//! everything and is what tests and embedders usually want.

use gauntlet_core::strings::capitalize;

use super::verdict::Verdict;

/// Hooks called by the engine while a suite executes.
///
/// `index` values are zero-based; `count` is the number of steps in the scenario.
pub trait SuiteReporter {
    /// Called once before the warm-up pass
    fn on_warm_start(&mut self, _suite: &str) {}

    /// Called once before the measured pass
    fn on_suite_start(&mut self, suite: &str, scenario_count: usize);

    fn on_scenario_start(&mut self, name: &str, step_count: usize);

    fn on_step_start(&mut self, _index: usize, _count: usize) {}

    fn on_step_passed(&mut self, index: usize, count: usize, elapsed_ms: u64);

    fn on_step_failed(&mut self, index: usize, count: usize, verdict: &Verdict);

    fn on_scenario_complete(&mut self, _name: &str, _verdict: &Verdict) {}

    /// Called once after the measured pass
    fn on_run_complete(&mut self, passed: usize, total: usize, elapsed_ms: u64);
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl SuiteReporter for SilentReporter {
    fn on_suite_start(&mut self, _suite: &str, _scenario_count: usize) {}
    fn on_scenario_start(&mut self, _name: &str, _step_count: usize) {}
    fn on_step_passed(&mut self, _index: usize, _count: usize, _elapsed_ms: u64) {}
    fn on_step_failed(&mut self, _index: usize, _count: usize, _verdict: &Verdict) {}
    fn on_run_complete(&mut self, _passed: usize, _total: usize, _elapsed_ms: u64) {}
}

/// Console reporter writing an indented progress log to stdout.
#[derive(Debug)]
pub struct ConsoleReporter {
    indent_width: usize,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

impl ConsoleReporter {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }

    fn println(&self, depth: usize, line: &str) {
        println!("{}", indent_line(self.indent_width * depth, line));
    }
}

const SCENARIO_DEPTH: usize = 1;
const SEQUENCE_DEPTH: usize = 2;
const STEP_DEPTH: usize = 3;

impl SuiteReporter for ConsoleReporter {
    fn on_warm_start(&mut self, suite: &str) {
        println!("=== Warming `{}`...", suite);
    }

    fn on_suite_start(&mut self, suite: &str, _scenario_count: usize) {
        println!("=== Testing `{}`...", suite);
    }

    fn on_scenario_start(&mut self, name: &str, step_count: usize) {
        self.println(SCENARIO_DEPTH, &format!("Test '{}' starts...", name));
        self.println(SEQUENCE_DEPTH, &format!("Running sequence of {} runs:", step_count));
    }

    fn on_step_start(&mut self, index: usize, count: usize) {
        self.println(STEP_DEPTH, &step_prefix(index, count));
    }

    fn on_step_passed(&mut self, index: usize, count: usize, elapsed_ms: u64) {
        self.println(
            STEP_DEPTH,
            &format!("{} ok: passed in {}ms.", step_prefix(index, count), elapsed_ms),
        );
    }

    fn on_step_failed(&mut self, index: usize, count: usize, verdict: &Verdict) {
        for line in failure_lines(index, count, verdict) {
            self.println(STEP_DEPTH, &line);
        }
    }

    fn on_run_complete(&mut self, passed: usize, total: usize, elapsed_ms: u64) {
        println!("{}", "=".repeat(30));
        println!("{}/{} tests passed in {}ms", passed, total, elapsed_ms);
    }
}

fn step_prefix(index: usize, count: usize) -> String {
    format!("Run #{}/{}...", index + 1, count)
}

fn indent_line(width: usize, line: &str) -> String {
    format!("{}{}", " ".repeat(width), line)
}

/// Lines printed for a failed step: header, label with message, then hint or detail dump.
pub fn failure_lines(index: usize, count: usize, verdict: &Verdict) -> Vec<String> {
    let mut lines = vec![
        format!("{} FAILED.", step_prefix(index, count)),
        format!("{}: {}.", capitalize(verdict.label()), verdict.what()),
    ];
    match verdict.hint() {
        Some(hint) => lines.push(format!("Hint: {}.", hint)),
        None => lines.extend(verdict.extended_what().iter().cloned()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use gauntlet_core::VerdictKind;

    use super::*;

    #[test]
    fn test_failure_lines_with_hint() {
        let verdict = Verdict::new(VerdictKind::AssertionFailed, "2 + 7 = 9, (actual: 8)").with_hint("check math");
        assert_eq!(
            failure_lines(0, 1, &verdict),
            vec![
                "Run #1/1... FAILED.".to_string(),
                "Assertion: 2 + 7 = 9, (actual: 8).".to_string(),
                "Hint: check math.".to_string(),
            ]
        );
    }

    #[test]
    fn test_failure_lines_with_dump() {
        let verdict = Verdict::new(VerdictKind::StderrNotEmpty, "below is what was in the stderr").with_detail("x\ny");
        let lines = failure_lines(1, 3, &verdict);
        assert_eq!(lines[0], "Run #2/3... FAILED.");
        assert_eq!(lines[1], "Standard error output is not empty: below is what was in the stderr.");
        assert_eq!(&lines[2..], ["x", "y"]);
    }

    #[test]
    fn test_failure_lines_without_message() {
        let lines = failure_lines(0, 2, &Verdict::bare(VerdictKind::StderrEmpty));
        assert_eq!(lines[1], "Standard error output is empty: no additional information.");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_indent_line() {
        assert_eq!(indent_line(8, "Running"), "        Running");
    }
}
