//! Engine tests against real child processes.
//!
//! Every program under test is `/bin/sh -c <script>`, so no executable files are written while
//! other tests in this binary are spawning processes.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use gauntlet::runner::{
    ExpectedStdout, InvocationSpec, Outcome, ReturnCodePolicy, RunOutcome, Scenario, SilentReporter, Step,
    SuiteEngine, Verdict, execute,
};
use gauntlet::suites::intro::SumChecker;
use gauntlet::{CoefficientMap, VerdictKind};

const SH: &str = "/bin/sh";

fn sh() -> &'static Path {
    Path::new(SH)
}

fn script(body: &str) -> InvocationSpec {
    InvocationSpec::new(2.0).with_args(["-c", body])
}

/// A scenario shaped like the `intro` suite's, but with the program's behaviour given as a script.
fn sum_scenario(name: &str, body: &str) -> Scenario {
    let invocation = script(body)
        .with_stdin("2 7")
        .with_return_code_policy(ReturnCodePolicy::MustBeZero);
    Scenario::single(name, ["a + b"], Step::checked(invocation, SumChecker { a: 2, b: 7 }))
}

fn run_one(scenario: Scenario) -> Verdict {
    let mut engine = SuiteEngine::new("test");
    engine.add(scenario);
    let result = engine.run(sh(), 1.0, &mut SilentReporter);
    result.records()[0].verdict.clone()
}

/// Checker that records how often it was consulted.
fn counting_checker(counter: Arc<AtomicUsize>) -> impl Fn(&InvocationSpec, &Outcome) -> Verdict {
    move |_: &InvocationSpec, _: &Outcome| {
        counter.fetch_add(1, Ordering::SeqCst);
        Verdict::ok()
    }
}

// ============================================================================
// Process runner
// ============================================================================

#[test]
fn argv0_is_absolute_even_for_relative_paths() {
    let cwd = std::env::current_dir().unwrap();
    let depth = cwd.components().count() - 1;
    let relative: PathBuf = std::iter::repeat_n("..", depth).collect::<PathBuf>().join("bin/sh");
    assert!(relative.is_relative());

    let outcome = match execute(&relative, &script("printf '%s' \"$0\""), 1.0).unwrap() {
        RunOutcome::Completed(outcome) => outcome,
        RunOutcome::TimedOut => panic!("echo timed out"),
    };
    assert!(outcome.stdout.starts_with('/'), "argv[0] was {:?}", outcome.stdout);
    assert!(outcome.stdout.ends_with("bin/sh"), "argv[0] was {:?}", outcome.stdout);
}

#[test]
fn args_follow_argv0_in_order() {
    let spec = InvocationSpec::new(1.0).with_args(["-c", "printf '%s|' \"$@\"", "argv0", "one", "two words"]);
    let RunOutcome::Completed(outcome) = execute(sh(), &spec, 1.0).unwrap() else {
        panic!("timed out");
    };
    assert_eq!(outcome.stdout, "one|two words|");
}

#[test]
fn full_stdin_payload_is_delivered() {
    let payload = "line one\nline two\n".repeat(20_000);
    let spec = script("cat").with_stdin(payload.clone()).with_expected_stdout(payload);
    let scenario = Scenario::single("cat", ["io"], Step::checked(spec, ExpectedStdout));
    assert!(run_one(scenario).is_success());
}

#[test]
fn captures_exit_code_stdout_stderr_and_timestamps() {
    let RunOutcome::Completed(outcome) = execute(sh(), &script("echo out; echo err >&2; exit 3"), 1.0).unwrap() else {
        panic!("timed out");
    };
    assert_eq!(outcome.exit_code, 3);
    assert_eq!(outcome.stdout, "out\n");
    assert_eq!(outcome.stderr, "err\n");
    assert!(outcome.end_ms >= outcome.start_ms);
}

#[test]
fn deadline_kills_the_child() {
    let started = Instant::now();
    let outcome = execute(sh(), &InvocationSpec::new(0.2).with_args(["-c", "exec sleep 5"]), 1.0).unwrap();
    assert_eq!(outcome, RunOutcome::TimedOut);
    assert!(started.elapsed().as_secs_f64() < 4.0);
}

#[test]
fn deadline_covers_output_held_open_by_background_children() {
    let spec = InvocationSpec::new(0.3).with_args(["-c", "sleep 3 & echo hi"]);
    let started = Instant::now();
    let outcome = execute(sh(), &spec, 1.0).unwrap();
    assert_eq!(outcome, RunOutcome::TimedOut);
    assert!(
        started.elapsed().as_secs_f64() < 2.0,
        "returned after {:?}",
        started.elapsed()
    );
}

#[test]
fn background_child_inside_the_deadline_still_completes() {
    let spec = InvocationSpec::new(3.0).with_args(["-c", "sleep 0.2 & echo hi"]);
    let RunOutcome::Completed(outcome) = execute(sh(), &spec, 1.0).unwrap() else {
        panic!("timed out");
    };
    assert_eq!(outcome.stdout, "hi\n");
}

#[test]
fn timeout_factor_scales_the_deadline() {
    let spec = InvocationSpec::new(0.1).with_args(["-c", "sleep 0.4"]);
    assert_eq!(execute(sh(), &spec, 1.0).unwrap(), RunOutcome::TimedOut);
    assert!(matches!(execute(sh(), &spec, 30.0).unwrap(), RunOutcome::Completed(_)));
}

// ============================================================================
// Scenario verdicts
// ============================================================================

#[test]
fn correct_sum_passes() {
    let verdict = run_one(sum_scenario("ok", "read a b; echo $((a + b))"));
    assert_eq!(verdict.kind(), VerdictKind::Success, "{}", verdict.what());
}

#[test]
fn trailing_space_is_invalid_format() {
    let verdict = run_one(sum_scenario("space", "printf '9 \\n'"));
    assert_eq!(verdict.kind(), VerdictKind::InvalidFormat);
}

#[test]
fn non_numeric_output_is_type_error() {
    let verdict = run_one(sum_scenario("abc", "echo abc"));
    assert_eq!(verdict.kind(), VerdictKind::TypeError);
    assert_eq!(verdict.what(), "can't convert \"abc\\n\" to integer");
}

#[test]
fn wrong_sum_is_assertion_failure() {
    let verdict = run_one(sum_scenario("eight", "echo 8"));
    assert_eq!(verdict.kind(), VerdictKind::AssertionFailed);
    assert_eq!(verdict.what(), "2 + 7 = 9, (actual: 8)");
}

#[test]
fn stderr_output_wins_over_correct_stdout() {
    let verdict = run_one(sum_scenario("noisy", "echo debug >&2; echo 9"));
    assert_eq!(verdict.kind(), VerdictKind::StderrNotEmpty);
    assert_eq!(verdict.extended_what(), ["debug"]);
}

#[test]
fn nonzero_exit_is_wrong_return_code() {
    let verdict = run_one(sum_scenario("exit", "echo 9; exit 2"));
    assert_eq!(verdict.kind(), VerdictKind::WrongReturnCode);
    assert_eq!(verdict.what(), "expected 0, but actual is 2");
}

#[test]
fn expected_return_code_is_matched() {
    let spec = script("exit 4").with_expected_return_code(4);
    assert!(run_one(Scenario::single("four", ["rc"], Step::new(spec))).is_success());

    let spec = script("exit 5").with_expected_return_code(4);
    assert_eq!(
        run_one(Scenario::single("five", ["rc"], Step::new(spec))).what(),
        "expected 4, but actual is 5"
    );
}

#[test]
fn timeout_skips_the_checker() {
    let calls = Arc::new(AtomicUsize::new(0));
    let spec = InvocationSpec::new(0.2).with_args(["-c", "exec sleep 5"]);
    let scenario = Scenario::single("sleepy", ["t"], Step::checked(spec, counting_checker(calls.clone())));

    let verdict = run_one(scenario);
    assert_eq!(verdict.kind(), VerdictKind::Timeout);
    assert_eq!(verdict.what(), "executed in more than 0.2s");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn first_failing_step_ends_the_scenario() {
    let calls = Arc::new(AtomicUsize::new(0));
    let scenario = Scenario::new(
        "three steps",
        ["seq"],
        vec![
            Step::checked(script("true"), counting_checker(calls.clone())),
            Step::new(script("exit 1").with_return_code_policy(ReturnCodePolicy::MustBeZero)),
            Step::checked(script("true"), counting_checker(calls.clone())),
        ],
    )
    .unwrap();

    let mut engine = SuiteEngine::new("seq");
    engine.add(scenario);
    let result = engine.run(sh(), 1.0, &mut SilentReporter);
    let record = &result.records()[0];

    assert_eq!(record.verdict.kind(), VerdictKind::WrongReturnCode);
    assert_eq!(record.steps.len(), 2);
    assert_eq!(record.steps[0].kind, VerdictKind::Success);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn passing_scenario_reports_the_last_checker_verdict() {
    let scenario = Scenario::single("first", ["c"], Step::new(script("true"))).then(Step::checked(
        script("echo hi"),
        |_: &InvocationSpec, out: &Outcome| {
            if out.stdout == "hi\n" {
                Verdict::ok()
            } else {
                Verdict::new(VerdictKind::AssertionFailed, "expected hi")
            }
        },
    ));
    assert!(run_one(scenario).is_success());
}

#[test]
fn nonempty_stderr_can_be_required() {
    let spec = script("true").with_stderr_should_be_empty(false);
    let verdict = run_one(Scenario::single("quiet", ["e"], Step::new(spec)));
    assert_eq!(verdict.kind(), VerdictKind::StderrEmpty);
}

// ============================================================================
// Suite engine
// ============================================================================

fn mixed_engine() -> SuiteEngine {
    let mut engine = SuiteEngine::new("mixed");
    engine.add(sum_scenario("pass", "read a b; echo $((a + b))"));
    engine.add(sum_scenario("fail", "echo 8"));
    engine.add(sum_scenario("pass again", "echo 9"));
    engine
}

#[test]
fn failures_do_not_stop_the_suite_and_order_is_kept() {
    let result = mixed_engine().run(sh(), 1.0, &mut SilentReporter);

    let names: Vec<_> = result.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["pass", "fail", "pass again"]);
    let ids: Vec<_> = result.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, [0, 1, 2]);
    assert_eq!(result.passed(), 2);
    assert_eq!(result.total(), 3);
    assert_eq!(result.exit_code(), 1);

    let coefficients: CoefficientMap = [("a + b".to_string(), 1.0)].into_iter().collect();
    assert!((result.weighted_score(&coefficients) - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn warm_up_does_not_change_verdicts() {
    let engine = mixed_engine();
    let kinds = |engine: &SuiteEngine| -> Vec<VerdictKind> {
        engine
            .run(sh(), 1.0, &mut SilentReporter)
            .records()
            .iter()
            .map(|r| r.verdict.kind())
            .collect()
    };

    let cold = kinds(&engine);
    engine.warm(sh(), 1.0, &mut SilentReporter);
    engine.warm(sh(), 1.0, &mut SilentReporter);
    let warm = kinds(&engine);
    assert_eq!(cold, warm);
}

#[test]
fn warm_up_survives_unlaunchable_programs() {
    let engine = mixed_engine();
    engine.warm(Path::new("/definitely/not/here"), 1.0, &mut SilentReporter);
    let result = engine.run(Path::new("/definitely/not/here"), 1.0, &mut SilentReporter);
    assert_eq!(result.passed(), 0);
    assert!(
        result
            .records()
            .iter()
            .all(|r| r.verdict.what().starts_with("failed to launch program"))
    );
}
