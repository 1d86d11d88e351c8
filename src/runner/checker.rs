//! Checker contract and the uniform precondition check.
//!
//! Every step's outcome first goes through [`precondition`], which is identical for all scenarios.
//! Only when it passes does the step's [`Checker`] (if any) judge domain correctness.

use std::panic::{self, AssertUnwindSafe};

use gauntlet_core::{VerdictKind, escape};

use super::process::{InvocationSpec, Outcome, ReturnCodePolicy};
use super::verdict::Verdict;

/// Judges the domain-specific correctness of one step's captured output.
///
/// Implementations must turn malformed output into a verdict ([`VerdictKind::TypeError`] or
/// [`VerdictKind::InvalidFormat`]) instead of panicking. A panic is still contained by
/// [`run_checker`], but loses the checker's own message.
pub trait Checker {
    fn check(&self, invocation: &InvocationSpec, outcome: &Outcome) -> Verdict;
}

impl<F> Checker for F
where
    F: Fn(&InvocationSpec, &Outcome) -> Verdict,
{
    fn check(&self, invocation: &InvocationSpec, outcome: &Outcome) -> Verdict {
        self(invocation, outcome)
    }
}

/// Compares stdout against [`InvocationSpec::expected_stdout`] when one is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedStdout;

impl Checker for ExpectedStdout {
    fn check(&self, invocation: &InvocationSpec, outcome: &Outcome) -> Verdict {
        match invocation.expected_stdout() {
            Some(expected) if expected != outcome.stdout => Verdict::new(VerdictKind::AssertionFailed, "stdout mismatch")
                .with_detail_lines([
                    format!("expected: \"{}\"", escape(expected)),
                    format!("actual: \"{}\"", escape(&outcome.stdout)),
                ]),
            _ => Verdict::ok(),
        }
    }
}

/// Uniform checks applied to every outcome before any checker. The first failing check wins:
/// stderr emptiness, then the return-code policy.
pub fn precondition(invocation: &InvocationSpec, outcome: &Outcome) -> Verdict {
    let stderr_is_empty = outcome.stderr.is_empty();

    if invocation.stderr_should_be_empty() && !stderr_is_empty {
        return Verdict::new(VerdictKind::StderrNotEmpty, "below is what was in the stderr").with_detail(&outcome.stderr);
    }
    if !invocation.stderr_should_be_empty() && stderr_is_empty {
        return Verdict::bare(VerdictKind::StderrEmpty);
    }

    let actual = outcome.exit_code;
    match invocation.return_code_policy() {
        ReturnCodePolicy::MustBeZero if actual != 0 => {
            Verdict::new(VerdictKind::WrongReturnCode, format!("expected 0, but actual is {actual}"))
        }
        ReturnCodePolicy::MustBeNonZero if actual == 0 => Verdict::new(
            VerdictKind::WrongReturnCode,
            format!("expected non-zero returncode, but actual is {actual}"),
        ),
        ReturnCodePolicy::MatchIfPresent => match invocation.expected_return_code() {
            Some(expected) if expected != actual => Verdict::new(
                VerdictKind::WrongReturnCode,
                format!("expected {expected}, but actual is {actual}"),
            ),
            _ => Verdict::ok(),
        },
        _ => Verdict::ok(),
    }
}

/// Run `checker`, converting a panic into a [`VerdictKind::TypeError`] verdict carrying the escaped
/// raw stdout.
pub fn run_checker(checker: &dyn Checker, invocation: &InvocationSpec, outcome: &Outcome) -> Verdict {
    panic::catch_unwind(AssertUnwindSafe(|| checker.check(invocation, outcome))).unwrap_or_else(|_| {
        tracing::warn!("checker panicked, reporting as type error");
        Verdict::new(
            VerdictKind::TypeError,
            format!("can't interpret \"{}\"", escape(&outcome.stdout)),
        )
    })
}
