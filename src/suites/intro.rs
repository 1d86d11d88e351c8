//! `intro`: read two integers from stdin and print their sum.
//!
//! One scenario per pair `a` in `-5..10`, `b` in `6..9`; each is a single step with stdin `"a b"`
//! that must exit with code 0, write nothing to stderr, and print exactly `a + b` followed by one
//! newline.

use std::num::IntErrorKind;

use gauntlet_core::{VerdictKind, escape, split_lines};

use super::Testsuite;
use crate::runner::{Checker, InvocationSpec, Outcome, ReturnCodePolicy, Scenario, Step, SuiteEngine, Verdict};

const SUITE_NAME: &str = "intro";
const TIMEOUT_SECS: f64 = 1.0;
pub const CATEGORY: &str = "a + b";

pub struct Intro;

impl Testsuite for Intro {
    fn name(&self) -> &'static str {
        SUITE_NAME
    }

    fn category_env_names(&self) -> &'static [(&'static str, &'static str)] {
        &[(CATEGORY, "A_PLUS_B")]
    }

    fn build_engine(&self) -> SuiteEngine {
        let mut engine = SuiteEngine::new(SUITE_NAME);
        for a in -5..10 {
            for b in 6..9 {
                engine.add(scenario(a, b));
            }
        }
        engine
    }
}

pub fn scenario(a: i64, b: i64) -> Scenario {
    let invocation = InvocationSpec::new(TIMEOUT_SECS)
        .with_stdin(format!("{a} {b}"))
        .with_return_code_policy(ReturnCodePolicy::MustBeZero);
    Scenario::single(format!("{a} + {b}"), [CATEGORY], Step::checked(invocation, SumChecker { a, b }))
}

/// Checks that stdout is exactly `a + b` and a newline.
#[derive(Debug, Clone, Copy)]
pub struct SumChecker {
    pub a: i64,
    pub b: i64,
}

impl Checker for SumChecker {
    fn check(&self, _invocation: &InvocationSpec, outcome: &Outcome) -> Verdict {
        let output = outcome.stdout.as_str();
        if !output.ends_with('\n') {
            return Verdict::new(VerdictKind::InvalidFormat, "newline at stdout's end expected");
        }

        let lines = split_lines(output);
        let [line] = lines.as_slice() else {
            return Verdict::new(VerdictKind::InvalidFormat, "single line expected");
        };
        if *line != line.trim() {
            return Verdict::new(VerdictKind::InvalidFormat, "found unexpected space characters in stdout");
        }

        let expected = self.a + self.b;
        let actual = match line.parse::<i64>() {
            Ok(actual) if actual == expected => return Verdict::ok(),
            Ok(actual) => actual.to_string(),
            // Too large for `i64`, but still an integer, and never the expected sum.
            Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                canonical_integer(line)
            }
            Err(_) => {
                return Verdict::new(
                    VerdictKind::TypeError,
                    format!("can't convert \"{}\" to integer", escape(output)),
                );
            }
        };

        Verdict::new(
            VerdictKind::AssertionFailed,
            format!("{} + {} = {}, (actual: {})", self.a, self.b, expected, actual),
        )
        .with_hint("check math")
    }
}

/// Decimal spelling of an overflowing integer literal: no `+` sign, no leading zeros.
fn canonical_integer(literal: &str) -> String {
    let (sign, digits) = match literal.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", literal.strip_prefix('+').unwrap_or(literal)),
    };
    format!("{sign}{}", digits.trim_start_matches('0'))
}
