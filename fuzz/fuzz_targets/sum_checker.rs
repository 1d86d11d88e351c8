#![no_main]

use gauntlet::runner::{Checker, InvocationSpec, Outcome};
use gauntlet::suites::intro::SumChecker;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Captured output is decoded lossily by the runner, so do the same here
    let outcome = Outcome {
        exit_code: 0,
        stdout: String::from_utf8_lossy(data).into_owned(),
        stderr: String::new(),
        start_ms: 0,
        end_ms: 0,
    };
    // The checker must classify any output without panicking
    let _ = SumChecker { a: 2, b: 7 }.check(&InvocationSpec::new(1.0), &outcome);
});
