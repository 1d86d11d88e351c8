//! Process runner: one external program invocation with a hard wall-clock deadline.
//!
//! ## Contract
//!
//! - The executable path is made absolute before spawning, so the child's `argv[0]` is always the
//!   absolute path.
//! - The invocation's argument vector (if any) follows `argv[0]`.
//! - The full stdin payload (if any) is written to the child and the pipe is closed. Without a
//!   payload the pipe is closed immediately.
//! - The deadline is `invocation.timeout * timeout_factor` seconds from dispatch and covers both the
//!   child's exit and the collection of its stdout/stderr. When it expires the child is killed and
//!   [`RunOutcome::TimedOut`] is returned; partial output is discarded.
//!
//! One OS process is created per call and always reaped before returning, on every path.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Upper bound on the sleep between two exit-status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Errors that prevent an invocation from producing an outcome at all.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("cannot resolve executable path '{}': {source}", path.display())]
    Resolve { path: PathBuf, source: io::Error },

    #[error("cannot start '{}': {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },

    #[error("I/O error while running '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// How the uniform precondition check treats the child's exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnCodePolicy {
    /// Compare against the expected exit code only when one is supplied.
    #[default]
    MatchIfPresent,
    MustBeZero,
    MustBeNonZero,
}

/// What to run and what to expect from one step of a scenario.
///
/// Built once with the `with_*` methods and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationSpec {
    timeout: f64,
    stdin: Option<String>,
    args: Option<Vec<String>>,
    return_code_policy: ReturnCodePolicy,
    expected_return_code: Option<i32>,
    expected_stdout: Option<String>,
    stderr_should_be_empty: bool,
}

impl InvocationSpec {
    /// Create an invocation with the given timeout in seconds and no stdin, no arguments.
    pub fn new(timeout: f64) -> Self {
        Self {
            timeout,
            stdin: None,
            args: None,
            return_code_policy: ReturnCodePolicy::default(),
            expected_return_code: None,
            expected_stdout: None,
            stderr_should_be_empty: true,
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_return_code_policy(mut self, policy: ReturnCodePolicy) -> Self {
        self.return_code_policy = policy;
        self
    }

    /// Expect an exact exit code. Only consulted under [`ReturnCodePolicy::MatchIfPresent`].
    pub fn with_expected_return_code(mut self, code: i32) -> Self {
        self.expected_return_code = Some(code);
        self
    }

    pub fn with_expected_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.expected_stdout = Some(stdout.into());
        self
    }

    /// Require stderr to be empty (`true`, the default) or non-empty (`false`).
    pub fn with_stderr_should_be_empty(mut self, empty: bool) -> Self {
        self.stderr_should_be_empty = empty;
        self
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn stdin(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    pub fn args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }

    pub fn return_code_policy(&self) -> ReturnCodePolicy {
        self.return_code_policy
    }

    pub fn expected_return_code(&self) -> Option<i32> {
        self.expected_return_code
    }

    pub fn expected_stdout(&self) -> Option<&str> {
        self.expected_stdout.as_deref()
    }

    pub fn stderr_should_be_empty(&self) -> bool {
        self.stderr_should_be_empty
    }

    /// The effective deadline in seconds under `timeout_factor`.
    pub fn scaled_timeout(&self, timeout_factor: f64) -> f64 {
        self.timeout * timeout_factor
    }
}

/// Everything observed from a child that finished before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Milliseconds since the Unix epoch at dispatch.
    pub start_ms: u64,
    /// Milliseconds since the Unix epoch once output was fully collected.
    pub end_ms: u64,
}

impl Outcome {
    pub fn elapsed_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Result of one invocation: either a full outcome or the timeout signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Outcome),
    TimedOut,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Run `executable` once according to `invocation`.
///
/// ## Errors
///
/// Returns [`ProcessError`] when the path cannot be resolved, the child cannot be spawned, or its
/// pipes fail. A deadline expiry is not an error; it is reported as [`RunOutcome::TimedOut`].
#[tracing::instrument(skip_all, fields(executable = %executable.display()))]
pub fn execute(executable: &Path, invocation: &InvocationSpec, timeout_factor: f64) -> Result<RunOutcome, ProcessError> {
    let program = std::path::absolute(executable).map_err(|source| ProcessError::Resolve {
        path: executable.to_path_buf(),
        source,
    })?;

    let mut command = Command::new(&program);
    if let Some(args) = invocation.args() {
        command.args(args);
    }
    command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let timeout_secs = invocation.scaled_timeout(timeout_factor);
    tracing::debug!(
        program = %program.display(),
        argc = invocation.args().map_or(0, <[String]>::len),
        timeout_secs,
        "spawning child"
    );

    let child = command.spawn().map_err(|source| ProcessError::Spawn {
        path: program.clone(),
        source,
    })?;
    let start_ms = now_ms();
    let started = Instant::now();

    let mut guard = ChildGuard::new(child);
    let io_error = |source: io::Error| ProcessError::Io {
        path: program.clone(),
        source,
    };

    guard.feed_stdin(invocation.stdin().map(str::to_owned));
    let stdout_reader = guard.child.stdout.take().map(spawn_reader);
    let stderr_reader = guard.child.stderr.take().map(spawn_reader);
    let deadline = deadline_after(started, timeout_secs);

    let Some(status) = guard.wait_until(deadline).map_err(io_error)? else {
        tracing::warn!(program = %program.display(), timeout_secs, "deadline expired, child killed");
        return Ok(RunOutcome::TimedOut);
    };

    // Descendants of the child may still hold the output pipes open after it exits.
    let Some(stdout) = collect_output(stdout_reader, deadline).map_err(io_error)? else {
        tracing::warn!(program = %program.display(), timeout_secs, "deadline expired while stdout was held open");
        return Ok(RunOutcome::TimedOut);
    };
    let Some(stderr) = collect_output(stderr_reader, deadline).map_err(io_error)? else {
        tracing::warn!(program = %program.display(), timeout_secs, "deadline expired while stderr was held open");
        return Ok(RunOutcome::TimedOut);
    };
    let end_ms = now_ms();

    Ok(RunOutcome::Completed(Outcome {
        exit_code: exit_code_of(status),
        stdout,
        stderr,
        start_ms,
        end_ms,
    }))
}

/// Owned child handle that is killed and reaped when dropped before it was waited on.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self { child, reaped: false }
    }

    /// Write the payload on a detached helper thread so a child that never reads cannot block us.
    ///
    /// Without a payload the pipe is dropped here, closing the child's stdin.
    fn feed_stdin(&mut self, payload: Option<String>) {
        let Some(mut pipe) = self.child.stdin.take() else {
            return;
        };
        let Some(payload) = payload else {
            return;
        };
        thread::spawn(move || {
            // A child that exits without reading closes its end; that is not our failure.
            let _ = pipe.write_all(payload.as_bytes());
        });
    }

    /// Poll until the child exits or `deadline` passes. Returns `None` on timeout, after killing.
    ///
    /// A `None` deadline waits without limit.
    fn wait_until(&mut self, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        self.kill();
                        return Ok(None);
                    }
                    POLL_INTERVAL.min(deadline - now)
                }
                None => POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }

    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        self.kill();
    }
}

/// Deadline `secs` after `start`; `None` when it does not fit in an `Instant`.
fn deadline_after(start: Instant, secs: f64) -> Option<Instant> {
    if secs.is_nan() || secs <= 0.0 {
        return Some(start);
    }
    Duration::try_from_secs_f64(secs).ok().and_then(|d| start.checked_add(d))
}

/// Receives the full contents of one output pipe once it reaches EOF.
type OutputReader = Receiver<io::Result<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> OutputReader {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let read = pipe.read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone once the deadline passed; the bytes are no longer wanted.
        let _ = tx.send(read);
    });
    rx
}

/// Wait for one pipe's contents until `deadline`. `Ok(None)` means the deadline passed first.
fn collect_output(reader: Option<OutputReader>, deadline: Option<Instant>) -> io::Result<Option<String>> {
    let Some(reader) = reader else {
        return Ok(Some(String::new()));
    };
    let received = match deadline {
        Some(deadline) => reader.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => reader.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(read) => Ok(Some(String::from_utf8_lossy(&read?).into_owned())),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("output reader thread panicked")),
    }
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    // Signal deaths are reported as the negated signal number.
    status.code().or_else(|| status.signal().map(|s| -s)).unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
