//! Verdict taxonomy vocabulary.
//!
//! This module defines the fixed, mutually exclusive set of outcome kinds a scenario can end in,
//! together with their stable identifiers and display labels.
//!
//! ## Notes
//! - The display label is what console output and the JSON report's `verdict` field show. Report
//!   consumers match on it, so labels are part of the external contract.
//! - The stable id is a snake-case spelling used in structured log fields.
//! - The stage records which layer of the harness produced a verdict; it is logged next to the id.
//!
//! ## Examples
//! ```rust
//! use gauntlet_core::verdict::{self, VerdictKind, VerdictStage};
//!
//! assert_eq!(verdict::label(VerdictKind::InvalidFormat), "invalid format");
//! assert_eq!(VerdictKind::Timeout.ident(), "timeout");
//! assert_eq!(VerdictKind::Timeout.stage(), VerdictStage::Runner);
//! ```

/// Which layer of the harness produces a verdict kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictStage {
    /// The scenario passed.
    Pass,
    /// Produced by the process runner itself.
    Runner,
    /// Produced by the uniform stderr / return-code checks.
    Precondition,
    /// Produced by a scenario-specific checker.
    Checker,
}

/// Stable identifier for a verdict kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VerdictKind {
    Success,
    WrongReturnCode,
    /// Domain-specific checker mismatch.
    AssertionFailed,
    Timeout,
    StderrEmpty,
    StderrNotEmpty,
    /// Output could not be parsed into the expected type.
    TypeError,
    /// Output is structurally malformed (line count, stray whitespace).
    InvalidFormat,
}

impl VerdictKind {
    /// Return the display label for this kind.
    pub fn label(self) -> &'static str {
        label(self)
    }

    /// Return the stable snake-case id for this kind.
    pub fn ident(self) -> &'static str {
        info_for(self).ident
    }

    /// Return the harness layer that produces this kind.
    pub fn stage(self) -> VerdictStage {
        stage(self)
    }

    pub fn is_success(self) -> bool {
        self == VerdictKind::Success
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata for a verdict kind.
#[derive(Debug, Clone, Copy)]
pub struct VerdictInfo {
    pub id: VerdictKind,
    pub ident: &'static str,
    pub label: &'static str,
    pub stage: VerdictStage,
}

/// Registry of all verdict kinds.
pub const VERDICTS: &[VerdictInfo] = &[
    info(VerdictKind::Success, "success", "success", VerdictStage::Pass),
    info(
        VerdictKind::WrongReturnCode,
        "wrong_return_code",
        "program returns wrong returncode",
        VerdictStage::Precondition,
    ),
    info(
        VerdictKind::AssertionFailed,
        "assertion_failed",
        "assertion",
        VerdictStage::Checker,
    ),
    info(VerdictKind::Timeout, "timeout", "timeout expired", VerdictStage::Runner),
    info(
        VerdictKind::StderrEmpty,
        "stderr_empty",
        "standard error output is empty",
        VerdictStage::Precondition,
    ),
    info(
        VerdictKind::StderrNotEmpty,
        "stderr_not_empty",
        "standard error output is not empty",
        VerdictStage::Precondition,
    ),
    info(VerdictKind::TypeError, "type_error", "type error", VerdictStage::Checker),
    info(
        VerdictKind::InvalidFormat,
        "invalid_format",
        "invalid format",
        VerdictStage::Checker,
    ),
];

/// Return the display label for a verdict kind.
pub fn label(id: VerdictKind) -> &'static str {
    info_for(id).label
}

/// Return the stage that produces a verdict kind.
pub fn stage(id: VerdictKind) -> VerdictStage {
    info_for(id).stage
}

/// Return the full metadata entry for a verdict kind.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: VerdictKind) -> &'static VerdictInfo {
    VERDICTS
        .iter()
        .find(|v| v.id == id)
        .expect("verdict info missing")
}

const fn info(id: VerdictKind, ident: &'static str, label: &'static str, stage: VerdictStage) -> VerdictInfo {
    VerdictInfo {
        id,
        ident,
        label,
        stage,
    }
}
