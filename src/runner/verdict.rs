//! Immutable verdicts: a taxonomy tag plus diagnostic text.
//!
//! Extended detail is either a single hint line or a verbatim multi-line dump, never both. The
//! constructors enforce this: [`Verdict::with_hint`] always stores exactly one line and
//! [`Verdict::with_detail`] clears the hint flag.

use gauntlet_core::{VerdictKind, split_lines};

/// Shown when a verdict carries no message of its own.
pub const NO_ADDITIONAL_INFORMATION: &str = "no additional information";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    kind: VerdictKind,
    what: Option<String>,
    extended_what: Vec<String>,
    extended_what_is_hint: bool,
}

impl Verdict {
    pub fn ok() -> Self {
        Self::bare(VerdictKind::Success)
    }

    /// A verdict of `kind` with no message.
    pub fn bare(kind: VerdictKind) -> Self {
        Self {
            kind,
            what: None,
            extended_what: Vec::new(),
            extended_what_is_hint: false,
        }
    }

    pub fn new(kind: VerdictKind, what: impl Into<String>) -> Self {
        Self {
            what: Some(what.into()),
            ..Self::bare(kind)
        }
    }

    /// Attach a verbatim dump; the text is split into lines at every line boundary, lone `\r`
    /// included.
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.extended_what = split_lines(detail).into_iter().map(str::to_owned).collect();
        self.extended_what_is_hint = false;
        self
    }

    /// Attach already-split detail lines.
    pub fn with_detail_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extended_what = lines.into_iter().map(Into::into).collect();
        self.extended_what_is_hint = false;
        self
    }

    /// Attach a one-line hint. Embedded line breaks are folded into spaces.
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.extended_what = vec![split_lines(hint).join(" ")];
        self.extended_what_is_hint = true;
        self
    }

    pub fn kind(&self) -> VerdictKind {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }

    pub fn is_failed(&self) -> bool {
        !self.is_success()
    }

    /// The taxonomy label, e.g. `timeout expired`.
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn what(&self) -> &str {
        self.what.as_deref().unwrap_or(NO_ADDITIONAL_INFORMATION)
    }

    pub fn extended_what(&self) -> &[String] {
        &self.extended_what
    }

    pub fn extended_what_is_hint(&self) -> bool {
        self.extended_what_is_hint
    }

    /// The hint line, if the extended detail is a hint.
    pub fn hint(&self) -> Option<&str> {
        if self.extended_what_is_hint {
            self.extended_what.first().map(String::as_str)
        } else {
            None
        }
    }
}
