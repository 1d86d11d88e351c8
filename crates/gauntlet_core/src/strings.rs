//! Diagnostic text helpers.
//!
//! Captured program output ends up inside single-line diagnostics (console output and report
//! fields), so the few control characters that would break a line are rendered as their
//! two-character escapes.
//!
//! ## Notes
//! - Only `\n`, `\r` and `\t` are escaped. Every other character, including other control
//!   characters and backslashes, passes through unchanged.

/// Escape `\n`, `\r` and `\t` as the two-character sequences `\n`, `\r`, `\t`.
///
/// ## Parameters
/// - `s`: raw text, usually captured stdout or an argument.
///
/// ## Returns
/// - `String`: the escaped text.
///
/// ## Examples
/// ```rust
/// use gauntlet_core::strings::escape;
///
/// assert_eq!(escape("a\tb\n"), "a\\tb\\n");
/// ```
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether `c` ends a line: `\n`, `\r`, vertical tab, form feed, the file/group/record
/// separators `\x1c`..`\x1e`, NEL, and the Unicode line and paragraph separators.
pub fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `s` into lines at every [`is_line_boundary`] character, treating `\r\n` as one boundary.
///
/// Boundaries are not included in the lines. A trailing boundary does not produce an empty last
/// line, so `"a\n"` is one line and `""` is none.
///
/// ## Examples
/// ```rust
/// use gauntlet_core::strings::split_lines;
///
/// assert_eq!(split_lines("9\r5\n"), ["9", "5"]);
/// assert_eq!(split_lines("a\r\nb"), ["a", "b"]);
/// ```
pub fn split_lines(s: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&s[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && chars.peek().map(|&(_, next)| next) == Some('\n') {
            chars.next();
            start += 1;
        }
    }
    if start < s.len() {
        lines.push(&s[start..]);
    }
    lines
}

/// Uppercase the first character of `s`, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape("a\tb\n"), "a\\tb\\n");
        assert_eq!(escape("\r\n"), "\\r\\n");
    }

    #[test]
    fn test_escape_passes_other_characters() {
        assert_eq!(escape("plain text"), "plain text");
        assert_eq!(escape("back\\slash"), "back\\slash");
        assert_eq!(escape("bell\x07"), "bell\x07");
        assert_eq!(escape("ünï"), "ünï");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_split_lines_boundaries() {
        assert_eq!(split_lines("9\r5\n"), ["9", "5"]);
        assert_eq!(split_lines("a\x0bb\x0cc\x1cd\x1de\x1ef"), ["a", "b", "c", "d", "e", "f"]);
        assert_eq!(split_lines("a\u{85}b\u{2028}c\u{2029}"), ["a", "b", "c"]);
        assert_eq!(split_lines("x\r\n\r\ny"), ["x", "", "y"]);
    }

    #[test]
    fn test_split_lines_trailing_and_empty() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), [""]);
        assert_eq!(split_lines("9\n"), ["9"]);
        assert_eq!(split_lines("a\r"), ["a"]);
        assert_eq!(split_lines("no boundary"), ["no boundary"]);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("timeout expired"), "Timeout expired");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("A"), "A");
    }
}
