//! Provide the shared verdict vocabulary and pure text helpers for the gauntlet harness.
//!
//! This crate is intentionally small and dependency-free. It holds the pieces that every layer of
//! the harness (runner, checkers, report export, console output) must spell the same way:
//! - the verdict taxonomy: stable ids, display labels, and lookup helpers
//! - diagnostic escaping and line splitting of captured program output
//!
//! ## Notes
//!
//! - **No IO**, no global state, and no harness-specific types.

pub mod strings;
pub mod verdict;

pub use strings::{escape, split_lines};
pub use verdict::VerdictKind;
