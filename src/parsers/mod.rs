//! Output parsers, one per metric domain.
//!
//! Every parser is a pure function from raw command output to typed rows:
//! no I/O, no shared state, independently testable against recorded
//! fixture text. Input is normalized (CRLF, stray whitespace, blank
//! lines) before tokenizing, and a parser that cannot find an expected
//! header returns an empty row set instead of panicking; the collector
//! owns the fallback policy.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;
pub mod schema;

/// Trimmed, non-empty lines of a raw output block. Tolerates
/// Windows-style line endings and leading/trailing whitespace.
pub fn clean_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Like [`clean_lines`] but keeps blank lines and leading indentation,
/// for formats where both are meaningful (block-structured output).
pub fn normalized_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(|line| line.trim_end_matches(['\r', ' ', '\t']))
}
