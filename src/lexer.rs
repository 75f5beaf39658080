//! Splitting of raw input text into delimited fields.
//!
//! The same splitter serves two purposes: cutting a line into `;`-separated
//! statements, and cutting a statement (or a fragment of one) into
//! space-separated argument tokens. Fields are borrowed subslices of the
//! input, so the original line stays intact and every field remains readable
//! for as long as the line is alive.

use std::fmt;

/// Hard cap on the number of fields a single split may produce.
///
/// The cap applies independently to the statements of one line and to the
/// argument vector of one command.
pub const MAX_FIELDS: usize = 128;

/// Errors that can occur while splitting input into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexingError {
    /// The input contains more delimited fields than the limit allows.
    TooManyFields {
        /// The limit that was exceeded.
        limit: usize,
    },
}

impl fmt::Display for LexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexingError::TooManyFields { limit } => {
                write!(f, "maximum of {} fields reached", limit)
            }
        }
    }
}

impl std::error::Error for LexingError {}

/// Split `input` into the non-empty runs between delimiter occurrences.
///
/// Consecutive delimiters collapse: an empty field is skipped rather than
/// emitted. A single trailing newline, if present, is stripped before
/// splitting. Returns [`LexingError::TooManyFields`] as soon as the field
/// count would exceed `limit`; the returned vector never grows past it.
pub fn split_fields<'a>(
    input: &'a str,
    delimiters: &[char],
    limit: usize,
) -> Result<Vec<&'a str>, LexingError> {
    let input = input.strip_suffix('\n').unwrap_or(input);
    let mut fields = Vec::new();
    for field in input.split(delimiters) {
        if field.is_empty() {
            continue;
        }
        if fields.len() == limit {
            return Err(LexingError::TooManyFields { limit });
        }
        fields.push(field);
    }
    Ok(fields)
}

/// Strip leading and trailing ASCII spaces, returning a subslice of `input`.
///
/// Only the space character counts as trimmable, matching the argument
/// delimiter. All-space input yields the empty string.
pub fn trim_spaces(input: &str) -> &str {
    input.trim_matches(' ')
}
