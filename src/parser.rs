//! Turning one raw input line into an ordered list of command invocations.
//!
//! A line is a `;`-separated sequence of statements. Within a statement,
//! every fragment terminated by `&` is a background command and whatever
//! follows the last `&` (or the whole statement when there is none) is the
//! foreground command. A statement may therefore launch any number of
//! background commands and at most one foreground command:
//!
//! ```text
//! sleep 1 & sleep 2 & echo done
//! ```

use crate::lexer::{self, LexingError, MAX_FIELDS};
use std::fmt;

/// One command ready for dispatch: its argument vector and whether the
/// interpreter should wait for it.
///
/// The argument vector borrows from the input line; the command name is
/// `argv[0]`. The parser never produces an empty argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// Command name followed by its arguments, in order.
    pub argv: Vec<&'a str>,
    /// True for `&`-terminated fragments; the interpreter does not wait.
    pub background: bool,
}

impl<'a> Invocation<'a> {
    /// The command name, i.e. the first argument.
    pub fn name(&self) -> &'a str {
        self.argv[0]
    }
}

/// Errors that can occur while parsing a line.
///
/// Both variants are local to the offending line: the caller reports them
/// and goes on reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsingError {
    /// The line contains more `;`-separated statements than allowed.
    TooManyStatements {
        /// The statement limit that was exceeded.
        limit: usize,
    },
    /// A single command carries more arguments than allowed.
    TooManyArguments {
        /// The argument limit that was exceeded.
        limit: usize,
    },
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingError::TooManyStatements { limit } => {
                write!(f, "too many statements on one line (limit {})", limit)
            }
            ParsingError::TooManyArguments { limit } => {
                write!(f, "too many arguments for one command (limit {})", limit)
            }
        }
    }
}

impl std::error::Error for ParsingError {}

/// Parse one raw input line into dispatch-ready invocations.
///
/// Statements and fragments that contain nothing but delimiters and spaces
/// vanish; `";; ;"` parses to an empty list. The order of the result is the
/// dispatch order: background commands of a statement come before its
/// foreground command, statements stay in line order.
pub fn parse_line(line: &str) -> Result<Vec<Invocation<'_>>, ParsingError> {
    let statements = lexer::split_fields(line, &[';'], MAX_FIELDS)
        .map_err(|LexingError::TooManyFields { limit }| ParsingError::TooManyStatements { limit })?;

    let mut invocations = Vec::new();
    for statement in statements {
        let statement = lexer::trim_spaces(statement);

        // Split on `&` without collapsing: a trailing `&` must leave an
        // empty foreground fragment, not promote the last background
        // command to the foreground.
        let fragments: Vec<&str> = statement.split('&').collect();
        let (foreground, background) = fragments.split_last().expect("split yields >= 1");

        for &fragment in background {
            push_fragment(&mut invocations, fragment, true)?;
        }
        push_fragment(&mut invocations, *foreground, false)?;
    }
    Ok(invocations)
}

/// Tokenize one fragment and append it as an invocation; empty fragments
/// are dropped.
fn push_fragment<'a>(
    invocations: &mut Vec<Invocation<'a>>,
    fragment: &'a str,
    background: bool,
) -> Result<(), ParsingError> {
    let fragment = lexer::trim_spaces(fragment);
    let argv = lexer::split_fields(fragment, &[' '], MAX_FIELDS)
        .map_err(|LexingError::TooManyFields { limit }| ParsingError::TooManyArguments { limit })?;
    if !argv.is_empty() {
        invocations.push(Invocation { argv, background });
    }
    Ok(())
}
