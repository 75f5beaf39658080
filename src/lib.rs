//! A tiny, embeddable line-oriented command interpreter.
//!
//! This crate reads textual command lines, splits them into executable
//! commands and arguments, launches external programs, and reports their
//! completion status. A line is a `;`-separated sequence of statements;
//! within a statement, `&`-terminated fragments run in the background and
//! the residue runs in the foreground, awaited before the next statement.
//! It is intentionally small and easy to read, suitable for coursework and
//! experiments with process management and argument parsing.
//!
//! The main entry point is [`Interpreter`], which evaluates lines using a
//! set of pluggable command factories. The public modules [`command`],
//! [`parser`], and [`supervisor`] expose the traits and types for
//! implementing your own commands and for inspecting parsed invocations
//! and background-job bookkeeping.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
pub mod parser;
pub mod supervisor;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
