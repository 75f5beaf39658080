use crate::env::Environment;
use crate::supervisor::Supervisor;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools.
pub type ExitCode = i32;

/// Status a command is observed with when its program image could not be
/// run at all (not found, not executable, spawn refused).
pub const EXEC_FAILURE_STATUS: ExitCode = 6;

/// Object-safe trait for any command the interpreter can dispatch.
///
/// Implemented by built-ins via a blanket impl and by external commands.
/// `output` is where status lines and command diagnostics go; keeping it a
/// parameter (rather than writing to the process stdout directly) lets the
/// interpreter run with a captured transcript under test.
pub trait ExecutableCommand {
    /// Executes the command.
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        supervisor: &mut Supervisor,
        output: &mut dyn Write,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from its argument vector.
///
/// Returns `None` when the factory doesn't recognize the `name`, letting
/// the interpreter fall through to the next factory in its list.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name,
    /// arguments, and foreground/background flag.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
        background: bool,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
