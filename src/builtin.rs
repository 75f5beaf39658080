use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::supervisor::Supervisor;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process. Because no child
/// exists, builtins produce no `[... exited with status n]` line.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command against the interpreter's environment.
    ///
    /// Return value should follow shell conventions: 0 for success,
    /// non-zero for error.
    fn execute(self, env: &mut Environment, output: &mut dyn Write) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        _supervisor: &mut Supervisor,
        output: &mut dyn Write,
    ) -> Result<ExitCode> {
        match T::execute(*self, env, output) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(output, "{:#}", e)?;
                Ok(1)
            }
        }
    }
}

/// Pseudo-command replaying `argh`'s usage or help text when a builtin's
/// arguments did not parse.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _env: &mut Environment,
        _supervisor: &mut Supervisor,
        output: &mut dyn Write,
    ) -> Result<ExitCode> {
        output.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    // Builtins ignore the background flag: they run before any process
    // would be created, so `cd /tmp &` still changes the interpreter's
    // directory and `exit &` still shuts it down.
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
        _background: bool,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, env: &mut Environment, _output: &mut dyn Write) -> Result<ExitCode> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                if let Some(home) = env.get_var("HOME") {
                    PathBuf::from(home)
                } else {
                    return Err(anyhow::anyhow!("cd: no target and HOME not set"));
                }
            }
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Shut the interpreter down with status 0.
pub struct Exit {
    #[argh(positional, greedy)]
    /// accepted and ignored, as the historical behavior has it
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, env: &mut Environment, _output: &mut dyn Write) -> Result<ExitCode> {
        // Raise the flag instead of exiting on the spot so the read loop
        // can stop and drain outstanding background jobs first.
        env.should_exit = true;
        Ok(0)
    }
}
