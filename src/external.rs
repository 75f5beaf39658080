use crate::command::{CommandFactory, EXEC_FAILURE_STATUS, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::supervisor::Supervisor;
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command that is not a builtin: launched as a child process inheriting
/// the interpreter's standard streams and working directory.
pub struct ExternalCommand {
    /// The command name as typed, used in status lines.
    name: String,
    /// Resolved program path, or `None` when resolution failed.
    executable: Option<OsString>,
    args: Vec<OsString>,
    background: bool,
}

impl CommandFactory for Factory<ExternalCommand> {
    /// Accepts every name; this factory must therefore sit last in the
    /// interpreter's factory list.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
        background: bool,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(name))
            .map(PathBuf::into_os_string);
        Some(Box::new(ExternalCommand {
            name: name.to_string(),
            executable,
            args: args.iter().map(|x| x.into()).collect(),
            background,
        }))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        supervisor: &mut Supervisor,
        output: &mut dyn Write,
    ) -> Result<ExitCode> {
        let Some(executable) = &self.executable else {
            return self.report_exec_failure(output, "command not found");
        };

        let spawned = std::process::Command::new(executable)
            .args(&self.args)
            .current_dir(&env.current_dir)
            .spawn();

        match spawned {
            Ok(child) => {
                if self.background {
                    supervisor.register(child);
                    Ok(0)
                } else {
                    let code = supervisor.wait_foreground(child)?;
                    writeln!(output, "[{} exited with status {}]", self.name, code)?;
                    Ok(code)
                }
            }
            Err(e) => self.report_exec_failure(output, &e.to_string()),
        }
    }
}

impl ExternalCommand {
    /// A command whose program image cannot be run counts as having exited
    /// with the distinguished status 6. Foreground commands still get
    /// their status line; a failed background command has no pid to report
    /// later, so only the diagnostic appears.
    fn report_exec_failure(&self, output: &mut dyn Write, reason: &str) -> Result<ExitCode> {
        writeln!(output, "Exec failed: {}: {}", self.name, reason)?;
        if !self.background {
            writeln!(
                output,
                "[{} exited with status {}]",
                self.name, EXEC_FAILURE_STATUS
            )?;
        }
        Ok(EXEC_FAILURE_STATUS)
    }
}

/// Resolve a command path the way `execvp` would.
///
/// Behavior:
/// - Absolute path: returned if it exists.
/// - Relative path with multiple components (e.g. `bin/tool`) or a
///   `./`-prefixed path: returned if it exists relative to the current
///   directory.
/// - Single bare component: search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: `None`.
pub fn find_command_path(search_paths: &OsStr, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    let bare = path.components().nth(1).is_none() && !path.starts_with("./");
    if !bare {
        return path.exists().then(|| path.to_path_buf());
    }

    std::env::split_paths(search_paths)
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
}
