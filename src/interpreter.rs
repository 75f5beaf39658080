use crate::command::{CommandFactory, ExitCode};
use crate::env::Environment;
use crate::parser;
use crate::supervisor::Supervisor;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// The prompt printed before every read, interactive or scripted.
const PROMPT: &str = "$ ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and
/// ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter: `;`-separated statements,
/// `&`-terminated background commands, built-in `cd` and `exit`, and
/// child-process supervision with status reporting.
///
/// The interpreter maintains an [`Environment`], a list of
/// [`CommandFactory`] objects that are queried to create commands by name,
/// and a [`Supervisor`] holding the outstanding background jobs. See
/// [`Default`] for the factories included out of the box.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut transcript = Vec::new();
/// sh.eval_line("; ;", &mut transcript).unwrap();
/// assert!(transcript.is_empty());
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    supervisor: Supervisor,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
            supervisor: Supervisor::new(),
        }
    }

    /// True once the `exit` builtin has requested shutdown.
    pub fn exit_requested(&self) -> bool {
        self.env.should_exit
    }

    /// Evaluate one raw input line: parse it and dispatch each resulting
    /// invocation in order, with a non-blocking reap sweep after every
    /// dispatch.
    ///
    /// A parse error (statement or argument cap exceeded) is reported as a
    /// one-line diagnostic on `output` and poisons only this line. Once
    /// `exit` has run, the remaining invocations of the line are skipped.
    pub fn eval_line(&mut self, line: &str, output: &mut dyn Write) -> Result<()> {
        let invocations = match parser::parse_line(line) {
            Ok(invocations) => invocations,
            Err(e) => {
                writeln!(output, "{}", e)?;
                return Ok(());
            }
        };

        for invocation in invocations {
            if self.env.should_exit {
                break;
            }
            self.dispatch(&invocation.argv, invocation.background, output)?;
            self.supervisor.reap_finished(output)?;
        }
        Ok(())
    }

    /// Run a single invocation through the factory list. An empty argument
    /// vector is a no-op.
    fn dispatch(&mut self, argv: &[&str], background: bool, output: &mut dyn Write) -> Result<()> {
        let Some((&name, args)) = argv.split_first() else {
            return Ok(());
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args, background) {
                cmd.execute(&mut self.env, &mut self.supervisor, output)?;
                return Ok(());
            }
        }
        Ok(())
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// Prompts with `$ `, keeps per-session history, and prints
    /// `Shutting down...` on end of input. Returns the interpreter's exit
    /// code.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    self.eval_line(&line, &mut stdout)?;
                    if self.env.should_exit {
                        break;
                    }
                }
                Err(ReadlineError::Eof) => {
                    writeln!(stdout, "\nShutting down...")?;
                    break;
                }
                Err(ReadlineError::Interrupted) => break,
                Err(err) => return Err(err.into()),
            }
        }

        self.shutdown(&mut stdout)?;
        Ok(0)
    }

    /// Evaluate every line of `input` under the same protocol as [`repl`]:
    /// the prompt is printed before each read, so a scripted session
    /// reproduces an interactive transcript.
    ///
    /// Returns the interpreter's exit code: 0 after `exit` or end of
    /// input, 2 on a fatal read error.
    ///
    /// [`repl`]: Interpreter::repl
    pub fn run_script(&mut self, input: impl BufRead, output: &mut dyn Write) -> Result<ExitCode> {
        let mut lines = input.lines();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;
            match lines.next() {
                Some(Ok(line)) => {
                    self.eval_line(&line, output)?;
                    if self.env.should_exit {
                        break;
                    }
                }
                Some(Err(e)) => {
                    eprintln!("Unable to read command line: {}", e);
                    return Ok(2);
                }
                None => {
                    writeln!(output, "\nShutting down...")?;
                    break;
                }
            }
        }

        self.shutdown(output)?;
        Ok(0)
    }

    /// Drain the supervisor: block on every outstanding background job and
    /// report it. Called once when the read loop ends.
    pub fn shutdown(&mut self, output: &mut dyn Write) -> Result<()> {
        self.supervisor.drain(output)
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `cd`, `exit`
    /// - the external command launcher, which must come last because it
    ///   accepts every name
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn transcript(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn blank_lines_and_empty_statements_are_no_ops() {
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("", &mut out).unwrap();
        sh.eval_line("   ", &mut out).unwrap();
        sh.eval_line(";;;   ;", &mut out).unwrap();
        sh.eval_line(" & ", &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn foreground_command_reports_name_and_status() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("false", &mut out).unwrap();
        assert_eq!(transcript(out), "[false exited with status 1]\n");
    }

    #[test]
    #[cfg(unix)]
    fn statements_run_left_to_right() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("false; true", &mut out).unwrap();
        assert_eq!(
            transcript(out),
            "[false exited with status 1]\n[true exited with status 0]\n"
        );
    }

    #[test]
    fn exit_skips_the_rest_of_the_line() {
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("exit; false", &mut out).unwrap();
        assert!(sh.exit_requested());
        assert!(out.is_empty(), "nothing after exit may run: {:?}", out);
    }

    #[test]
    #[cfg(unix)]
    fn cd_failure_does_not_stop_the_line() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("cd /nonexistent_minish_dir; true", &mut out)
            .unwrap();

        let s = transcript(out);
        let diagnostic = s.find("cd: ").expect("cd diagnostic missing");
        let status = s
            .find("[true exited with status 0]")
            .expect("true must still run");
        assert!(diagnostic < status);
    }

    #[test]
    #[cfg(unix)]
    fn background_and_foreground_in_one_statement() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        sh.eval_line("true & false", &mut out).unwrap();
        sh.shutdown(&mut out).unwrap();

        let s = transcript(out);
        assert!(s.contains("[false exited with status 1]"));
        assert!(s.contains("exited with status 0]"));
        assert!(s.contains("[background process "));
    }

    #[test]
    fn parse_errors_poison_only_their_line() {
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        let line = vec!["x"; 200].join(" ");
        sh.eval_line(&line, &mut out).unwrap();

        let s = transcript(out);
        assert!(s.contains("too many arguments"), "got: {s:?}");
        assert!(!sh.exit_requested());
    }

    #[test]
    #[cfg(unix)]
    fn script_session_matches_the_interactive_transcript() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        let code = sh
            .run_script(Cursor::new("true\nexit\n"), &mut out)
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(transcript(out), "$ [true exited with status 0]\n$ ");
    }

    #[test]
    #[cfg(unix)]
    fn script_session_announces_shutdown_on_eof() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        let code = sh.run_script(Cursor::new("true\n"), &mut out).unwrap();

        assert_eq!(code, 0);
        assert_eq!(
            transcript(out),
            "$ [true exited with status 0]\n$ \nShutting down...\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn background_jobs_are_reported_by_script_end() {
        let _lock = crate::env::test_support::lock_current_dir();
        let mut sh = Interpreter::default();
        let mut out = Vec::new();
        let code = sh.run_script(Cursor::new("true &\n"), &mut out).unwrap();

        assert_eq!(code, 0);
        let s = transcript(out);
        assert!(s.contains("Shutting down..."));
        assert!(s.contains("[background process "));
        assert!(s.contains("exited with status 0]"));
    }
}
