//! Bookkeeping for child processes.
//!
//! The supervisor owns every background child from spawn until its exit
//! status has been reported, so no finished command is ever lost: the
//! interpreter runs a non-blocking reap sweep after each dispatch and a
//! blocking drain at shutdown.

use crate::command::ExitCode;
use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Child, ExitStatus};

/// Registry of outstanding background children plus the wait primitives
/// for foreground commands.
#[derive(Debug, Default)]
pub struct Supervisor {
    jobs: Vec<Child>,
}

impl Supervisor {
    /// Create a supervisor with no registered children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand a freshly spawned background child over to the supervisor.
    ///
    /// The child stays registered until a reap sweep or the shutdown drain
    /// reports its exit status.
    pub fn register(&mut self, child: Child) {
        self.jobs.push(child);
    }

    /// Number of background children not yet reported.
    pub fn outstanding(&self) -> usize {
        self.jobs.len()
    }

    /// Block until this specific foreground child exits and return its
    /// exit code.
    pub fn wait_foreground(&mut self, mut child: Child) -> Result<ExitCode> {
        let status = child.wait().context("wait failed")?;
        Ok(exit_code(status))
    }

    /// Report every registered child that has already finished, without
    /// blocking.
    ///
    /// Children that are still running stay registered for a later sweep.
    pub fn reap_finished(&mut self, output: &mut dyn Write) -> Result<()> {
        let mut index = 0;
        while index < self.jobs.len() {
            match self.jobs[index].try_wait().context("wait failed")? {
                Some(status) => {
                    let child = self.jobs.swap_remove(index);
                    report_background(output, &child, status)?;
                }
                None => index += 1,
            }
        }
        Ok(())
    }

    /// Block on every remaining registered child and report it.
    ///
    /// Called once at shutdown so each background command's status is
    /// reported exactly once, even when the interpreter exits before the
    /// command does.
    pub fn drain(&mut self, output: &mut dyn Write) -> Result<()> {
        for mut child in self.jobs.drain(..) {
            let status = child.wait().context("wait failed")?;
            report_background(output, &child, status)?;
        }
        Ok(())
    }
}

fn report_background(output: &mut dyn Write, child: &Child, status: ExitStatus) -> Result<()> {
    writeln!(
        output,
        "[background process {} exited with status {}]",
        child.id(),
        exit_code(status)
    )?;
    Ok(())
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::{Duration, Instant};

    fn spawn_sh(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .spawn()
            .expect("spawn sh")
    }

    #[test]
    fn reaping_with_no_children_writes_nothing() {
        let mut supervisor = Supervisor::new();
        let mut out = Vec::new();
        supervisor.reap_finished(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(supervisor.outstanding(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn foreground_wait_returns_the_exit_code() {
        let mut supervisor = Supervisor::new();
        let child = spawn_sh("exit 3");
        let code = supervisor.wait_foreground(child).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    #[cfg(unix)]
    fn drain_reports_every_registered_child() {
        let mut supervisor = Supervisor::new();
        let first = spawn_sh("exit 7");
        let second = spawn_sh("exit 0");
        let first_pid = first.id();
        let second_pid = second.id();
        supervisor.register(first);
        supervisor.register(second);

        let mut out = Vec::new();
        supervisor.drain(&mut out).unwrap();
        assert_eq!(supervisor.outstanding(), 0);

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains(&format!(
            "[background process {} exited with status 7]",
            first_pid
        )));
        assert!(transcript.contains(&format!(
            "[background process {} exited with status 0]",
            second_pid
        )));
    }

    #[test]
    #[cfg(unix)]
    fn reap_sweeps_eventually_report_a_finished_child() {
        let mut supervisor = Supervisor::new();
        let child = spawn_sh("exit 5");
        let pid = child.id();
        supervisor.register(child);

        let mut out = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while supervisor.outstanding() > 0 {
            assert!(Instant::now() < deadline, "child was never reaped");
            supervisor.reap_finished(&mut out).unwrap();
            std::thread::sleep(Duration::from_millis(10));
        }

        let transcript = String::from_utf8(out).unwrap();
        assert_eq!(
            transcript,
            format!("[background process {} exited with status 5]\n", pid)
        );
    }

    #[test]
    #[cfg(unix)]
    fn reap_leaves_running_children_registered() {
        let mut supervisor = Supervisor::new();
        let child = spawn_sh("sleep 5");
        supervisor.register(child);

        let mut out = Vec::new();
        supervisor.reap_finished(&mut out).unwrap();
        assert_eq!(supervisor.outstanding(), 1);
        assert!(out.is_empty());

        // Don't leave the sleeper around for the rest of the test run.
        let mut jobs = std::mem::take(&mut supervisor.jobs);
        for child in &mut jobs {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
