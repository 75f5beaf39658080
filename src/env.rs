use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process state used by the interpreter.
///
/// The environment contains:
/// - `current_dir`: the working directory commands run in, mutated by `cd`.
/// - `should_exit`: a flag the read loop checks to know when to terminate;
///   set by the `exit` builtin so shutdown can drain background jobs first.
///
/// Child processes inherit the process environment wholesale; only the
/// read path for variables (`HOME`, `PATH`) is exposed here.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the read loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// `current_dir` is initialized from `std::env::current_dir()`; the
    /// `should_exit` flag starts out `false`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            should_exit: false,
        }
    }

    /// Get the value of a process environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        stdenv::var(key).ok()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that read or mutate the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX.get_or_init(|| Mutex::new(())).lock().unwrap()
    }
}
