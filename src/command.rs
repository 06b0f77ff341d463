use crate::env::Environment;
use std::io;
use std::path::Path;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Processes killed by a signal report `128 + signal`, as POSIX shells do.
pub type ExitCode = i32;

/// Everything a finished child process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: ExitCode,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Starts an already resolved executable and waits for it to finish.
///
/// [`crate::Nco`] talks to processes only through this trait, so tests and embedders
/// can record or fake executions. The default implementation spawns a real child
/// process with [`std::process::Command`].
pub trait Launcher: Send + Sync {
    /// Runs `program` with exactly `args`, the variables of `env`, and `working_dir`
    /// as its current directory, capturing both output streams.
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        env: &Environment,
        working_dir: &Path,
    ) -> io::Result<ProcessOutput>;
}
