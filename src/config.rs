use crate::env::Environment;
use crate::registry::Operation;
use std::collections::HashMap;
use std::path::PathBuf;

/// Variable that turns on command echoing, e.g. `NCO_DEBUG=1`.
pub const DEBUG_VAR: &str = "NCO_DEBUG";
/// Variable naming a directory searched for NCO tools before `PATH`.
pub const BIN_DIR_VAR: &str = "NCO_BIN_DIR";

/// Settings shared by every call made through one [`crate::Nco`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Log each synthesized command line at `info` level before running it.
    pub debug: bool,
    /// Searched for executables before the `PATH` directories.
    pub bin_dir: Option<PathBuf>,
    /// Replacement executables, keyed by operation.
    pub programs: HashMap<Operation, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`DEBUG_VAR`] and [`BIN_DIR_VAR`] from `env`.
    pub fn from_env(env: &Environment) -> Self {
        let debug = env.get_var(DEBUG_VAR).is_some_and(parse_flag);
        let bin_dir = env
            .get_var(BIN_DIR_VAR)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        Self {
            debug,
            bin_dir,
            programs: HashMap::new(),
        }
    }

    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }

    /// Run `program` instead of the operation's default executable.
    ///
    /// `program` may be a bare name (looked up like the default) or a path.
    pub fn program(mut self, operation: Operation, program: impl Into<String>) -> Self {
        self.programs.insert(operation, program.into());
        self
    }

    /// The executable to look up for `operation`.
    pub fn program_for(&self, operation: Operation) -> &str {
        self.programs
            .get(&operation)
            .map(String::as_str)
            .unwrap_or(operation.name())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
