use crate::command::{ExitCode, Launcher};
use crate::config::Config;
use crate::env::Environment;
use crate::error::{NcoError, Result};
use crate::external::{SystemLauncher, resolve_program};
use crate::invocation::{self, Invocation};
use crate::registry::Operation;
use crate::request::Request;
use tracing::{debug, info, warn};

/// Result of a successful tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub invocation: Invocation,
    pub code: ExitCode,
    pub stdout: String,
    pub stderr: String,
}

/// Runs NCO operators from typed requests.
///
/// An `Nco` holds only immutable state: the captured [`Environment`], the [`Config`]
/// and a [`Launcher`]. It can be shared between threads; each call spawns its own
/// process and blocks until that process exits. Two concurrent calls writing the
/// same output file are not serialized.
///
/// Example
/// ```
/// use nco_commands::{Nco, Request};
///
/// let nco = Nco::default();
/// let inv = nco
///     .ncra_invocation(Request::new(["85.nc", "86.nc", "87.nc"]).output("8587.nc"))
///     .unwrap();
/// assert_eq!(inv.command_line(), "ncra 85.nc 86.nc 87.nc 8587.nc");
/// ```
pub struct Nco {
    env: Environment,
    config: Config,
    launcher: Box<dyn Launcher>,
}

impl Nco {
    /// Create a runner that spawns real processes in `env`.
    pub fn new(env: Environment, config: Config) -> Self {
        Self::with_launcher(env, config, Box::new(SystemLauncher))
    }

    /// Create a runner with a custom process launcher.
    pub fn with_launcher(env: Environment, config: Config, launcher: Box<dyn Launcher>) -> Self {
        Self {
            env,
            config,
            launcher,
        }
    }

    /// Capture the process environment and read [`Config::from_env`] from it.
    pub fn from_env() -> Self {
        let env = Environment::new();
        let config = Config::from_env(&env);
        Self::new(env, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Build the command for `operation` without running anything.
    pub fn synthesize(&self, operation: Operation, request: &Request) -> Result<Invocation> {
        invocation::synthesize(
            operation,
            request,
            self.config.program_for(operation).to_string(),
            self.env.current_dir.clone(),
        )
    }

    /// Build and run the command for `operation`.
    pub fn execute(&self, operation: Operation, request: &Request) -> Result<Outcome> {
        let invocation = self.synthesize(operation, request)?;
        self.run_invocation(invocation)
    }

    /// Build and run the command for the operator called `name`, e.g. `"ncks"`.
    pub fn run(&self, name: &str, request: &Request) -> Result<Outcome> {
        let operation: Operation = name.parse()?;
        self.execute(operation, request)
    }

    /// Run a previously synthesized command.
    ///
    /// Fails with [`NcoError::ExecutableNotFound`] when the program cannot be
    /// resolved and with [`NcoError::ExternalProcess`] when it exits non-zero.
    pub fn run_invocation(&self, invocation: Invocation) -> Result<Outcome> {
        if self.config.debug {
            info!(command = %invocation, "running");
        } else {
            debug!(command = %invocation, "running");
        }

        let program = resolve_program(
            &invocation.program,
            self.config.bin_dir.as_deref(),
            &self.env,
        )
        .ok_or_else(|| NcoError::ExecutableNotFound {
            program: invocation.program.clone(),
        })?;

        let output = self
            .launcher
            .launch(&program, &invocation.args, &self.env, &invocation.working_dir)
            .map_err(|source| NcoError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !output.success() {
            let stderr = output.stderr_text();
            warn!(program = %invocation.program, code = output.code, "{}", stderr.trim_end());
            return Err(NcoError::ExternalProcess {
                program: invocation.program,
                code: output.code,
                stderr,
            });
        }

        Ok(Outcome {
            code: output.code,
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
            invocation,
        })
    }

    /// `ncks`: extract, subset, print and convert files.
    pub fn ncks(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncks, &request)
    }

    /// `ncra`: average records across one or more files.
    pub fn ncra(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncra, &request)
    }

    /// `ncrcat`: concatenate records, in input order.
    pub fn ncrcat(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncrcat, &request)
    }

    /// `ncecat`: concatenate files along a new record dimension.
    pub fn ncecat(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncecat, &request)
    }

    /// `ncpdq`: permute dimensions and pack data.
    pub fn ncpdq(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncpdq, &request)
    }

    /// `ncwa`: weighted average over dimensions.
    pub fn ncwa(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncwa, &request)
    }

    /// `ncbo`: binary arithmetic between two files.
    pub fn ncbo(&self, request: Request) -> Result<Outcome> {
        self.execute(Operation::Ncbo, &request)
    }

    pub fn ncks_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncks, &request)
    }

    pub fn ncra_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncra, &request)
    }

    pub fn ncrcat_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncrcat, &request)
    }

    pub fn ncecat_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncecat, &request)
    }

    pub fn ncpdq_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncpdq, &request)
    }

    pub fn ncwa_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncwa, &request)
    }

    pub fn ncbo_invocation(&self, request: Request) -> Result<Invocation> {
        self.synthesize(Operation::Ncbo, &request)
    }
}

impl Default for Nco {
    /// Runner for the current process environment with default settings.
    fn default() -> Self {
        Self::new(Environment::new(), Config::default())
    }
}


#[cfg(all(test, unix))]
mod process_tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn nco_in(tmp: &TempDir) -> Nco {
        let mut env = Environment::new().with_current_dir(tmp.path());
        env.set_var("PATH", format!("{}:/usr/bin:/bin", tmp.path().display()));
        Nco::new(env, Config::new().debug(true))
    }

    #[test]
    fn test_exit_code_and_stderr_surface() {
        let tmp = TempDir::new().unwrap();
        script(
            tmp.path(),
            "ncks",
            "echo 'ncks: ERROR unable to open in.nc' >&2\nexit 1",
        );

        let err = nco_in(&tmp)
            .ncks(Request::new("in.nc").output("out.nc"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        match err {
            NcoError::ExternalProcess { code, stderr, .. } => {
                assert_eq!(code, 1);
                assert_eq!(stderr, "ncks: ERROR unable to open in.nc\n");
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[test]
    fn test_child_sees_exact_argv_and_working_dir() {
        let tmp = TempDir::new().unwrap();
        script(
            tmp.path(),
            "ncra",
            "pwd\nfor a in \"$@\"; do echo \"[$a]\"; done",
        );

        let outcome = nco_in(&tmp)
            .ncra(
                Request::new(["85.nc", "86.nc"])
                    .output("8586.nc")
                    .raw("-d 'time,0, 5'"),
            )
            .unwrap();

        let mut lines = outcome.stdout.lines();
        let cwd = lines.next().unwrap();
        assert_eq!(
            fs::canonicalize(cwd).unwrap(),
            fs::canonicalize(tmp.path()).unwrap()
        );
        let args: Vec<&str> = lines.collect();
        assert_eq!(args, vec!["[-d]", "[time,0, 5]", "[85.nc]", "[86.nc]", "[8586.nc]"]);
    }

    #[test]
    fn test_configuration_error_spawns_nothing() {
        let tmp = TempDir::new().unwrap();
        script(tmp.path(), "ncks", "touch spawned");

        let nco = nco_in(&tmp);
        let err = nco
            .ncks(Request::new("in.nc").set("ouptut", "out.nc"))
            .unwrap_err();
        assert!(matches!(err, NcoError::UnrecognizedOption { .. }));
        assert!(!tmp.path().join("spawned").exists());

        nco.ncks(Request::new("in.nc")).unwrap();
        assert!(tmp.path().join("spawned").exists());
    }

    #[test]
    fn test_killed_by_signal() {
        let tmp = TempDir::new().unwrap();
        script(tmp.path(), "ncwa", "kill -9 $$");

        let err = nco_in(&tmp).ncwa(Request::new("in.nc")).unwrap_err();
        assert!(matches!(err, NcoError::ExternalProcess { code: 137, .. }));
    }

    #[test]
    fn test_relative_bin_dir_runs_from_working_dir() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("nco_bin");
        fs::create_dir_all(&bin).unwrap();
        script(&bin, "ncks", "echo from-bin-dir");

        let env = Environment::empty(tmp.path());
        let nco = Nco::new(env, Config::new().bin_dir("nco_bin"));

        let outcome = nco.ncks(Request::new("in.nc")).unwrap();
        assert_eq!(outcome.stdout, "from-bin-dir\n");
    }

    #[test]
    fn test_not_executable_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ncbo"), "plain file").unwrap();

        let err = nco_in(&tmp).ncbo(Request::new(["a.nc", "b.nc"])).unwrap_err();
        assert!(matches!(err, NcoError::Spawn { .. }));
        assert_eq!(err.kind(), ErrorKind::Environment);
    }
}
