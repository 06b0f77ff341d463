use crate::command::{ExitCode, Launcher, ProcessOutput};
use crate::env::Environment;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tracing::debug;

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        env: &Environment,
        working_dir: &Path,
    ) -> io::Result<ProcessOutput> {
        let output = std::process::Command::new(program)
            .args(args)
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()?;
        Ok(ProcessOutput {
            code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn exit_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
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

/// Find the executable for `program`, the way [`crate::Nco`] does before spawning.
///
/// A bare name is looked up in `bin_dir` first and then in the `PATH` of `env`;
/// anything with a path separator is resolved against `env.current_dir`. Relative
/// `bin_dir` and `PATH` entries are resolved against `env.current_dir` too, since that
/// is where the child starts. The result is absolute, so the launched file is the one
/// that was checked.
pub fn resolve_program(program: &str, bin_dir: Option<&Path>, env: &Environment) -> Option<PathBuf> {
    let path = Path::new(program);
    if let Some(dir) = bin_dir {
        if path.components().count() == 1 {
            let candidate = env.current_dir.join(dir).join(path);
            if let Some(found) = find_by_path(&candidate) {
                let found = absolute(found);
                debug!(program, path = %found.display(), "found in bin dir");
                return Some(found);
            }
        }
    }

    let search_paths = env.get_var("PATH").unwrap_or_default();
    let found = find_command_path(OsStr::new(search_paths), path, &env.current_dir).map(|p| absolute(&p));
    match &found {
        Some(p) => debug!(program, path = %p.display(), "resolved executable"),
        None => debug!(program, "executable not found"),
    }
    found
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - `./foo`, or relative with multiple components (e.g., `bin/ncks`): resolved
///   against `base`, returned if it exists.
/// - Single path component (no separators): search each directory in `search_paths`
///   (PATH, relative entries taken from `base`) and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path(search_paths: &OsStr, path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return find_by_path(path).map(Path::to_path_buf);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, _) => None,
        (Some(std::path::Component::Normal(x)), None) => find_in_path(search_paths, x, base),
        // Multiple components, or `./foo` -> relative to base
        _ => find_by_path(&base.join(path)).map(Path::to_path_buf),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr, base: &Path) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = base.join(dir).join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}
