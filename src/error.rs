use crate::command::ExitCode;
use crate::lexer::LexingError;
use thiserror::Error;

/// Broad class of a failure, so callers can tell a misconfigured call apart
/// from a tool that ran and failed or a tool that could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before any process was spawned.
    Configuration,
    /// The external process ran and exited non-zero.
    Execution,
    /// The executable could not be found or started.
    Environment,
}

#[derive(Error, Debug)]
pub enum NcoError {
    #[error("{operation}: unrecognized option `{key}`")]
    UnrecognizedOption {
        operation: &'static str,
        key: String,
    },

    #[error("{operation}: invalid value for `{key}`: {reason}")]
    InvalidOptionValue {
        operation: &'static str,
        key: String,
        reason: String,
    },

    #[error("malformed raw options: {0}")]
    MalformedOptions(#[from] LexingError),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("executable not found: {program}")]
    ExecutableNotFound { program: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    ExternalProcess {
        program: String,
        code: ExitCode,
        stderr: String,
    },
}

impl NcoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NcoError::UnrecognizedOption { .. }
            | NcoError::InvalidOptionValue { .. }
            | NcoError::MalformedOptions(_)
            | NcoError::UnknownOperation(_) => ErrorKind::Configuration,
            NcoError::ExternalProcess { .. } => ErrorKind::Execution,
            NcoError::ExecutableNotFound { .. } | NcoError::Spawn { .. } => {
                ErrorKind::Environment
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, NcoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        let config = NcoError::UnrecognizedOption {
            operation: "ncks",
            key: "bogus".to_string(),
        };
        let exec = NcoError::ExternalProcess {
            program: "ncks".to_string(),
            code: 1,
            stderr: "ncks: ERROR".to_string(),
        };
        let env = NcoError::ExecutableNotFound {
            program: "ncks".to_string(),
        };

        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert_eq!(exec.kind(), ErrorKind::Execution);
        assert_eq!(env.kind(), ErrorKind::Environment);
    }

    #[test]
    fn test_display_keeps_stderr_verbatim() {
        let err = NcoError::ExternalProcess {
            program: "ncra".to_string(),
            code: 1,
            stderr: "ncra: ERROR no variables fit criteria".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ncra exited with code 1: ncra: ERROR no variables fit criteria"
        );
    }
}
