//! Typed command synthesis for the NCO (netCDF Operators) tool family.
//!
//! This crate turns a named operator (`ncks`, `ncra`, `ncrcat`, `ncpdq`, ...), its
//! input and output files and a set of named options into the exact argument vector
//! the external tool expects, and optionally runs it. Options are checked against a
//! static per-operator registry, so a misspelt key fails before anything is spawned.
//!
//! The main entry point is [`Nco`], which has one method per operator and a
//! name-keyed [`Nco::run`]. Requests are built with [`Request`]; [`Nco::synthesize`]
//! produces an [`Invocation`] without running it. The [`command`] and [`env`]
//! modules expose the [`command::Launcher`] seam and the process [`env::Environment`]
//! handed to every child.
//!
//! ```
//! use nco_commands::{Nco, Operation, Request};
//!
//! let nco = Nco::default();
//! let request = Request::new("in.nc").output("out.nc").fortran().dimension("lon,1,2");
//! let inv = nco.synthesize(Operation::Ncks, &request).unwrap();
//! assert_eq!(inv.args, ["-F", "-d", "lon,1,2", "in.nc", "out.nc"]);
//! ```

pub mod command;
mod config;
pub mod env;
mod error;
mod external;
mod invocation;
mod lexer;
mod nco;
mod registry;
mod request;

pub use command::{ExitCode, Launcher, ProcessOutput};
pub use config::{BIN_DIR_VAR, Config, DEBUG_VAR};
pub use error::{ErrorKind, NcoError, Result};
pub use external::{SystemLauncher, find_command_path, resolve_program};
pub use invocation::{Advisory, Invocation, synthesize};
pub use lexer::{LexingError, split_into_tokens};
pub use nco::{Nco, Outcome};
pub use registry::{FILE_FORMATS, FlagRule, Operation, OperationSpec, OptionRule};
pub use request::{FileFormat, Input, OptionValue, Request};
