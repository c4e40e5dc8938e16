//! Crate implementing the CLI commands.

mod cli;
mod config;
mod console;
mod run;

pub use self::cli::{CliAction, CliOpts};
pub use self::config::{EnvVar, GdbArg, SessionConfig};
pub use self::console::{ConsoleHandler, parse_request};
pub use self::run::{evaluate_attach, evaluate_run};
