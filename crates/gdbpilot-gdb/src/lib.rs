//! This crate provides a launcher of a local `gdb` process (to be used with
//! `gdbpilot-engine`).
//!
//! The debugger is spawned as a child process, and the GDB/MI dialog happens
//! over its standard input and output. An inferior started by the debugger
//! gets a pseudo-terminal of its own, whose output is relayed separately.
//!
//! <div class="warning">
//!
//! *This crate is not meant to be used on its own! It merely implements the
//! interface (traits) provided by `gdbpilot-engine`, so that a session can
//! drive a debugger running on the same host.*
//!
//! </div>

mod channel;
mod error;
mod launcher;
mod tty;

pub use self::channel::GdbChannel;
pub use self::error::{Error, Result};
pub use self::launcher::{DEFAULT_EXIT_TIMEOUT, GdbLauncher};
