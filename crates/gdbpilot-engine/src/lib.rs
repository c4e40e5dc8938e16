//! This crate drives a GDB/MI debugging session.
//!
//! Three main components are provided:
//! - A session engine ([GdbEngine](self::engine::GdbEngine)), a state machine
//!   which issues debugger commands and reacts to their responses. It doesn't
//!   perform any I/O.
//! - A trait to implement a custom event handler, allowing to consume session
//!   events (e.g., status changes, stopped or exited inferior).
//! - A controller, which starts the debugger process through a
//!   [Launcher](self::launcher::Launcher) and runs the session until it
//!   terminates.
//!
//! # Driving a session
//!
//! ```no_run
//! use gdbpilot_engine::launcher::Launcher;
//! use gdbpilot_engine::{Controller, EventHandler, Request};
//!
//! async fn attach<L: Launcher>(launcher: L) {
//!     let controller = Controller::builder()
//!         .with_launcher(launcher)
//!         .with_event_handler(StatusPrinter)
//!         .attach(4242)
//!         .build();
//!
//!     // interrupt the inferior right away, then end the session
//!     let requests = futures_util::stream::iter([Request::Interrupt, Request::Shutdown]);
//!
//!     let Ok((summary, _)) = controller.run(requests).await else {
//!         return;
//!     };
//!
//!     println!("inferior {:?}", summary.inferior_pid);
//! }
//!
//! struct StatusPrinter;
//!
//! impl EventHandler for StatusPrinter {
//!     fn show_status(&mut self, text: &str) {
//!         println!("{text}");
//!     }
//! }
//! ```
//!
//! # Implementing a custom launcher
//!
//! The [Launcher](self::launcher::Launcher)/[Channel](self::launcher::Channel)
//! traits allow to start the debugger process in arbitrary ways (e.g., a local
//! process, a remote shell). A local `gdb` implementation is provided by
//! `gdbpilot-gdb`.

/// Module implementing the session controller.
pub mod controller;

/// Module implementing the matching of responses with their commands.
pub mod dispatch;

/// Module implementing the debugging session.
pub mod engine;

mod error;

/// Module containing traits for handling session events.
pub mod handler;

/// Module containing traits for implementing a custom launcher.
pub mod launcher;

/// Module implementing the GDB/MI output syntax.
pub mod mi;

/// Module containing the start configuration of a session.
pub mod params;

/// Module implementing the session state machine.
pub mod state;

pub use self::controller::{Controller, Request};
pub use self::engine::{DebuggerEngine, GdbEngine, SessionSummary};
pub use self::error::{ChannelError, Error, Result, SessionError, SessionResult};
pub use self::handler::{EventHandler, MessageChannel};
pub use self::params::{CommandEnv, LaunchSpec, StartMode, StartParameters, Target};
pub use self::state::DebuggerState;
