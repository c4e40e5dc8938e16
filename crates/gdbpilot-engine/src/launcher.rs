use std::future::Future;

use crate::params::LaunchSpec;

/// Trait implementing the spawning logic of a debugger process.
pub trait Launcher {
    /// Communication channel returned by this launcher.
    type Channel: Channel<Error: Into<Self::Error>>;

    /// Error returned by this trait.
    type Error: std::error::Error;

    /// Starts the debugger process described by `spec`.
    fn launch(
        &mut self,
        spec: LaunchSpec,
    ) -> impl Future<Output = Result<Self::Channel, Self::Error>>;
}

/// Trait implementing the line-based communication with a running debugger
/// process.
pub trait Channel {
    /// Error returned by this trait.
    type Error: std::error::Error;

    /// Sends a single command line (without trailing newline).
    fn send(&mut self, line: &str) -> impl Future<Output = Result<(), Self::Error>>;

    /// Receives the next output line (without trailing newline), either from
    /// the debugger or from the terminal of its inferior.
    ///
    /// `None` is returned once the debugger output stream is closed.
    ///
    /// # Note
    ///
    /// The returned future must be cancel-safe: if dropped before completion,
    /// no line is lost.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Output>, Self::Error>>;

    /// Interrupts the process `pid`, outside of the command stream.
    fn interrupt(&mut self, pid: u64) -> Result<(), Self::Error>;

    /// Terminates the debugger process.
    fn terminate(&mut self) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Output line received from a running debugger process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// GDB/MI output of the debugger.
    Debugger(String),

    /// Output of the inferior, read from its own terminal.
    Inferior(String),
}
