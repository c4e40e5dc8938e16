use crate::error::SessionError;
use crate::mi::StreamKind;

/// Channel of a message shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageChannel {
    /// Debugger console output.
    Console,

    /// Output of the inferior, forwarded by the debugger or read from its
    /// terminal.
    Target,

    /// Internal debugger log.
    DebuggerLog,

    /// Diagnostic messages of the session itself.
    Engine,
}

impl From<StreamKind> for MessageChannel {
    fn from(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Console => Self::Console,
            StreamKind::Target => Self::Target,
            StreamKind::Log => Self::DebuggerLog,
        }
    }
}

/// Trait for implementing the consumer of session events.
///
/// Every callback is invoked from the session's event loop, one at a time.
pub trait EventHandler {
    /// Function called with text meant for a log view.
    fn show_message(&mut self, _text: &str, _channel: MessageChannel) {}

    /// Function called with short user-facing status text.
    fn show_status(&mut self, _text: &str) {}

    /// Function called once the inferior is attached or loaded.
    fn inferior_prepared(&mut self) {}

    /// Function called once the inferior was started by the debugger.
    fn inferior_started(&mut self) {}

    /// Function called when the inferior has stopped.
    ///
    /// `reason` is the stop reason reported by the debugger, if any.
    fn inferior_stopped(&mut self, _reason: Option<&str>) {}

    /// Function called when the inferior has exited.
    ///
    /// `exit_code` is `None` when the inferior was killed by a signal.
    fn inferior_exited(&mut self, _exit_code: Option<i32>) {}

    /// Function called when the session enters its failure state.
    fn session_failed(&mut self, _error: &SessionError) {}
}

impl EventHandler for () {}
