use crate::mi::{ParseError, ResultClass};
use crate::state::DebuggerState;

/// Collaborator (launcher/channel) error.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct ChannelError<E>(pub E);

/// Error raised by a debugging session.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The debugger could not be started.
    #[error("Engine setup failed: {0}")]
    EngineSetupFailed(String),

    /// The inferior could not be attached or loaded.
    #[error("{0}")]
    InferiorSetupFailed(String),

    /// The inferior could not be started.
    #[error("Engine run failed: {0}")]
    EngineRunFailed(String),

    /// A response was received for a token that was never issued (or was
    /// already answered).
    #[error("Response for unknown command token {0}")]
    UnmatchedToken(u64),

    /// A result record was received without any token.
    #[error("Untagged ^{0} response")]
    MissingToken(ResultClass),

    /// The debugger output could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An operation (or a response) was issued in the wrong state.
    #[error("{operation} requires state {expected}, session is in state {actual}")]
    UnexpectedState {
        /// Name of the rejected operation.
        operation: &'static str,

        /// State required by the operation.
        expected: DebuggerState,

        /// Current state of the session.
        actual: DebuggerState,
    },

    /// The state machine does not allow this transition.
    #[error("Invalid state transition {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: DebuggerState,

        /// Requested state.
        to: DebuggerState,
    },

    /// The inferior process ID is unknown (yet).
    #[error("Inferior process ID unknown")]
    MissingInferiorPid,

    /// The debugger output stream was closed before the session ended.
    #[error("Debugger channel closed with {pending} command(s) pending")]
    ChannelClosed {
        /// Number of commands left without response.
        pending: usize,
    },

    /// The session has terminated (failed or shut down), so no command is
    /// issued anymore.
    #[error("Session terminated in state {0}")]
    SessionTerminated(DebuggerState),
}

impl SessionError {
    /// Returns whether this error is a protocol violation.
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedToken(_)
                | Self::MissingToken(_)
                | Self::Parse(_)
                | Self::UnexpectedState { .. }
                | Self::InvalidTransition { .. }
        )
    }
}

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error<E> {
    /// A collaborator (launcher or channel) error occurred.
    #[error(transparent)]
    Channel(#[from] ChannelError<E>),

    /// The debugging session failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type of the session operations.
pub type SessionResult<T> = core::result::Result<T, SessionError>;

/// Result type of this crate.
pub type Result<T, E> = core::result::Result<T, Error<E>>;
