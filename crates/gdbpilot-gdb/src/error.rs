use std::path::PathBuf;

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Debugger spawn error.
    #[error("{0}: {1}")]
    Spawn(PathBuf, std::io::Error),

    /// Line framing error on the debugger pipes.
    #[error(transparent)]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    /// Framing error on the inferior terminal.
    #[error("inferior terminal: {0}")]
    Tty(#[from] tokio_util::codec::AnyDelimiterCodecError),

    #[error("os error: {0}")]
    Os(#[from] nix::Error),

    #[error("invalid process ID: {0}")]
    InvalidPid(u64),

    #[error("missing debugger {0} pipe")]
    MissingPipe(&'static str),

    #[error("debugger input already closed")]
    InputClosed,
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
