use std::fs::{File, OpenOptions};
use std::os::fd::{FromRawFd, IntoRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;

use futures_util::StreamExt;
use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt};
use tokio::net::unix::pipe;
use tokio_util::codec::{AnyDelimiterCodec, FramedRead};

use crate::error::Error;

/// Pseudo-terminal handed to the inferior, so that its I/O stays off the
/// debugger pipes.
pub(crate) struct InferiorTty {
    /// Path of the terminal (e.g., `/dev/pts/3`).
    path: String,

    /// Keeps the terminal alive in between inferior runs, otherwise reading
    /// the master side fails with `EIO`.
    _slave: File,

    output: FramedRead<pipe::Receiver, AnyDelimiterCodec>,
}

impl InferiorTty {
    /// Allocates a new pseudo-terminal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open() -> Result<Self, Error> {
        let master =
            posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC)?;

        grantpt(&master)?;
        unlockpt(&master)?;

        let path = ptsname_r(&master)?;

        let slave = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_NOCTTY.bits())
            .open(&path)?;

        // SAFETY: the descriptor was released by `master`, so it has no
        // other owner.
        let master = unsafe { OwnedFd::from_raw_fd(master.into_raw_fd()) };

        // not a FIFO, but read the same way
        let receiver = pipe::Receiver::from_file_unchecked(File::from(master))?;

        tracing::debug!(path = %path, "inferior terminal opened");

        Ok(Self {
            path,
            _slave: slave,
            output: FramedRead::new(receiver, AnyDelimiterCodec::new(b"\n".to_vec(), Vec::new())),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the next output line of the inferior.
    ///
    /// This method is cancel-safe.
    pub async fn next_line(&mut self) -> Option<Result<String, Error>> {
        let line = self.output.next().await?;

        Some(
            line.map(|line| {
                String::from_utf8_lossy(&line)
                    .trim_end_matches('\r')
                    .to_owned()
            })
            .map_err(Error::from),
        )
    }
}
