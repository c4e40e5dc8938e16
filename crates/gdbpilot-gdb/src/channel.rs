use std::pin::pin;
use std::time::Duration;

use futures_util::future::{Either, select};
use futures_util::{SinkExt, StreamExt};
use gdbpilot_engine::launcher::Output;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::error::Error;
use crate::tty::InferiorTty;

/// Line-based communication with a local debugger process.
pub struct GdbChannel {
    child: Child,

    /// `None` once the debugger was asked to exit.
    stdin: Option<FramedWrite<ChildStdin, LinesCodec>>,

    stdout: FramedRead<ChildStdout, LinesCodec>,

    /// Terminal of the inferior, if it has one.
    tty: Option<InferiorTty>,

    exit_timeout: Duration,
}

impl GdbChannel {
    pub(crate) fn new(
        child: Child,
        stdin: ChildStdin,
        stdout: ChildStdout,
        tty: Option<InferiorTty>,
        exit_timeout: Duration,
    ) -> Self {
        Self {
            child,
            stdin: Some(FramedWrite::new(stdin, LinesCodec::new())),
            stdout: FramedRead::new(stdout, LinesCodec::new()),
            tty,
            exit_timeout,
        }
    }

    /// Returns the path of the inferior terminal, if any.
    pub fn inferior_tty(&self) -> Option<&str> {
        self.tty.as_ref().map(InferiorTty::path)
    }

    /// Returns the process ID of the debugger, unless it has exited.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

impl gdbpilot_engine::launcher::Channel for GdbChannel {
    type Error = Error;

    async fn send(&mut self, line: &str) -> Result<(), Self::Error> {
        let stdin = self.stdin.as_mut().ok_or(Error::InputClosed)?;
        stdin.send(line).await?;

        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Output>, Self::Error> {
        loop {
            let Some(tty) = self.tty.as_mut() else {
                let line = self.stdout.next().await.transpose()?;
                return Ok(line.map(Output::Debugger));
            };

            let text = {
                let line = pin!(self.stdout.next());
                let text = pin!(tty.next_line());

                match select(line, text).await {
                    Either::Left((line, _)) => {
                        return Ok(line.transpose()?.map(Output::Debugger));
                    }
                    Either::Right((text, _)) => text,
                }
            };

            match text {
                Some(Ok(text)) => return Ok(Some(Output::Inferior(text))),
                Some(Err(e)) => tracing::warn!(error = %e, "inferior terminal unreadable"),
                None => tracing::debug!("inferior terminal closed"),
            }

            self.tty = None;
        }
    }

    fn interrupt(&mut self, pid: u64) -> Result<(), Self::Error> {
        let raw = i32::try_from(pid).map_err(|_| Error::InvalidPid(pid))?;

        kill(Pid::from_raw(raw), Signal::SIGINT)?;
        tracing::debug!(pid, "SIGINT sent");

        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), Self::Error> {
        if let Some(mut stdin) = self.stdin.take() {
            // the debugger may be gone already
            if let Err(e) = stdin.send("-gdb-exit").await {
                tracing::debug!(error = %e, "-gdb-exit");
            }
        }

        match tokio::time::timeout(self.exit_timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                tracing::info!(%status, "debugger exited");
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.exit_timeout, "debugger still running, killing it");
                self.child.kill().await?;
            }
        }

        Ok(())
    }
}
