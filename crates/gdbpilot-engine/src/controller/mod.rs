mod builder;

use std::pin::pin;

use futures_util::future::{Either, select};
use futures_util::{Stream, StreamExt};

pub use self::builder::Builder;
use self::builder::NeedsLauncher;
use crate::engine::{DebuggerEngine, SessionSummary};
use crate::error::ChannelError;
use crate::launcher::{Channel, Launcher, Output};
use crate::state::DebuggerState;

/// Request from the user of a running session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// Pause the running inferior.
    Interrupt,

    /// Resume the stopped inferior.
    Continue,

    /// End the session.
    Shutdown,
}

/// Driver of a debugging session.
///
/// The controller starts the debugger process, then shuttles commands and
/// responses between the process and the session until it terminates.
pub struct Controller<L, E> {
    /// Launcher of the debugger process.
    launcher: L,

    /// Debugging session.
    engine: E,
}

impl Controller<(), ()> {
    /// Creates a controller builder.
    pub const fn builder() -> Builder<NeedsLauncher> {
        Builder::new()
    }
}

impl<L, E> Controller<L, E>
where
    L: Launcher,
    E: DebuggerEngine,
{
    /// Creates a controller driving `engine`.
    pub const fn new(launcher: L, engine: E) -> Self {
        Self { launcher, engine }
    }

    /// Returns the driven session.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs the session until it is shut down or fails.
    ///
    /// `requests` yields user requests. Once exhausted, the session keeps
    /// running until the inferior exits.
    ///
    /// On success, the session summary is returned as well as the session.
    #[tracing::instrument(name = "Session", skip_all)]
    pub async fn run<R>(mut self, requests: R) -> crate::Result<(SessionSummary, E), L::Error>
    where
        R: Stream<Item = Request> + Unpin,
    {
        let spec = self.engine.setup()?;

        tracing::info!(program = %spec.program.display(), args = ?spec.args, "starting debugger");

        let mut channel = match self.launcher.launch(spec).await {
            Ok(channel) => channel,
            Err(e) => {
                self.engine.notify_setup_failed(e.to_string());
                return Err(ChannelError(e).into());
            }
        };

        let res = match self.engine.notify_setup_ok() {
            Ok(()) => self.drive(&mut channel, requests).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = channel.terminate().await {
            tracing::warn!(error = %e, "debugger termination");
        }

        res?;

        let summary = self.engine.summary();
        tracing::info!(?summary, "session finished");

        Ok((summary, self.engine))
    }

    async fn drive<R>(
        &mut self,
        channel: &mut L::Channel,
        mut requests: R,
    ) -> crate::Result<(), L::Error>
    where
        R: Stream<Item = Request> + Unpin,
    {
        let mut requests_done = false;

        loop {
            while let Some(line) = self.engine.next_outgoing() {
                tracing::debug!(line = %line, "send");
                channel.send(&line).await.map_err(channel_error::<L>)?;
            }

            if let Some(e) = self.engine.failure() {
                return Err(e.clone().into());
            }

            if self.engine.state() == DebuggerState::ShutdownOk {
                return Ok(());
            }

            let next = if requests_done {
                Next::Output(channel.recv().await)
            } else {
                let output = pin!(channel.recv());
                let request = pin!(requests.next());

                match select(output, request).await {
                    Either::Left((output, _)) => Next::Output(output),
                    Either::Right((request, _)) => Next::Request(request),
                }
            };

            match next {
                Next::Output(output) => match output.map_err(channel_error::<L>)? {
                    Some(Output::Debugger(line)) => self.engine.handle_line(&line)?,
                    Some(Output::Inferior(text)) => self.engine.handle_inferior_output(&text),
                    None => self.engine.notify_channel_closed(),
                },
                Next::Request(Some(request)) => self.handle_request(channel, request),
                Next::Request(None) => requests_done = true,
            }
        }
    }

    /// Forwards a user request to the session.
    ///
    /// Requests invalid in the current state are rejected without affecting
    /// the session. So are interrupts whose signal can't be delivered (e.g.,
    /// the inferior has just exited).
    fn handle_request(&mut self, channel: &mut L::Channel, request: Request) {
        tracing::info!(?request, state = %self.engine.state(), "request");

        let res = match request {
            Request::Interrupt => self.engine.interrupt().map(|pid| {
                // side channel, not a debugger command
                if let Err(e) = channel.interrupt(pid) {
                    tracing::warn!(pid, error = %e, "interrupt signal failed");
                    self.engine.notify_interrupt_failed(e.to_string());
                }
            }),
            Request::Continue => self.engine.run_inferior(),
            Request::Shutdown => self.engine.shutdown(),
        };

        if let Err(e) = res {
            tracing::warn!(?request, error = %e, "request rejected");
        }
    }
}

fn channel_error<L: Launcher>(e: <L::Channel as Channel>::Error) -> crate::Error<L::Error> {
    crate::Error::Channel(ChannelError(e.into()))
}

enum Next<T> {
    Output(T),
    Request(Option<Request>),
}
