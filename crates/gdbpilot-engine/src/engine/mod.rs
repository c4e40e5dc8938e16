mod attach;
mod plain;

use std::collections::VecDeque;

pub use self::attach::{PTRACE_DENIED, ptrace_diagnostic};
use crate::dispatch::{Command, Dispatcher};
use crate::error::{SessionError, SessionResult};
use crate::handler::{EventHandler, MessageChannel};
use crate::mi::{AsyncKind, MiFields, Record, Response, parse_record};
use crate::params::{LaunchSpec, StartParameters, Target};
use crate::state::DebuggerState;

/// Capabilities of a debugging session, as invoked by an external driver loop
/// (e.g., [Controller](crate::controller::Controller)).
///
/// Implementors don't perform any I/O: commands are queued, and retrieved
/// with [next_outgoing](Self::next_outgoing).
pub trait DebuggerEngine {
    /// Returns the current phase of the session.
    fn state(&self) -> DebuggerState;

    /// Returns the error that made the session fail, if any.
    fn failure(&self) -> Option<&SessionError>;

    /// Requests the engine setup, and returns the debugger process to start.
    fn setup(&mut self) -> SessionResult<LaunchSpec>;

    /// Notifies that the debugger process was started.
    fn notify_setup_ok(&mut self) -> SessionResult<()>;

    /// Notifies that the debugger process could not be started.
    fn notify_setup_failed(&mut self, reason: String);

    /// Feeds a single line of debugger output.
    fn handle_line(&mut self, line: &str) -> SessionResult<()>;

    /// Feeds a single line of output of the inferior.
    fn handle_inferior_output(&mut self, text: &str);

    /// Notifies that the debugger output stream was closed.
    fn notify_channel_closed(&mut self);

    /// Pops the next command line to send to the debugger.
    fn next_outgoing(&mut self) -> Option<String>;

    /// Resumes the stopped inferior.
    fn run_inferior(&mut self) -> SessionResult<()>;

    /// Requests an interrupt of the running inferior.
    ///
    /// The returned process ID must be signaled by the caller, outside of the
    /// command stream.
    fn interrupt(&mut self) -> SessionResult<u64>;

    /// Notifies that the interrupt signal could not be delivered.
    fn notify_interrupt_failed(&mut self, reason: String);

    /// Shuts the session down.
    ///
    /// Shutdown never depends on the debuggee's cooperation.
    fn shutdown(&mut self) -> SessionResult<()>;

    /// Returns a summary of the session.
    fn summary(&self) -> SessionSummary;
}

/// Summary of a debugging session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// ID of the inferior process, if known.
    pub inferior_pid: Option<u64>,

    /// Exit code of the inferior, if it exited normally.
    pub exit_code: Option<i32>,
}

/// GDB/MI debugging session.
pub struct GdbEngine<H> {
    /// Start configuration.
    params: StartParameters,

    /// Current phase.
    state: DebuggerState,

    /// Commands waiting for their response.
    dispatcher: Dispatcher<Self>,

    /// Command lines not yet sent.
    outbox: VecDeque<String>,

    /// Consumer of session events.
    handler: H,

    inferior_pid: Option<u64>,
    exit_code: Option<i32>,
    failure: Option<SessionError>,
}

impl<H: EventHandler> GdbEngine<H> {
    /// Creates a new session from the given start configuration.
    pub fn new(params: StartParameters, handler: H) -> Self {
        let inferior_pid = match params.target {
            Target::Attach { pid } => Some(pid),
            Target::Launch { .. } => None,
        };

        Self {
            params,
            state: DebuggerState::NotReady,
            dispatcher: Dispatcher::new(),
            outbox: VecDeque::new(),
            handler,
            inferior_pid,
            exit_code: None,
            failure: None,
        }
    }

    /// Returns the start configuration of this session.
    pub const fn params(&self) -> &StartParameters {
        &self.params
    }

    /// Returns the event handler.
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the event handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the session and returns its event handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Returns the ID of the inferior process, if known.
    pub const fn inferior_pid(&self) -> Option<u64> {
        self.inferior_pid
    }

    /// Returns the number of commands waiting for their response.
    pub fn pending_commands(&self) -> usize {
        self.dispatcher.pending_count()
    }

    /// Queues a command, and returns its token.
    ///
    /// Commands are rejected once the session has terminated.
    pub fn post_command(&mut self, command: Command<Self>) -> SessionResult<u64> {
        if self.state.is_terminal() {
            return Err(SessionError::SessionTerminated(self.state));
        }

        let callback = command.callback.as_ref().map(|cb| cb.name);
        let (token, line) = self.dispatcher.register(command);

        tracing::debug!(token, callback, line = %line, "post");

        self.outbox.push_back(line);

        Ok(token)
    }

    /// Requests the engine setup, and returns the debugger process to start.
    pub fn setup_engine(&mut self) -> SessionResult<LaunchSpec> {
        self.expect_state("setup_engine", DebuggerState::NotReady)?;
        self.set_state(DebuggerState::EngineSetupRequested)?;

        self.show_message("TRYING TO START ADAPTER");

        Ok(self.params.launch_spec())
    }

    /// Notifies that the debugger process was started, which triggers the
    /// inferior setup.
    pub fn notify_engine_setup_ok(&mut self) -> SessionResult<()> {
        self.expect_state("notify_engine_setup_ok", DebuggerState::EngineSetupRequested)?;
        self.set_state(DebuggerState::InferiorSetupRequested)?;
        self.setup_inferior()
    }

    /// Notifies that the debugger process could not be started.
    pub fn notify_engine_setup_failed(&mut self, reason: String) {
        self.show_message(&format!("ADAPTER START FAILED: {reason}"));
        self.fail(SessionError::EngineSetupFailed(reason));
    }

    /// Attaches or loads the inferior.
    pub fn setup_inferior(&mut self) -> SessionResult<()> {
        self.expect_state("setup_inferior", DebuggerState::InferiorSetupRequested)?;

        match self.params.target.clone() {
            Target::Attach { pid } => self.setup_attach_inferior(pid),
            Target::Launch { executable } => self.setup_plain_inferior(&executable),
        }
    }

    /// Starts the prepared inferior.
    pub fn run_engine(&mut self) -> SessionResult<()> {
        self.expect_state("run_engine", DebuggerState::EngineRunRequested)?;

        match self.params.target {
            Target::Attach { pid } => self.run_attach_engine(pid),
            Target::Launch { .. } => self.run_plain_engine(),
        }
    }

    /// Resumes the stopped inferior.
    pub fn continue_inferior(&mut self) -> SessionResult<()> {
        self.expect_state("continue_inferior", DebuggerState::InferiorStopOk)?;
        self.set_state(DebuggerState::InferiorRunRequested)?;

        self.post_command(
            Command::new("-exec-continue")
                .with_callback("handle_exec_continue", Self::handle_exec_continue),
        )?;

        Ok(())
    }

    /// Requests an interrupt of the running inferior, and returns the process
    /// ID to signal.
    pub fn interrupt_inferior(&mut self) -> SessionResult<u64> {
        self.expect_state("interrupt_inferior", DebuggerState::InferiorRunOk)?;

        let pid = self
            .inferior_pid
            .ok_or(SessionError::MissingInferiorPid)?;

        self.set_state(DebuggerState::InferiorStopRequested)?;
        self.show_message(&format!("INTERRUPT INFERIOR {pid}"));

        Ok(pid)
    }

    /// Notifies that the interrupt signal could not be delivered, so the
    /// inferior is still running (or about to report its exit).
    pub fn notify_inferior_interrupt_failed(&mut self, reason: String) {
        if self.state != DebuggerState::InferiorStopRequested {
            tracing::debug!(state = %self.state, reason = %reason, "interrupt failure ignored");
            return;
        }

        self.show_message(&format!("INTERRUPT FAILED: {reason}"));

        match self.set_state(DebuggerState::InferiorRunOk) {
            Ok(()) => self.handler.show_status("Interrupting the inferior failed."),
            Err(e) => self.fail(e),
        }
    }

    /// Shuts the session down.
    ///
    /// Shutdown is acknowledged right away. It is a no-op once the session
    /// has terminated.
    pub fn shutdown_engine(&mut self) -> SessionResult<()> {
        if self.state.is_terminal() {
            return Ok(());
        }

        let prev = self.state;

        if prev != DebuggerState::ShutdownRequested {
            self.set_state(DebuggerState::ShutdownRequested)?;
        }

        self.show_message(&format!("ADAPTER SHUTDOWN {prev}"));
        self.set_state(DebuggerState::ShutdownOk)?;
        self.outbox.clear();

        Ok(())
    }

    /// Feeds a single line of debugger output.
    ///
    /// Any error returned is fatal: the session is failed beforehand.
    pub fn handle_line(&mut self, line: &str) -> SessionResult<()> {
        if self.state.is_terminal() {
            tracing::debug!(line, state = %self.state, "ignored");
            return Ok(());
        }

        tracing::debug!(line, "received");

        let res = parse_record(line)
            .map_err(SessionError::from)
            .and_then(|record| self.handle_record(record));

        if let Err(e) = &res {
            self.fail(e.clone());
        }

        res
    }

    fn handle_record(&mut self, record: Record) -> SessionResult<()> {
        match record {
            Record::Result {
                token: Some(token),
                response,
            } => self.handle_result(token, response),
            Record::Result {
                token: None,
                response,
            } => Err(SessionError::MissingToken(response.class)),
            Record::Async {
                kind: AsyncKind::Exec,
                class,
                data,
                ..
            } => self.handle_exec_async(&class, &data),
            Record::Async {
                kind: AsyncKind::Notify,
                class,
                data,
                ..
            } => {
                self.handle_notify_async(&class, &data);
                Ok(())
            }
            Record::Async {
                kind: AsyncKind::Status,
                ..
            }
            | Record::Prompt => Ok(()),
            Record::Stream { kind, text } => {
                self.handler.show_message(&text, kind.into());
                Ok(())
            }
        }
    }

    fn handle_result(&mut self, token: u64, response: Response) -> SessionResult<()> {
        let pending = self.dispatcher.resolve(token)?;

        tracing::debug!(
            token,
            command = %pending.text,
            callback = pending.callback_name(),
            class = %response.class,
            "response"
        );

        pending.complete(self, response)
    }

    fn handle_exec_async(&mut self, class: &str, data: &MiFields) -> SessionResult<()> {
        use DebuggerState::*;

        match (class, self.state) {
            ("running", InferiorStopOk) => self.set_state(InferiorRunOk),
            ("stopped", InferiorRunOk | InferiorRunRequested | InferiorStopRequested) => {
                let reason = data.get("reason").and_then(|r| r.as_str());

                if let Some(reason) = reason.filter(|r| r.starts_with("exited")) {
                    let exit_code = parse_exit_code(reason, data);
                    self.notify_inferior_exited(exit_code)
                } else {
                    self.set_state(InferiorStopOk)?;
                    self.handler.show_status("Stopped.");
                    self.handler.inferior_stopped(reason);
                    Ok(())
                }
            }
            ("running" | "stopped", state) => {
                tracing::warn!(class, %state, "ignored exec record");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_notify_async(&mut self, class: &str, data: &MiFields) {
        if class != "thread-group-started" {
            return;
        }

        let pid = data
            .get("pid")
            .and_then(|pid| pid.as_str())
            .and_then(|pid| pid.parse().ok());

        if let Some(pid) = pid {
            tracing::info!(pid, "inferior started");
            self.inferior_pid = Some(pid);
        }
    }

    fn handle_exec_continue(&mut self, response: Response) -> SessionResult<()> {
        self.expect_state("handle_exec_continue", DebuggerState::InferiorRunRequested)?;

        if response.class == crate::mi::ResultClass::Running {
            self.set_state(DebuggerState::InferiorRunOk)?;
            self.handler.show_status("Running.");
        } else {
            self.show_message(response.msg());
            self.set_state(DebuggerState::InferiorStopOk)?;
            self.handler.show_status("Continuing the inferior failed.");
        }

        Ok(())
    }

    /// Switches to the running phase once the inferior is prepared.
    fn handle_inferior_prepared(&mut self) -> SessionResult<()> {
        self.set_state(DebuggerState::EngineRunRequested)?;
        self.handler.inferior_prepared();
        self.run_engine()
    }

    fn notify_inferior_setup_failed(&mut self, msg: String) {
        self.fail(SessionError::InferiorSetupFailed(msg));
    }

    fn notify_inferior_exited(&mut self, exit_code: Option<i32>) -> SessionResult<()> {
        self.set_state(DebuggerState::InferiorExited)?;
        self.exit_code = exit_code;

        match exit_code {
            Some(code) => self
                .handler
                .show_status(&format!("Inferior exited with code {code}.")),
            None => self.handler.show_status("Inferior exited."),
        }

        self.handler.inferior_exited(exit_code);

        self.shutdown_engine()
    }

    fn show_message(&mut self, text: &str) {
        self.handler.show_message(text, MessageChannel::Engine);
    }

    fn expect_state(&self, operation: &'static str, expected: DebuggerState) -> SessionResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::UnexpectedState {
                operation,
                expected,
                actual: self.state,
            })
        }
    }

    fn set_state(&mut self, to: DebuggerState) -> SessionResult<()> {
        let from = self.state;

        if !from.can_transition_to(to) {
            return Err(SessionError::InvalidTransition { from, to });
        }

        tracing::info!(%from, %to, "state");
        self.state = to;

        Ok(())
    }

    /// Enters the failure state (once), dropping any unsent command.
    fn fail(&mut self, error: SessionError) {
        if self.state.is_terminal() {
            return;
        }

        tracing::error!(state = %self.state, error = %error, "session failed");

        self.state = DebuggerState::Failed;
        self.outbox.clear();
        self.handler.session_failed(&error);
        self.failure = Some(error);
    }
}

impl<H: EventHandler> DebuggerEngine for GdbEngine<H> {
    fn state(&self) -> DebuggerState {
        self.state
    }

    fn failure(&self) -> Option<&SessionError> {
        self.failure.as_ref()
    }

    fn setup(&mut self) -> SessionResult<LaunchSpec> {
        self.setup_engine()
    }

    fn notify_setup_ok(&mut self) -> SessionResult<()> {
        let res = self.notify_engine_setup_ok();

        if let Err(e) = &res {
            self.fail(e.clone());
        }

        res
    }

    fn notify_setup_failed(&mut self, reason: String) {
        self.notify_engine_setup_failed(reason);
    }

    fn handle_line(&mut self, line: &str) -> SessionResult<()> {
        GdbEngine::handle_line(self, line)
    }

    fn handle_inferior_output(&mut self, text: &str) {
        if self.state.is_terminal() {
            tracing::debug!(text, state = %self.state, "ignored");
            return;
        }

        self.handler.show_message(text, MessageChannel::Target);
    }

    fn notify_channel_closed(&mut self) {
        let pending = self.dispatcher.pending_count();
        self.fail(SessionError::ChannelClosed { pending });
    }

    fn next_outgoing(&mut self) -> Option<String> {
        self.outbox.pop_front()
    }

    fn run_inferior(&mut self) -> SessionResult<()> {
        self.continue_inferior()
    }

    fn interrupt(&mut self) -> SessionResult<u64> {
        self.interrupt_inferior()
    }

    fn notify_interrupt_failed(&mut self, reason: String) {
        self.notify_inferior_interrupt_failed(reason);
    }

    fn shutdown(&mut self) -> SessionResult<()> {
        self.shutdown_engine()
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            inferior_pid: self.inferior_pid,
            exit_code: self.exit_code,
        }
    }
}

/// Extracts the exit code of an `exited*` stop record.
///
/// The debugger reports `exit-code` in octal.
fn parse_exit_code(reason: &str, data: &MiFields) -> Option<i32> {
    match reason {
        "exited-normally" => Some(0),
        "exited" => data
            .get("exit-code")
            .and_then(|code| code.as_str())
            .and_then(|code| i32::from_str_radix(code, 8).ok()),
        _ => None,
    }
}
