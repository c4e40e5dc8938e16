use super::GdbEngine;
use crate::dispatch::Command;
use crate::error::SessionResult;
use crate::handler::EventHandler;
use crate::mi::{Response, ResultClass};
use crate::params::StartMode;
use crate::state::DebuggerState;

/// Error message of the debugger when the kernel denies tracing a process.
pub const PTRACE_DENIED: &str = "ptrace: Operation not permitted.";

/// Returns the diagnostic shown when attaching is denied by the kernel.
pub fn ptrace_diagnostic(mode: StartMode) -> String {
    let hint = match mode {
        StartMode::StartInternal => "Check the settings of\n",
        StartMode::AttachExternal => {
            "If your uid matches the uid\nof the target process, check the settings of\n"
        }
    };

    format!(
        "{PTRACE_DENIED}\n\n\
         Could not attach to the process. \
         Make sure no other debugger traces this process.\n\
         {hint}\
         /proc/sys/kernel/yama/ptrace_scope\n\
         For more details, see /etc/sysctl.d/10-ptrace.conf\n"
    )
}

impl<H: EventHandler> GdbEngine<H> {
    pub(super) fn setup_attach_inferior(&mut self, pid: u64) -> SessionResult<()> {
        self.post_command(
            Command::new(format!("attach {pid}")).with_callback("handle_attach", Self::handle_attach),
        )?;

        Ok(())
    }

    fn handle_attach(&mut self, response: Response) -> SessionResult<()> {
        self.expect_state("handle_attach", DebuggerState::InferiorSetupRequested)?;

        match response.class {
            ResultClass::Done | ResultClass::Running => {
                self.show_message("INFERIOR ATTACHED");
                self.handler.show_status("Attached to stopped inferior.");
                self.handle_inferior_prepared()
            }
            ResultClass::Error if response.msg() == PTRACE_DENIED => {
                let msg = ptrace_diagnostic(self.params.start_mode);
                self.notify_inferior_setup_failed(msg);
                Ok(())
            }
            _ => {
                self.notify_inferior_setup_failed(response.msg().to_owned());
                Ok(())
            }
        }
    }

    /// The attached inferior is already stopped, so no command is needed.
    pub(super) fn run_attach_engine(&mut self, pid: u64) -> SessionResult<()> {
        self.handler
            .show_status(&format!("Attached to process {pid}."));
        self.set_state(DebuggerState::InferiorStopOk)?;
        self.handler.inferior_stopped(None);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PTRACE_DENIED, ptrace_diagnostic};
    use crate::engine::testing::{Event, RecordingHandler};
    use crate::engine::{DebuggerEngine, GdbEngine};
    use crate::error::SessionError;
    use crate::params::{StartMode, StartParameters};
    use crate::state::DebuggerState;

    fn attach_engine(pid: u64) -> GdbEngine<RecordingHandler> {
        let mut engine = GdbEngine::new(StartParameters::attach(pid), RecordingHandler::default());

        engine.setup_engine().expect("setup");
        engine.notify_engine_setup_ok().expect("setup ok");

        assert_eq!(engine.state(), DebuggerState::InferiorSetupRequested);
        assert_eq!(engine.next_outgoing(), Some(format!("1attach {pid}")));

        engine
    }

    #[test]
    fn attach_success() {
        let mut engine = attach_engine(4242);

        engine
            .handle_line(r#"=thread-group-started,id="i1",pid="4242""#)
            .expect("notify");
        engine.handle_line(r#"~"Attaching to process 4242\n""#).expect("console");
        engine.handle_line("1^done").expect("attached");

        assert_eq!(engine.state(), DebuggerState::InferiorStopOk);
        assert_eq!(engine.handler().count(&Event::Prepared), 1);
        assert_eq!(engine.handler().count(&Event::Stopped(None)), 1);
        assert_eq!(
            engine
                .handler()
                .count(&Event::Status("Attached to process 4242.".to_owned())),
            1
        );

        // the attached process is the one to interrupt
        assert_eq!(engine.inferior_pid(), Some(4242));
        assert_eq!(engine.next_outgoing(), None);
    }

    #[test]
    fn attach_running_result_is_success() {
        let mut engine = attach_engine(7);

        engine.handle_line("1^running").expect("attached");

        assert_eq!(engine.state(), DebuggerState::InferiorStopOk);
        assert_eq!(engine.handler().count(&Event::Prepared), 1);
    }

    #[test]
    fn attach_ptrace_denied() {
        let mut engine = attach_engine(4242);

        engine
            .handle_line(r#"1^error,msg="ptrace: Operation not permitted.""#)
            .expect("handled");

        let expected = ptrace_diagnostic(StartMode::AttachExternal);

        assert_eq!(engine.state(), DebuggerState::Failed);
        assert_eq!(
            engine.failure(),
            Some(&SessionError::InferiorSetupFailed(expected.clone()))
        );
        assert!(expected.starts_with(PTRACE_DENIED));
        assert!(expected.contains("ptrace_scope"));
        assert_eq!(engine.handler().count(&Event::Prepared), 0);

        // the session is over
        assert!(engine.continue_inferior().is_err());
        assert_eq!(engine.next_outgoing(), None);
    }

    #[test]
    fn attach_other_error_is_generic() {
        let mut engine = attach_engine(4242);

        engine
            .handle_line(r#"1^error,msg="ptrace: No such process.""#)
            .expect("handled");

        assert_eq!(
            engine.failure(),
            Some(&SessionError::InferiorSetupFailed(
                "ptrace: No such process.".to_owned()
            ))
        );
    }

    #[test]
    fn attach_ptrace_message_must_match_exactly() {
        let mut engine = attach_engine(4242);

        engine
            .handle_line(r#"1^error,msg="ptrace: Operation not permitted. (extra)""#)
            .expect("handled");

        assert_eq!(
            engine.failure(),
            Some(&SessionError::InferiorSetupFailed(
                "ptrace: Operation not permitted. (extra)".to_owned()
            ))
        );
    }

    #[test]
    fn ptrace_diagnostic_depends_on_start_mode() {
        let internal = ptrace_diagnostic(StartMode::StartInternal);
        let external = ptrace_diagnostic(StartMode::AttachExternal);

        assert_ne!(internal, external);
        assert!(external.contains("If your uid matches the uid"));
        assert!(!internal.contains("If your uid matches the uid"));
    }

    #[test]
    fn attach_response_in_wrong_state_is_fatal() {
        let mut engine = attach_engine(4242);

        engine.handle_line("1^done").expect("attached");

        // a second command, answered while no attach is expected anymore
        let token = engine
            .post_command(
                crate::dispatch::Command::new("attach 4242")
                    .with_callback("handle_attach", GdbEngine::handle_attach),
            )
            .expect("post");

        let res = engine.handle_line(&format!("{token}^done"));

        assert!(matches!(
            res,
            Err(SessionError::UnexpectedState {
                operation: "handle_attach",
                ..
            })
        ));
        assert_eq!(engine.state(), DebuggerState::Failed);
    }
}
