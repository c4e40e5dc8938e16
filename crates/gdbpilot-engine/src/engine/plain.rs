use std::path::Path;

use super::GdbEngine;
use crate::dispatch::Command;
use crate::error::{SessionError, SessionResult};
use crate::handler::EventHandler;
use crate::mi::{self, Response, ResultClass};
use crate::state::DebuggerState;

impl<H: EventHandler> GdbEngine<H> {
    pub(super) fn setup_plain_inferior(&mut self, executable: &Path) -> SessionResult<()> {
        if !self.params.args.is_empty() {
            let args = self
                .params
                .args
                .iter()
                .map(|arg| quote_arg(arg))
                .collect::<Vec<_>>()
                .join(" ");

            self.post_command(Command::new(format!("-exec-arguments {args}")))?;
        }

        let path = std::path::absolute(executable).unwrap_or_else(|e| {
            tracing::warn!(
                executable = %executable.display(),
                error = %e,
                "cannot make executable path absolute, the debugger resolves it"
            );
            executable.to_path_buf()
        });

        self.post_command(
            Command::new(format!(
                "-file-exec-and-symbols {}",
                mi::quote(&path.to_string_lossy())
            ))
            .with_callback(
                "handle_file_exec_and_symbols",
                Self::handle_file_exec_and_symbols,
            ),
        )?;

        Ok(())
    }

    fn handle_file_exec_and_symbols(&mut self, response: Response) -> SessionResult<()> {
        self.expect_state(
            "handle_file_exec_and_symbols",
            DebuggerState::InferiorSetupRequested,
        )?;

        if response.class == ResultClass::Done {
            return self.handle_inferior_prepared();
        }

        let msg = response.msg();

        // extend the message a bit in unknown cases
        let msg = if msg.ends_with("File format not recognized") {
            msg.to_owned()
        } else {
            format!("Starting executable failed:\n{msg}")
        };

        self.notify_inferior_setup_failed(msg);

        Ok(())
    }

    pub(super) fn run_plain_engine(&mut self) -> SessionResult<()> {
        let command = if self.params.use_continue_instead_of_run {
            "-exec-continue"
        } else {
            "-exec-run"
        };

        self.post_command(Command::new(command).with_callback("handle_exec_run", Self::handle_exec_run))?;

        Ok(())
    }

    fn handle_exec_run(&mut self, response: Response) -> SessionResult<()> {
        self.expect_state("handle_exec_run", DebuggerState::EngineRunRequested)?;

        if response.class == ResultClass::Running {
            self.set_state(DebuggerState::InferiorRunOk)?;
            self.show_message("INFERIOR STARTED");
            self.handler.show_status("Inferior started.");
            self.handler.inferior_started();

            if self.params.reverse_debugging {
                self.post_command(Command::new("target record"))?;
            }
        } else {
            let msg = response.msg().to_owned();
            self.show_message(&msg);
            self.fail(SessionError::EngineRunFailed(msg));
        }

        Ok(())
    }
}

/// Quotes a program argument if it would otherwise be split or unescaped.
fn quote_arg(arg: &str) -> String {
    if !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\')
    {
        arg.to_owned()
    } else {
        mi::quote(arg)
    }
}
