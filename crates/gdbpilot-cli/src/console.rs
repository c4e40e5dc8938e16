use gdbpilot_engine::{EventHandler, MessageChannel, Request, SessionError};

/// Parses a request typed by the user.
pub fn parse_request(line: &str) -> Option<Request> {
    match line.trim() {
        "interrupt" | "i" => Some(Request::Interrupt),
        "continue" | "c" => Some(Request::Continue),
        "quit" | "q" => Some(Request::Shutdown),
        _ => None,
    }
}

/// Event handler printing status text to the standard output.
///
/// Other messages go to the log.
#[derive(Default)]
pub struct ConsoleHandler;

impl EventHandler for ConsoleHandler {
    fn show_message(&mut self, text: &str, channel: MessageChannel) {
        let text = text.trim_end();

        match channel {
            MessageChannel::Console | MessageChannel::Target => {
                tracing::info!(?channel, "{text}")
            }
            MessageChannel::DebuggerLog | MessageChannel::Engine => {
                tracing::debug!(?channel, "{text}")
            }
        }
    }

    #[allow(clippy::print_stdout)]
    fn show_status(&mut self, text: &str) {
        println!("{text}");
    }

    fn inferior_stopped(&mut self, reason: Option<&str>) {
        tracing::info!(reason, "inferior stopped");
    }

    fn inferior_exited(&mut self, exit_code: Option<i32>) {
        tracing::info!(exit_code, "inferior exited");
    }

    fn session_failed(&mut self, error: &SessionError) {
        tracing::error!(%error, "session failed");
    }
}
