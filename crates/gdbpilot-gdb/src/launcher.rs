use std::process::Stdio;
use std::time::Duration;

use gdbpilot_engine::LaunchSpec;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use crate::channel::GdbChannel;
use crate::error::Error;
use crate::tty::InferiorTty;

/// Time given to the debugger to exit on its own, before it is killed.
pub const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Launcher of a debugger process on the local host.
#[derive(Clone, Copy, Debug)]
pub struct GdbLauncher {
    exit_timeout: Duration,
}

impl Default for GdbLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl GdbLauncher {
    /// Creates a new launcher.
    pub const fn new() -> Self {
        Self {
            exit_timeout: DEFAULT_EXIT_TIMEOUT,
        }
    }

    /// Specifies how long a terminated debugger may take to exit.
    pub const fn with_exit_timeout(mut self, timeout: Duration) -> Self {
        self.exit_timeout = timeout;
        self
    }
}

impl gdbpilot_engine::launcher::Launcher for GdbLauncher {
    type Channel = GdbChannel;
    type Error = Error;

    #[tracing::instrument(name = "Launch", skip_all, fields(program = %spec.program.display()))]
    async fn launch(&mut self, spec: LaunchSpec) -> Result<Self::Channel, Self::Error> {
        let mut command = Command::new(&spec.program);

        command
            .args(&spec.args)
            .kill_on_drop(true)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // terminal signals are meant for the controller only
        command.process_group(0);

        if let Some(env) = &spec.env {
            command.env_clear().envs(env);
        }

        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let tty = if spec.inferior_tty {
            match InferiorTty::open() {
                Ok(tty) => {
                    command.arg(format!("--tty={}", tty.path()));
                    Some(tty)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "no inferior terminal, discarding its output");
                    command.arg("--tty=/dev/null");
                    None
                }
            }
        } else {
            None
        };

        let mut child = command
            .spawn()
            .map_err(|e| Error::Spawn(spec.program.clone(), e))?;

        let stdin = child.stdin.take().ok_or(Error::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(Error::MissingPipe("stdout"))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(log_stderr(stderr));
        }

        tracing::info!(pid = child.id(), "debugger started");

        Ok(GdbChannel::new(child, stdin, stdout, tty, self.exit_timeout))
    }
}

/// The debugger only writes diagnostics there.
async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::warn!(line = %line, "debugger stderr"),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "debugger stderr");
                break;
            }
        }
    }
}
