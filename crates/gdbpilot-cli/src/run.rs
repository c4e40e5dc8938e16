use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use gdbpilot_engine::{Controller, Request, StartParameters};
use gdbpilot_gdb::GdbLauncher;
use miette::IntoDiagnostic;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::{ConsoleHandler, SessionConfig, parse_request};

/// Runs the subcommand for attaching to a running process.
pub fn evaluate_attach(config: Option<String>, pid: u64) -> miette::Result<()> {
    let config = parse_session_config(config)?;

    evaluate_session(config.apply(StartParameters::attach(pid)))
}

/// Runs the subcommand for starting a new process under the debugger.
pub fn evaluate_run(
    config: Option<String>,
    program: PathBuf,
    args: Vec<String>,
) -> miette::Result<()> {
    let config = parse_session_config(config)?;

    evaluate_session(config.apply(StartParameters::launch(program).args(args)))
}

fn evaluate_session(params: StartParameters) -> miette::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    let res = runtime.block_on(async move {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();

        tokio::spawn(forward_stdin(requests_tx.clone()));
        tokio::spawn(forward_ctrl_c(requests_tx));

        let controller = Controller::builder()
            .with_launcher(GdbLauncher::new())
            .with_event_handler(ConsoleHandler)
            .with_start_parameters(params)
            .build();

        let (summary, _) = controller
            .run(UnboundedReceiverStream::new(requests_rx))
            .await
            .into_diagnostic()?;

        tracing::info!(?summary, "session ended");

        Ok(())
    });

    // a blocking stdin read may still be pending
    runtime.shutdown_background();

    res
}

/// Turns lines typed by the user into requests.
async fn forward_stdin(requests: mpsc::UnboundedSender<Request>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_request(&line) {
            Some(request) => {
                if requests.send(request).is_err() {
                    break;
                }
            }
            None if line.trim().is_empty() => (),
            None => tracing::warn!(line = %line, "unknown request (interrupt, continue, quit)"),
        }
    }
}

/// Turns Ctrl-C into interrupt requests.
async fn forward_ctrl_c(requests: mpsc::UnboundedSender<Request>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if requests.send(Request::Interrupt).is_err() {
            break;
        }
    }
}

fn parse_session_config(config: Option<String>) -> miette::Result<SessionConfig> {
    let Some(config) = config else {
        return Ok(knus::parse("<content>", "")?);
    };

    let path = Path::new(&config);

    let config = if let Some((filename, "kdl")) = path
        .file_name()
        .and_then(OsStr::to_str)
        .zip(path.extension().and_then(OsStr::to_str))
    {
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        knus::parse(filename, &content)?
    } else {
        knus::parse("<content>", &config)?
    };

    Ok(config)
}
