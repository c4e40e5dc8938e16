#![allow(missing_docs)]
#![allow(clippy::print_stderr)]

use gdbpilot_cli::{CliAction, CliOpts};

use tracing_subscriber::EnvFilter;

fn main() {
    let cli = CliOpts::parse_from_cmdline();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_env_var("GDBPILOT_LOG")
                .from_env_lossy(),
        )
        .init();

    let res = match cli.action {
        CliAction::Attach { config, pid } => gdbpilot_cli::evaluate_attach(config, pid),
        CliAction::Run {
            config,
            program,
            args,
        } => gdbpilot_cli::evaluate_run(config, program, args),
    };

    if let Err(e) = res {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
