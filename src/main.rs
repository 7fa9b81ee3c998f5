use clap::Parser;
use lambda_invoke::cli::Args;
use std::io::{stderr, IsTerminal};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    // clap exits with 2 on bad flags, which is reserved for function errors here
    let args = match Args::try_parse() {
        Ok(v) => v,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS // --help or --version
            };
        }
    };

    match lambda_invoke::execute(args).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing from RUST_LOG env var if present or logs warnings and errors only.
/// Everything goes to stderr to keep stdout for the function output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(stderr)
        .with_ansi(stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}
