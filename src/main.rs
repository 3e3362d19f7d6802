//! trapline CLI - pollinator trapline formation simulator

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use trapline::cli::{run_cli, Args};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli(Args::parse())
}
