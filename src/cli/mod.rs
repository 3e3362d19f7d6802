//! Command-line interface.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested; the
//! binary only installs logging and calls [`run_cli`].

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{execute, load_config, run_cli, run_command, Overrides};
pub use output::{format_json, format_summary, print_help, print_summary, print_version};
