//! CLI argument parsing.
//!
//! Accepts any iterator of strings so parsing can be tested without a
//! process environment.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run an experiment
    Run {
        /// Optional path to an experiment YAML file; defaults apply without one.
        config_path: Option<PathBuf>,
        /// Optional seed override.
        seed_override: Option<u64>,
        /// Optional run count override.
        runs_override: Option<usize>,
        /// Optional bouts-per-run override.
        bouts_override: Option<usize>,
        /// Print the result as JSON instead of the text summary.
        json: bool,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the arguments following `run`.
    fn parse_run_command(rest: &[String]) -> Command {
        let mut config_path = None;
        let mut seed_override = None;
        let mut runs_override = None;
        let mut bouts_override = None;
        let mut json = false;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--seed" => {
                    seed_override = rest.get(i + 1).and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--runs" => {
                    runs_override = rest.get(i + 1).and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--bouts" => {
                    bouts_override = rest.get(i + 1).and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                flag if flag.starts_with('-') => {
                    eprintln!("Ignoring unknown option: {flag}");
                    i += 1;
                }
                path => {
                    if config_path.is_none() {
                        config_path = Some(PathBuf::from(path));
                    }
                    i += 1;
                }
            }
        }

        Command::Run {
            config_path,
            seed_override,
            runs_override,
            bouts_override,
            json,
        }
    }
}
