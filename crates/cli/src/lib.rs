//! Command-line front end for the generator: `ngapi generate` and `ngapi check`.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

mod check;
mod config;
mod generate;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub use config::{ConfigFile, GeneratorArgs, Resolved};

#[derive(Parser)]
#[command(
    name = "ngapi",
    version,
    about = "Generate Angular/RxJS TypeScript clients from OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the client module
    Generate(generate::GenerateArgs),
    /// Fail if the client module on disk is out of date
    Check(check::CheckArgs),
}

/// Parse `args` (including the program name) and run the selected command.
/// Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => generate::run(&args),
            Some(Commands::Check(args)) => check::run(&args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

pub(crate) fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

/// Install the stderr log subscriber.
///
/// `NGAPI_LOG` takes a plain level ("debug", "warn", ...) applied to the ngapi crates,
/// or a full tracing filter spec like "ngapi_core=trace".
pub fn init_tracing() {
    let filter = match std::env::var("NGAPI_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("ngapi_core={level},ngapi_cli={level}")
        }
        Ok(spec) => spec,
        Err(_) => "ngapi_core=info,ngapi_cli=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("ngapi_core=debug"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_prints_help() {
        assert_eq!(run_cli(vec!["ngapi".to_string()]), 0);
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let code = run_cli(vec!["ngapi".to_string(), "generate".to_string(), "--bogus".to_string()]);
        assert_eq!(code, 2);
    }
}
