// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Two quirks of the command line are handled before `clap` sees it:
//! - `-wp` is a two-letter short flag, which `clap` cannot express, so it is
//!   rewritten to `--wpattern`.
//! - Unknown flags and any other parse failure behave exactly like `--help`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::debug;

/// Command-line arguments for `compwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "compwatch",
    version,
    about = "Compile a single source file, run the result, and optionally re-run on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Source file to compile; the extension is optional.
    #[arg(short = 'f', long = "file", value_name = "SOURCE")]
    pub file: Option<String>,

    /// Path of the produced executable (defaults to the source name).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    /// Shell command whose output is piped into the executable's stdin.
    #[arg(short = 'c', long = "command", value_name = "CMD", allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Extra compiler flags, passed through as-is.
    #[arg(short = 's', long = "set", value_name = "FLAGS", allow_hyphen_values = true)]
    pub set: Option<String>,

    /// Polling interval in whole seconds; a positive value enables watch mode.
    #[arg(short = 'w', long = "watch", value_name = "SECONDS", allow_hyphen_values = true)]
    pub watch: Option<String>,

    /// Directory or glob scanned for sibling sources in watch mode (`-wp`).
    #[arg(long = "wpattern", value_name = "PATTERN")]
    pub wpattern: Option<String>,

    /// Arguments forwarded to the compiled executable.
    #[arg(short = 'a', long = "argvs", value_name = "ARGS", allow_hyphen_values = true)]
    pub argvs: Option<String>,

    /// Print informational status lines.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// External compiler program (default: `g++`).
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// Source-file extension convention (default: `cpp`).
    #[arg(long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// TOML file with toolchain defaults.
    ///
    /// Falls back to `COMPWATCH_CONFIG` when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Diagnostics level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COMPWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// What the command line asked for.
#[derive(Debug, Clone)]
pub enum Invocation {
    Run(CliArgs),
    /// Print this text and exit successfully.
    Usage(String),
}

/// Parse the process arguments.
pub fn parse() -> Invocation {
    parse_from(std::env::args_os())
}

/// Parse an explicit argument list (first item is the binary name).
pub fn parse_from<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = normalize_legacy_flags(args);
    match CliArgs::try_parse_from(args) {
        Ok(parsed) => Invocation::Run(parsed),
        Err(err) => match err.kind() {
            ErrorKind::DisplayVersion => Invocation::Usage(err.to_string()),
            kind => {
                debug!(?kind, error = %err, "argument parse failed; showing usage");
                Invocation::Usage(usage())
            }
        },
    }
}

/// Rendered help text.
pub fn usage() -> String {
    CliArgs::command().render_help().to_string()
}

fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some("-wp") => OsString::from("--wpattern"),
            Some(s) if s.starts_with("-wp=") => {
                OsString::from(format!("--wpattern={}", &s["-wp=".len()..]))
            }
            _ => arg,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> CliArgs {
        match parse_from(std::iter::once("compwatch").chain(args.iter().copied())) {
            Invocation::Run(a) => a,
            Invocation::Usage(text) => panic!("expected run, got usage:\n{text}"),
        }
    }

    fn is_usage(args: &[&str]) -> bool {
        matches!(
            parse_from(std::iter::once("compwatch").chain(args.iter().copied())),
            Invocation::Usage(_)
        )
    }

    #[test]
    fn short_flags_map_to_fields() {
        let a = run_args(&["-f", "demo", "-o", "demo_out", "-a", "1 2", "-v"]);
        assert_eq!(a.file.as_deref(), Some("demo"));
        assert_eq!(a.output.as_deref(), Some("demo_out"));
        assert_eq!(a.argvs.as_deref(), Some("1 2"));
        assert!(a.verbose);
    }

    #[test]
    fn two_letter_wp_flag_is_accepted() {
        let a = run_args(&["-f", "demo", "-w", "2", "-wp", "src/*.cpp"]);
        assert_eq!(a.watch.as_deref(), Some("2"));
        assert_eq!(a.wpattern.as_deref(), Some("src/*.cpp"));

        let b = run_args(&["-f", "demo", "-wp=lib"]);
        assert_eq!(b.wpattern.as_deref(), Some("lib"));
    }

    #[test]
    fn hyphenated_values_are_passed_through() {
        let a = run_args(&["-f", "demo", "-s", "-O2 -Wall", "-a", "-n 3"]);
        assert_eq!(a.set.as_deref(), Some("-O2 -Wall"));
        assert_eq!(a.argvs.as_deref(), Some("-n 3"));
    }

    #[test]
    fn help_and_unknown_flags_show_usage() {
        assert!(is_usage(&["-h"]));
        assert!(is_usage(&["--help"]));
        assert!(is_usage(&["--frobnicate"]));
        assert!(is_usage(&["-f"]));
    }

    #[test]
    fn usage_mentions_the_file_flag() {
        assert!(usage().contains("--file"));
    }
}
