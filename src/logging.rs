// src/logging.rs

//! Diagnostics for `compwatch` on stderr via `tracing`.
//!
//! The filter comes from, in order:
//! 1. `--log-level`
//! 2. `COMPWATCH_LOG`, using `EnvFilter` directive syntax (`debug`,
//!    `compwatch::exec=trace`, ...)
//! 3. `warn`
//!
//! Stdout is left to the status lines and the compiled program.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "COMPWATCH_LOG";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level, std::env::var(LOG_ENV).ok()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<String>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(LevelFilter::from(level).into());
    }

    let fallback = || EnvFilter::default().add_directive(LevelFilter::WARN.into());
    match env.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
            eprintln!("compwatch: ignoring invalid {LOG_ENV}={directives:?}: {err}");
            fallback()
        }),
        None => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_environment() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error".into()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn environment_directives_are_used() {
        let filter = build_filter(None, Some(" info ".into()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(build_filter(None, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            build_filter(None, Some(String::new())).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
