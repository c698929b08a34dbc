// src/errors.rs

//! Crate-wide error type, result alias and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ExitStatus;

#[derive(Error, Debug)]
pub enum CompwatchError {
    #[error("no source file given (use -f/--file)")]
    MissingSource,

    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("invalid source argument: {0}")]
    InvalidSource(String),

    #[error("compilation of {} failed", .0.display())]
    Compile(PathBuf),

    #[error("compiler reported success but {} does not exist", .0.display())]
    OutputMissing(PathBuf),

    #[error("program exited with code {code}")]
    Runtime { code: i32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompwatchError {
    /// Process exit status this error maps to.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CompwatchError::MissingSource => ExitStatus::Success,
            CompwatchError::SourceNotFound(_) | CompwatchError::InvalidSource(_) => {
                ExitStatus::InvalidSource
            }
            CompwatchError::Compile(_) => ExitStatus::CompileError,
            CompwatchError::OutputMissing(_) | CompwatchError::Runtime { .. } => {
                ExitStatus::RuntimeError
            }
            CompwatchError::ConfigError(_)
            | CompwatchError::IoError(_)
            | CompwatchError::TomlError(_)
            | CompwatchError::Other(_) => ExitStatus::Failure,
        }
    }

    /// Whether usage text must accompany this error.
    pub fn shows_usage(&self) -> bool {
        matches!(
            self,
            CompwatchError::MissingSource
                | CompwatchError::SourceNotFound(_)
                | CompwatchError::InvalidSource(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CompwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_show_usage() {
        assert!(CompwatchError::MissingSource.shows_usage());
        assert!(CompwatchError::SourceNotFound(PathBuf::from("./x.cpp")).shows_usage());
        assert!(!CompwatchError::Compile(PathBuf::from("./x.cpp")).shows_usage());
    }

    #[test]
    fn exit_statuses_follow_taxonomy() {
        assert_eq!(CompwatchError::MissingSource.exit_status().code(), 0);
        assert_eq!(
            CompwatchError::SourceNotFound(PathBuf::from("a")).exit_status().code(),
            2
        );
        assert_eq!(CompwatchError::Compile(PathBuf::from("a")).exit_status().code(), 3);
        assert_eq!(
            CompwatchError::OutputMissing(PathBuf::from("a")).exit_status().code(),
            4
        );
        assert_eq!(CompwatchError::Runtime { code: 7 }.exit_status().code(), 4);
        assert_eq!(
            CompwatchError::ConfigError("bad".into()).exit_status().code(),
            1
        );
    }
}
