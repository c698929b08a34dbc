// src/types.rs

use std::fmt;

/// Outcome of a single compile-then-run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    CompiledAndRan,
    CompileFailed,
    /// The compiler exited successfully but the executable never appeared.
    OutputMissing,
    /// The executable (or the pipeline feeding it) exited non-zero.
    RunFailed(i32),
}

impl CycleResult {
    pub fn is_success(self) -> bool {
        matches!(self, CycleResult::CompiledAndRan)
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleResult::CompiledAndRan => write!(f, "compiled and ran"),
            CycleResult::CompileFailed => write!(f, "compile failed"),
            CycleResult::OutputMissing => write!(f, "output missing"),
            CycleResult::RunFailed(code) => write!(f, "run failed (exit code {code})"),
        }
    }
}

/// Process exit statuses.
///
/// Code 5 is reserved and never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Success, or usage was shown.
    Success = 0,
    /// Unexpected internal failure (config file, I/O).
    Failure = 1,
    InvalidSource = 2,
    CompileError = 3,
    RuntimeError = 4,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
