// src/engine/mod.rs

//! Orchestration engine for compwatch.
//!
//! - [`cycle`] performs one compile-then-run cycle through the injected
//!   `Compiler` and `ProcessRunner`.
//! - [`watch_loop`] repeats cycles whenever the tracked source changes.
//! - [`shutdown`] is the cancellation hook for the watch loop.

use std::path::PathBuf;

use crate::types::CycleResult;

/// Watch loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next poll tick.
    Idle,
    /// A cycle is in progress.
    Cycling,
}

/// What happened during one poll tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Result of the cycle, if the tracked source changed.
    pub cycle: Option<CycleResult>,
    /// Sibling sources compiled this tick and whether each succeeded.
    pub siblings: Vec<(PathBuf, bool)>,
}

pub mod cycle;
pub mod shutdown;
pub mod watch_loop;

pub use cycle::{CycleRunner, OUTPUT_GRACE};
pub use shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
pub use watch_loop::WatchLoop;
