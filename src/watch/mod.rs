// src/watch/mod.rs

//! Change detection.
//!
//! This module is responsible for:
//! - Remembering the modification times the watch loop last observed.
//! - Deciding whether a file changed against them (`ChangeDetector`).
//! - Compiling the optional `-wp` pattern and listing the sibling sources
//!   under it.
//!
//! It does **not** compile or run anything; the engine does that.

pub mod change;
pub mod patterns;

pub use change::{ChangeDetector, MtimeChangeDetector, WatchBaseline};
pub use patterns::{sibling_sources, WatchPattern};
