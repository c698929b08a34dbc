// src/config/mod.rs

//! Configuration for compwatch.
//!
//! Responsibilities:
//! - Define the resolved build settings and the TOML defaults model (`model.rs`).
//! - Load an optional defaults file from disk (`loader.rs`).
//! - Resolve command-line arguments into a `BuildConfig` (`resolve.rs`).

pub mod loader;
pub mod model;
pub mod resolve;

pub use loader::{load_defaults, load_from_path};
pub use model::{BuildConfig, CompilerSection, ToolchainDefaults, WatchSection};
pub use resolve::resolve_config;
