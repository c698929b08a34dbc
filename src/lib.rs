// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_defaults, resolve_config, BuildConfig};
use crate::engine::{shutdown_channel, CycleRunner, ShutdownSignal, WatchLoop};
use crate::errors::{CompwatchError, Result};
use crate::exec::{Compiler, ExternalCompiler, ProcessRunner, SystemProcessRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::Reporter;
use crate::types::CycleResult;
use crate::watch::{ChangeDetector, MtimeChangeDetector};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - optional toolchain defaults file
/// - argument resolution
/// - the external compiler and process runner
/// - (optional) the polling watch loop, stopped by Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let defaults = load_defaults(args.config.as_deref())?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cfg = resolve_config(&args, &defaults, fs.as_ref())?;

    let reporter = Reporter::stdout(cfg.verbose);
    let cycle = CycleRunner::new(ExternalCompiler, SystemProcessRunner, Arc::clone(&fs), reporter);

    let shutdown = if cfg.is_watch_mode() {
        shutdown_on_ctrl_c()
    } else {
        // Single-run mode never waits on the signal.
        shutdown_channel().1
    };

    execute(&cycle, &cfg, MtimeChangeDetector::new(fs), shutdown).await
}

/// Run one cycle, or the watch loop when an interval is configured.
///
/// In single-run mode a failed cycle becomes the matching error. In watch
/// mode cycle failures are only reported and this returns once `shutdown`
/// fires.
pub async fn execute<C, R, D>(
    cycle: &CycleRunner<C, R>,
    cfg: &BuildConfig,
    detector: D,
    shutdown: ShutdownSignal,
) -> Result<()>
where
    C: Compiler,
    R: ProcessRunner,
    D: ChangeDetector,
{
    if !cfg.is_watch_mode() {
        let result = cycle.run_cycle(cfg).await;
        return cycle_outcome(result, cfg);
    }

    let watch = WatchLoop::new(cycle, cfg, detector)?;

    let initial = cycle.run_cycle(cfg).await;
    debug!(%initial, success = initial.is_success(), "initial cycle finished; entering watch loop");

    watch.run(shutdown).await;
    Ok(())
}

fn cycle_outcome(result: CycleResult, cfg: &BuildConfig) -> Result<()> {
    match result {
        CycleResult::CompiledAndRan => Ok(()),
        CycleResult::CompileFailed => Err(CompwatchError::Compile(cfg.source_file())),
        CycleResult::OutputMissing => Err(CompwatchError::OutputMissing(cfg.output_path.clone())),
        CycleResult::RunFailed(code) => Err(CompwatchError::Runtime { code }),
    }
}

/// Ctrl-C -> graceful stop of the watch loop.
fn shutdown_on_ctrl_c() -> ShutdownSignal {
    let (handle, signal) = shutdown_channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; stopping watch loop");
        handle.trigger();
    });
    signal
}
