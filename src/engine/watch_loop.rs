// src/engine/watch_loop.rs

//! Polling watch loop.
//!
//! The loop starts by recording the mtime of the tracked source and of every
//! sibling matched by the watch pattern. Every tick:
//! 1. If the tracked source's mtime differs from the recorded one, record
//!    the new mtime and run one cycle.
//! 2. If a watch pattern is set, compile (never run) each sibling source
//!    whose mtime differs from its record, or that is new.
//!
//! Mtimes are recorded before compiling, so an edit made while the
//! compiler runs still differs on the next tick.
//!
//! Ticks never overlap: the sleep only starts once the tick has finished,
//! however long the compiler or the program took.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::engine::cycle::CycleRunner;
use crate::engine::shutdown::ShutdownSignal;
use crate::engine::{LoopState, TickReport};
use crate::errors::{CompwatchError, Result};
use crate::exec::{CompileJob, Compiler, ProcessRunner};
use crate::watch::{sibling_sources, ChangeDetector, WatchBaseline, WatchPattern};

pub struct WatchLoop<'a, C: Compiler, R: ProcessRunner, D: ChangeDetector> {
    cycle: &'a CycleRunner<C, R>,
    cfg: &'a BuildConfig,
    detector: D,
    pattern: Option<WatchPattern>,
    source_file: PathBuf,
    baseline: WatchBaseline,
    interval: Duration,
    state: LoopState,
}

impl<C: Compiler, R: ProcessRunner, D: ChangeDetector> fmt::Debug for WatchLoop<'_, C, R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("source_file", &self.source_file)
            .field("pattern", &self.pattern)
            .field("baseline", &self.baseline)
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a, C: Compiler, R: ProcessRunner, D: ChangeDetector> WatchLoop<'a, C, R, D> {
    /// Create the loop and record the current state of every watched file.
    ///
    /// Fails when the watch pattern is not a valid glob.
    pub fn new(cycle: &'a CycleRunner<C, R>, cfg: &'a BuildConfig, detector: D) -> Result<Self> {
        let pattern = match cfg.watch_pattern.as_deref() {
            Some(raw) => Some(
                WatchPattern::parse(raw, cycle.fs().as_ref())
                    .map_err(|e| CompwatchError::ConfigError(format!("{e:#}")))?,
            ),
            None => None,
        };

        let mut watch = Self {
            cycle,
            cfg,
            detector,
            pattern,
            source_file: cfg.source_file(),
            baseline: WatchBaseline::new(),
            interval: cfg.watch_interval(),
            state: LoopState::Idle,
        };

        let source = watch.source_file.clone();
        watch.accept(&source);
        for file in watch.siblings() {
            watch.accept(&file);
        }
        Ok(watch)
    }

    /// Poll at a different interval than the configured whole seconds.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn baseline(&self) -> &WatchBaseline {
        &self.baseline
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Evaluate one poll tick without sleeping.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let cycle = self.cycle;
        let reporter = cycle.reporter();

        let source = self.source_file.clone();
        if self.detector.has_changed_since(&source, &self.baseline) {
            self.accept(&source);
            self.transition(LoopState::Cycling);
            reporter.info(format!("change detected in {}", source.display()));
            report.cycle = Some(cycle.run_cycle(self.cfg).await);
            self.transition(LoopState::Idle);
        } else {
            reporter.info(format!("no change in {}", source.display()));
        }

        for file in self.siblings() {
            if !self.detector.has_changed_since(&file, &self.baseline) {
                continue;
            }
            self.accept(&file);

            let ok = cycle.compile(&CompileJob::sibling(self.cfg, &file)).await;
            if ok {
                reporter.info(format!("compiled {}", file.display()));
            } else {
                reporter.error(format!("compile error in {}", file.display()));
            }
            report.siblings.push((file, ok));
        }

        report
    }

    /// Record the current mtime of `path` as seen.
    fn accept(&mut self, path: &Path) {
        let modified = self.detector.observe(path);
        self.baseline.record(path, modified);
    }

    /// Sibling sources under the watch pattern; empty without one.
    fn siblings(&self) -> Vec<PathBuf> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let fs = self.cycle.fs().as_ref();
        match sibling_sources(fs, pattern, &self.cfg.extension, &self.source_file) {
            Ok(files) => files,
            Err(err) => {
                warn!(?pattern, error = %err, "scanning watch pattern failed");
                self.cycle
                    .reporter()
                    .warn(format!("cannot scan watch pattern: {err:#}"));
                Vec::new()
            }
        }
    }

    /// Poll until `shutdown` fires. Without a shutdown request this never
    /// returns.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        info!(source = %self.source_file.display(), interval = ?self.interval, "watch loop started");
        self.cycle.reporter().info(format!(
            "watching {} every {}s",
            self.source_file.display(),
            self.interval.as_secs_f64()
        ));

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let report = self.tick().await;
            debug!(?report, "tick finished");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.triggered() => break,
            }
        }

        info!("watch loop stopped");
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "watch loop state change");
        self.state = next;
    }
}
