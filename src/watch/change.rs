// src/watch/change.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::fs::FileSystem;

/// Modification times last observed by the watch loop, per file.
///
/// A file has changed when its current mtime differs from the recorded one,
/// or when it was never recorded (it appeared after the loop started).
/// Comparing file stamps with file stamps keeps the process clock out of
/// the decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchBaseline {
    seen: HashMap<PathBuf, SystemTime>,
}

impl WatchBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `modified` for `path`. `None` (unreadable file) keeps the
    /// previous record.
    pub fn record(&mut self, path: &Path, modified: Option<SystemTime>) {
        if let Some(m) = modified {
            self.seen.insert(path.to_path_buf(), m);
        }
    }

    pub fn last_seen(&self, path: &Path) -> Option<SystemTime> {
        self.seen.get(path).copied()
    }

    /// Whether a file currently stamped `current` counts as changed.
    ///
    /// A missing file is never a change; editors that save by rename leave
    /// the path empty for a moment.
    pub fn is_change(&self, path: &Path, current: Option<SystemTime>) -> bool {
        match (current, self.last_seen(path)) {
            (None, _) => false,
            (Some(now), Some(prev)) => now != prev,
            (Some(_), None) => true,
        }
    }
}

/// Decides whether a file changed since a baseline.
///
/// The watch loop only depends on this trait, so the polling implementation
/// can be replaced by native change notification.
pub trait ChangeDetector: Send + Sync {
    /// Current modification time of `path`, `None` when it cannot be read.
    fn observe(&self, path: &Path) -> Option<SystemTime>;

    fn has_changed_since(&self, path: &Path, baseline: &WatchBaseline) -> bool {
        baseline.is_change(path, self.observe(path))
    }
}

/// Modification-time polling.
#[derive(Debug, Clone)]
pub struct MtimeChangeDetector {
    fs: Arc<dyn FileSystem>,
}

impl MtimeChangeDetector {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl ChangeDetector for MtimeChangeDetector {
    fn observe(&self, path: &Path) -> Option<SystemTime> {
        match self.fs.modified(path) {
            Ok(modified) => Some(modified),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cannot stat watched file");
                None
            }
        }
    }
}
