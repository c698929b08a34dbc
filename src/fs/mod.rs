// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
///
/// Everything the cycle and the watch loop need to know about the disk goes
/// through here, so tests can drive modification times deterministically.
pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// `path` itself is a symbolic link (not followed).
    fn is_symlink(&self, path: &Path) -> bool;

    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Last modification time of `path`.
    fn modified(&self, path: &Path) -> Result<SystemTime>;

    /// Entries of a directory, each joined onto `path`.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// The disk, through `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("stat {}", path.display()))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect())
            .with_context(|| format!("listing {}", path.display()))
    }
}

/// Compare two paths after dropping `.` components, falling back to the
/// canonical form when both exist on disk.
pub fn same_path(fs: &dyn FileSystem, a: &Path, b: &Path) -> bool {
    if strip_cur_dir(a) == strip_cur_dir(b) {
        return true;
    }
    match (fs.canonicalize(a), fs.canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn same_path_ignores_leading_cur_dir() {
        let fs = MockFileSystem::new();
        assert!(same_path(&fs, Path::new("./src/a.cpp"), Path::new("src/a.cpp")));
        assert!(!same_path(&fs, Path::new("./src/a.cpp"), Path::new("src/b.cpp")));
    }

    #[test]
    fn real_fs_reports_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.cpp");
        std::fs::write(&file, "int main() {}").unwrap();

        let fs = RealFileSystem;
        assert!(fs.is_file(&file));
        assert!(fs.modified(&file).is_ok());
        assert!(fs.modified(&dir.path().join("missing.cpp")).is_err());
    }
}
