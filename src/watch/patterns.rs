// src/watch/patterns.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, warn};

use crate::fs::{same_path, FileSystem};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Compiled `-wp` pattern: a directory to scan plus a glob evaluated
/// relative to it.
///
/// - `lib` (an existing directory) scans everything below `lib`.
/// - `src/**/*.cpp` scans `src` and matches `**/*.cpp` against paths
///   relative to it.
/// - `*.cpp` scans the current directory.
#[derive(Clone)]
pub struct WatchPattern {
    raw: String,
    root: PathBuf,
    matcher: GlobMatcher,
}

impl fmt::Debug for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPattern")
            .field("raw", &self.raw)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WatchPattern {
    pub fn parse(pattern: &str, fs: &dyn FileSystem) -> Result<Self> {
        let (root, rest) = if fs.is_dir(Path::new(pattern)) {
            (PathBuf::from(pattern), "**/*".to_string())
        } else {
            split_literal_prefix(pattern)
        };

        let matcher = GlobBuilder::new(&rest)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid watch pattern: {pattern}"))?
            .compile_matcher();

        Ok(Self {
            raw: pattern.to_string(),
            root,
            matcher,
        })
    }

    /// `rel_path` is relative to the scanned root, with forward slashes.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }

    /// Collect all files under the root that match this pattern, sorted.
    ///
    /// Symlinked directories are not descended into, so link cycles cannot
    /// repeat files. Only an unreadable root is an error; unreadable
    /// subdirectories are logged and skipped.
    pub fn collect_matching_files(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = fs
            .read_dir(&self.root)
            .with_context(|| format!("scanning watch pattern {}", self.raw))?;

        while let Some(path) = stack.pop() {
            if fs.is_dir(&path) {
                if fs.is_symlink(&path) {
                    debug!(path = %path.display(), "not following symlinked directory");
                    continue;
                }
                match fs.read_dir(&path) {
                    Ok(children) => stack.extend(children),
                    Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable directory"),
                }
            } else if fs.is_file(&path) && self.matches_path(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn matches_path(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .map(|rel| self.matches(&rel.to_string_lossy().replace('\\', "/")))
            .unwrap_or(false)
    }
}

/// Split `src/**/*.cpp` into (`src`, `**/*.cpp`).
///
/// A pattern without glob characters that is not a directory is treated as
/// a single file name inside its parent.
fn split_literal_prefix(pattern: &str) -> (PathBuf, String) {
    let mut root = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();

    for component in Path::new(pattern).components() {
        let part = component.as_os_str().to_string_lossy().into_owned();
        let is_glob = part.contains(GLOB_META);
        if rest.is_empty() && !is_glob {
            root.push(component.as_os_str());
        } else if !matches!(component, Component::CurDir) {
            rest.push(part);
        }
    }

    if rest.is_empty() {
        // Literal path: scan its parent for exactly that name.
        if let Some(name) = root.file_name().map(|n| n.to_string_lossy().into_owned()) {
            rest.push(name);
            root.pop();
        }
    }

    if root.as_os_str().is_empty() {
        root = PathBuf::from(".");
    }
    (root, rest.join("/"))
}

/// Source files matched by `pattern` that share the tracked source's
/// `extension`, excluding `primary` itself.
pub fn sibling_sources(
    fs: &dyn FileSystem,
    pattern: &WatchPattern,
    extension: &str,
    primary: &Path,
) -> Result<Vec<PathBuf>> {
    let candidates = pattern.collect_matching_files(fs)?;

    Ok(candidates
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .filter(|p| !same_path(fs, p, primary))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn literal_prefix_becomes_root() {
        assert_eq!(
            split_literal_prefix("src/**/*.cpp"),
            (PathBuf::from("src"), "**/*.cpp".to_string())
        );
        assert_eq!(
            split_literal_prefix("*.cpp"),
            (PathBuf::from("."), "*.cpp".to_string())
        );
        assert_eq!(
            split_literal_prefix("./lib/*.cc"),
            (PathBuf::from("./lib"), "*.cc".to_string())
        );
        assert_eq!(
            split_literal_prefix("lib/util.cpp"),
            (PathBuf::from("lib"), "util.cpp".to_string())
        );
    }

    #[test]
    fn star_does_not_cross_directories() {
        let fs = MockFileSystem::new();
        let pattern = WatchPattern::parse("src/*.cpp", &fs).unwrap();
        assert!(pattern.matches("a.cpp"));
        assert!(!pattern.matches("nested/a.cpp"));
    }

    #[test]
    fn directory_pattern_scans_recursively() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/a.cpp");
        fs.add_file("lib/deep/b.cpp");
        fs.add_file("other/c.cpp");

        let pattern = WatchPattern::parse("lib", &fs).unwrap();
        let files = pattern.collect_matching_files(&fs).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("lib/a.cpp"), PathBuf::from("lib/deep/b.cpp")]
        );
    }

    #[test]
    fn sibling_sources_filter_extension_and_primary() {
        let fs = MockFileSystem::new();
        fs.add_file("./main.cpp");
        fs.add_file("./util.cpp");
        fs.add_file("./notes.txt");

        let pattern = WatchPattern::parse(".", &fs).unwrap();
        let siblings = sibling_sources(&fs, &pattern, "cpp", Path::new("./main.cpp")).unwrap();

        assert_eq!(siblings, vec![PathBuf::from("./util.cpp")]);
    }

    #[test]
    fn symlinked_directories_are_not_descended() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/util.cpp");
        fs.add_file("lib/self/util.cpp");
        fs.mark_symlink("lib/self");

        let pattern = WatchPattern::parse("lib", &fs).unwrap();
        assert_eq!(
            pattern.collect_matching_files(&fs).unwrap(),
            vec![PathBuf::from("lib/util.cpp")]
        );
    }

    #[test]
    fn unreadable_subdirectory_is_skipped() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/util.cpp");
        fs.add_file("lib/locked/secret.cpp");
        fs.mark_unreadable("lib/locked");

        let pattern = WatchPattern::parse("lib", &fs).unwrap();
        assert_eq!(
            pattern.collect_matching_files(&fs).unwrap(),
            vec![PathBuf::from("lib/util.cpp")]
        );
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_file("lib/util.cpp");
        fs.mark_unreadable("lib");

        let pattern = WatchPattern::parse("lib", &fs).unwrap();
        assert!(pattern.collect_matching_files(&fs).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn self_referencing_symlink_on_disk_yields_each_file_once() {
        use crate::fs::RealFileSystem;

        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir(&lib).unwrap();
        std::fs::write(lib.join("util.cpp"), "int f();").unwrap();
        std::os::unix::fs::symlink(&lib, lib.join("self")).unwrap();

        let fs = RealFileSystem;
        let pattern = WatchPattern::parse(&lib.to_string_lossy(), &fs).unwrap();
        assert_eq!(
            pattern.collect_matching_files(&fs).unwrap(),
            vec![lib.join("util.cpp")]
        );
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let fs = MockFileSystem::new();
        assert!(WatchPattern::parse("src/[*.cpp", &fs).is_err());
    }
}
