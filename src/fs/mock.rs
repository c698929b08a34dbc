// src/fs/mock.rs

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use anyhow::{bail, Result};

use super::FileSystem;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(BTreeSet<String>),
}

/// In-memory filesystem with controllable modification times.
///
/// Clones share the same tree, so a test can keep one handle while the code
/// under test owns another. `./src/a.cpp` and `src/a.cpp` are the same
/// entry; listings keep the caller's spelling.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    symlinks: Arc<Mutex<HashSet<PathBuf>>>,
    unreadable: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    /// An empty tree containing only `.`.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(BTreeSet::new()));
        Self {
            entries: Arc::new(Mutex::new(entries)),
            symlinks: Arc::default(),
            unreadable: Arc::default(),
        }
    }

    /// Add a file last modified an hour ago, so it never looks fresh to a
    /// baseline taken during the test.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.add_file_modified_at(path, SystemTime::now() - Duration::from_secs(3600));
    }

    /// Add (or replace) a file, creating parent directories as needed.
    pub fn add_file_modified_at(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = key(path.as_ref());
        let mut entries = self.lock();
        link_into_parent(&mut entries, &path);
        entries.insert(path, MockEntry::File { modified });
    }

    /// Set the modification time of an existing file to now.
    pub fn touch(&self, path: impl AsRef<Path>) {
        self.set_modified(path, SystemTime::now());
    }

    /// No-op for paths that are not files.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        if let Some(MockEntry::File { modified: m }) = self.lock().get_mut(&key(path.as_ref())) {
            *m = modified;
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = key(path.as_ref());
        let mut entries = self.lock();
        entries.remove(&path);
        if let (Some(MockEntry::Dir(children)), Some(name)) =
            (entries.get_mut(&parent_key(&path)), path.file_name())
        {
            children.remove(&*name.to_string_lossy());
        }
    }

    /// Report `path` as a symbolic link; it keeps resolving like its target.
    pub fn mark_symlink(&self, path: impl AsRef<Path>) {
        lock(&self.symlinks).insert(key(path.as_ref()));
    }

    /// Make listing the directory at `path` fail, like missing permissions.
    pub fn mark_unreadable(&self, path: impl AsRef<Path>) {
        lock(&self.unreadable).insert(key(path.as_ref()));
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        lock(&self.entries)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // Poisoning from a panicked test thread is ignored.
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Register `path` in its parent's listing, creating ancestors on the way.
fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if path == Path::new(".") {
        return;
    }
    let parent = parent_key(path);
    if !entries.contains_key(&parent) {
        link_into_parent(entries, &parent);
        entries.insert(parent.clone(), MockEntry::Dir(BTreeSet::new()));
    }
    if let (Some(MockEntry::Dir(children)), Some(name)) =
        (entries.get_mut(&parent), path.file_name())
    {
        children.insert(name.to_string_lossy().into_owned());
    }
}

/// Map key: the path without `.` components; `.` for the root.
fn key(path: &Path) -> PathBuf {
    let stripped: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if stripped.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        stripped
    }
}

fn parent_key(path: &Path) -> PathBuf {
    key(path.parent().unwrap_or(Path::new(".")))
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(&key(path)), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(&key(path)), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        lock(&self.symlinks).contains(&key(path))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let k = key(path);
        if !self.lock().contains_key(&k) {
            bail!("no such entry: {}", path.display());
        }
        Ok(k)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        match self.lock().get(&key(path)) {
            Some(MockEntry::File { modified }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => bail!("{} is a directory", path.display()),
            None => bail!("no such file: {}", path.display()),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if lock(&self.unreadable).contains(&key(path)) {
            bail!("permission denied: {}", path.display());
        }
        match self.lock().get(&key(path)) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => bail!("not a directory: {}", path.display()),
        }
    }
}
