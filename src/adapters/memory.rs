//! In-memory adapters for exercising the pipeline without disk or a type
//! exporter.
//!
//! Clones share state, so a test can hand one clone to a [`ServiceContext`]
//! and inspect the tree through another.
//!
//! [`ServiceContext`]: crate::context::ServiceContext

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::error::{FsOp, PackageLoadError, PortError};
use crate::ports::filesystem::FileSystem;
use crate::ports::loader::{LoadOutcome, PackageLoader};
use crate::types::LoadedPackage;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    File { contents: String, mode: u32 },
    Dir { mode: u32 },
}

#[derive(Debug, Default)]
struct Tree {
    entries: BTreeMap<PathBuf, Entry>,
    failures: HashSet<(FsOp, PathBuf)>,
}

/// Filesystem held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem; only `/` exists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating its parent directories.
    pub fn insert_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut tree = self.lock();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut tree, parent, 0o755);
        }
        tree.entries
            .insert(path.to_path_buf(), Entry::File { contents: contents.to_string(), mode: 0o644 });
    }

    /// Adds a directory and its parents.
    pub fn insert_dir(&self, path: impl AsRef<Path>) {
        insert_dirs(&mut self.lock(), path.as_ref(), 0o755);
    }

    /// Makes every later `op` on exactly `path` fail.
    pub fn fail_on(&self, op: FsOp, path: impl AsRef<Path>) {
        self.lock().failures.insert((op, path.as_ref().to_path_buf()));
    }

    /// Returns the contents of a file, if present.
    #[must_use]
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.lock().entries.get(path.as_ref()) {
            Some(Entry::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Returns the permission bits recorded for a path, if present.
    #[must_use]
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.lock().entries.get(path.as_ref()).map(|entry| match entry {
            Entry::File { mode, .. } | Entry::Dir { mode } => *mode,
        })
    }

    /// Returns every path in the tree, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().entries.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check(tree: &Tree, op: FsOp, path: &Path) -> Result<(), PortError> {
        if tree.failures.contains(&(op, path.to_path_buf())) {
            return Err(format!("injected {op} failure").into());
        }
        Ok(())
    }
}

fn insert_dirs(tree: &mut Tree, path: &Path, mode: u32) {
    for ancestor in path.ancestors() {
        if is_root(ancestor) {
            break;
        }
        tree.entries.entry(ancestor.to_path_buf()).or_insert(Entry::Dir { mode });
    }
}

fn is_root(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.parent().is_none()
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let tree = self.lock();
        Self::check(&tree, FsOp::Read, path)?;
        match tree.entries.get(path) {
            Some(Entry::File { contents, .. }) => Ok(contents.clone()),
            Some(Entry::Dir { .. }) => Err(format!("{} is a directory", path.display()).into()),
            None => Err(format!("file not found: {}", path.display()).into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        is_root(path) || self.lock().entries.contains_key(path)
    }

    fn write_file(&self, path: &Path, contents: &str, mode: u32) -> Result<(), PortError> {
        let mut tree = self.lock();
        Self::check(&tree, FsOp::Write, path)?;
        if let Some(parent) = path.parent().filter(|p| !is_root(p)) {
            if !matches!(tree.entries.get(parent), Some(Entry::Dir { .. })) {
                return Err(format!("parent directory missing: {}", parent.display()).into());
            }
        }
        if matches!(tree.entries.get(path), Some(Entry::Dir { .. })) {
            return Err(format!("{} is a directory", path.display()).into());
        }
        tree.entries.insert(path.to_path_buf(), Entry::File { contents: contents.to_string(), mode });
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<(), PortError> {
        let mut tree = self.lock();
        Self::check(&tree, FsOp::CreateDir, path)?;
        for ancestor in path.ancestors().take_while(|p| !is_root(p)) {
            if matches!(tree.entries.get(ancestor), Some(Entry::File { .. })) {
                return Err(format!("{} is a file", ancestor.display()).into());
            }
        }
        insert_dirs(&mut tree, path, mode);
        Ok(())
    }

    fn list_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, PortError> {
        let tree = self.lock();
        Self::check(&tree, FsOp::List, root)?;
        if !is_root(root) && !matches!(tree.entries.get(root), Some(Entry::Dir { .. })) {
            return Err(format!("no such directory: {}", root.display()).into());
        }
        Ok(tree.entries.keys().filter(|p| p.starts_with(root) && *p != root).cloned().collect())
    }

    fn remove_all(&self, path: &Path) -> Result<(), PortError> {
        let mut tree = self.lock();
        Self::check(&tree, FsOp::Remove, path)?;
        if !tree.entries.contains_key(path) {
            return Err(format!("no such file or directory: {}", path.display()).into());
        }
        tree.entries.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

/// Package loader serving a fixed set of packages.
///
/// Records every batch of paths it is asked for.
#[derive(Debug, Clone, Default)]
pub struct StaticPackageLoader {
    packages: IndexMap<String, LoadedPackage>,
    errors: Vec<PackageLoadError>,
    serve_everything: bool,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl StaticPackageLoader {
    /// Creates a loader with no packages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package that loads successfully.
    #[must_use]
    pub fn with_package(mut self, package: LoadedPackage) -> Self {
        self.packages.insert(package.path.clone(), package);
        self
    }

    /// Adds a package that fails to load.
    #[must_use]
    pub fn with_error(mut self, path: &str, message: &str) -> Self {
        self.errors.push(PackageLoadError { path: path.to_string(), message: message.to_string() });
        self
    }

    /// Returns every registered package regardless of what was requested.
    #[must_use]
    pub fn serving_everything(mut self) -> Self {
        self.serve_everything = true;
        self
    }

    /// Fails every load as a whole, as a crashed exporter would.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Returns the batches of paths requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

impl PackageLoader for StaticPackageLoader {
    fn load_packages(&self, paths: &[String]) -> Result<LoadOutcome, PortError> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(paths.to_vec());
        if let Some(message) = &self.failure {
            return Err(message.clone().into());
        }

        let mut outcome = LoadOutcome::default();
        for (path, package) in &self.packages {
            if self.serve_everything || paths.contains(path) {
                outcome.packages.insert(path.clone(), package.clone());
            }
        }
        outcome.errors = self.errors.iter().filter(|e| paths.contains(&e.path)).cloned().collect();
        Ok(outcome)
    }
}
