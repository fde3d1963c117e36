//! Writes generated mocks to disk and removes ones that are no longer
//! generated.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::context::ServiceContext;
use crate::destination::{Destination, DestinationResolver};
use crate::error::{Error, FsOp, Result};
use crate::synth::GeneratedMock;

/// Permission bits for created directories.
pub const DIR_MODE: u32 = 0o755;
/// Permission bits for written mock files.
pub const FILE_MODE: u32 = 0o644;

/// Places mocks under their destinations and reconciles mock directories.
///
/// All I/O goes through `ctx.fs`.
pub struct MockWriter<'a> {
    ctx: &'a ServiceContext,
    destinations: DestinationResolver,
}

impl<'a> MockWriter<'a> {
    /// Creates a writer resolving destinations with `destinations`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, destinations: DestinationResolver) -> Self {
        Self { ctx, destinations }
    }

    /// Writes every mock, continuing past failures.
    ///
    /// Files that were written stay on disk even when others fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] listing every mock that could not be placed
    /// or written.
    pub fn write(&self, mocks: &[GeneratedMock]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(mocks.len());
        let mut failures = Vec::new();

        for mock in mocks {
            match self.write_one(mock) {
                Ok(path) => {
                    tracing::debug!(package = %mock.package.path, path = %path.display(), "wrote mock");
                    written.push(path);
                }
                Err(e) => {
                    tracing::warn!(package = %mock.package.path, error = %e, "failed to write mock");
                    failures.push(e);
                }
            }
        }

        if failures.is_empty() {
            Ok(written)
        } else {
            Err(Error::Write(failures))
        }
    }

    fn write_one(&self, mock: &GeneratedMock) -> Result<PathBuf> {
        let path = self.destinations.resolve(&mock.package.path)?.full_file_path();
        if let Some(dir) = path.parent() {
            self.ctx.fs.create_dir_all(dir, DIR_MODE).map_err(|e| Error::fs(FsOp::CreateDir, dir, e))?;
        }
        self.ctx
            .fs
            .write_file(&path, &mock.source, FILE_MODE)
            .map_err(|e| Error::fs(FsOp::Write, &path, e))?;
        Ok(path)
    }

    /// Lists paths under the destinations' mock roots that no destination
    /// accounts for, without removing anything.
    ///
    /// A path is live when it is some destination's file or one of that
    /// file's ancestors. Paths below an already-stale directory are not
    /// listed separately. Mock roots that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fs`] if a mock root cannot be listed.
    pub fn stale_paths(&self, destinations: &[Destination]) -> Result<Vec<PathBuf>> {
        let live: Vec<PathBuf> = destinations.iter().map(Destination::full_file_path).collect();
        let roots: IndexSet<PathBuf> = destinations.iter().map(Destination::mock_root).collect();

        let mut stale: Vec<PathBuf> = Vec::new();
        for root in &roots {
            if !self.ctx.fs.exists(root) {
                tracing::debug!(root = %root.display(), "mock root does not exist, nothing to tidy");
                continue;
            }
            let mut listed =
                self.ctx.fs.list_recursive(root).map_err(|e| Error::fs(FsOp::List, root, e))?;
            listed.sort();

            for path in listed {
                if is_live(&path, &live) || stale.iter().any(|gone| path.starts_with(gone)) {
                    continue;
                }
                stale.push(path);
            }
        }
        Ok(stale)
    }

    /// Removes everything [`MockWriter::stale_paths`] reports.
    ///
    /// Stops at the first failure; paths removed before it stay removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fs`] for the first listing or removal that fails.
    pub fn tidy(&self, destinations: &[Destination]) -> Result<Vec<PathBuf>> {
        let stale = self.stale_paths(destinations)?;
        for path in &stale {
            self.ctx.fs.remove_all(path).map_err(|e| Error::fs(FsOp::Remove, path, e))?;
            tracing::debug!(path = %path.display(), "removed stale mock path");
        }
        Ok(stale)
    }
}

/// Whether `path` is, or is an ancestor of, one of the `live` files.
fn is_live(path: &Path, live: &[PathBuf]) -> bool {
    live.iter().any(|file| file.starts_with(path))
}
