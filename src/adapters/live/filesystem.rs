//! Live filesystem adapter using `std::fs`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PortError;
use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_file(&self, path: &Path, contents: &str, mode: u32) -> Result<(), PortError> {
        std::fs::write(path, contents)?;
        set_mode(path, mode)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<(), PortError> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        Ok(builder.create(path)?)
    }

    fn list_recursive(&self, root: &Path) -> Result<Vec<PathBuf>, PortError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            paths.push(entry?.into_path());
        }
        Ok(paths)
    }

    fn remove_all(&self, path: &Path) -> Result<(), PortError> {
        let metadata = std::fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), PortError> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), PortError> {
    Ok(())
}
