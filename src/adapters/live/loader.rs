//! Package loaders backed by an external type exporter.

use std::path::{Path, PathBuf};

use crate::error::{PackageLoadError, PortError};
use crate::ports::filesystem::FileSystem;
use crate::ports::loader::{LoadOutcome, PackageLoader};
use crate::ports::shell::ShellExecutor;
use crate::types::TypeExport;

/// Runs an exporter command and parses its JSON [`TypeExport`] from stdout.
///
/// The requested package paths are appended to the command, each quoted for
/// the shell.
pub struct CommandPackageLoader {
    shell: Box<dyn ShellExecutor>,
    command: String,
    working_dir: Option<PathBuf>,
}

impl CommandPackageLoader {
    /// Creates a loader that runs `command` through `shell`.
    pub fn new(shell: Box<dyn ShellExecutor>, command: impl Into<String>) -> Self {
        Self { shell, command: command.into(), working_dir: None }
    }

    /// Runs the command from `dir` instead of the current directory.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command_line(&self, paths: &[String]) -> String {
        let mut line = match &self.working_dir {
            Some(dir) => format!("cd {} && {}", shell_quote(&dir.to_string_lossy()), self.command),
            None => self.command.clone(),
        };
        for path in paths {
            line.push(' ');
            line.push_str(&shell_quote(path));
        }
        line
    }
}

impl PackageLoader for CommandPackageLoader {
    fn load_packages(&self, paths: &[String]) -> Result<LoadOutcome, PortError> {
        let line = self.command_line(paths);
        let output = self.shell.run(&line)?;
        if output.exit_code != 0 {
            return Err(format!(
                "type exporter `{}` exited with code {}: {}",
                self.command,
                output.exit_code,
                output.stderr.trim()
            )
            .into());
        }
        let export: TypeExport = serde_json::from_str(&output.stdout)
            .map_err(|e| format!("type exporter `{}` produced invalid output: {e}", self.command))?;
        Ok(select(export, paths))
    }
}

/// Serves packages from a previously exported YAML or JSON [`TypeExport`] file.
pub struct ExportFilePackageLoader {
    fs: Box<dyn FileSystem>,
    path: PathBuf,
}

impl ExportFilePackageLoader {
    /// Creates a loader reading the export at `path` through `fs`.
    pub fn new(fs: Box<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self { fs, path: path.into() }
    }

    /// Location of the export file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageLoader for ExportFilePackageLoader {
    fn load_packages(&self, paths: &[String]) -> Result<LoadOutcome, PortError> {
        let contents = self.fs.read_to_string(&self.path).map_err(|e| {
            format!("failed to read type export {}: {e}", self.path.display())
        })?;
        // YAML is a superset of JSON, so one parser covers both formats.
        let export: TypeExport = serde_yaml::from_str(&contents).map_err(|e| {
            format!("failed to parse type export {}: {e}", self.path.display())
        })?;
        Ok(select(export, paths))
    }
}

/// Keeps the requested packages of `export`, reporting requested paths that
/// are neither loaded nor already listed as failed.
fn select(export: TypeExport, paths: &[String]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    for package in export.packages {
        if paths.contains(&package.path) {
            outcome.packages.insert(package.path.clone(), package);
        }
    }
    outcome.errors = export.errors.into_iter().filter(|e| paths.contains(&e.path)).collect();
    for path in paths {
        let reported = outcome.errors.iter().any(|e| &e.path == path);
        if !outcome.packages.contains_key(path) && !reported {
            outcome.errors.push(PackageLoadError {
                path: path.clone(),
                message: "package not found in type export".to_string(),
            });
        }
    }
    outcome
}

/// Quotes `arg` for a POSIX shell.
fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_'))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
