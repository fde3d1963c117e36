//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the generation pipeline and an
//! external system (filesystem, shell, type loader). Implementations live in
//! `src/adapters/`.

pub mod filesystem;
pub mod loader;
pub mod shell;

pub use filesystem::FileSystem;
pub use loader::{LoadOutcome, PackageLoader};
pub use shell::{ShellExecutor, ShellOutput};
