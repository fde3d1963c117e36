//! Live adapters for real external interactions.

pub mod filesystem;
pub mod loader;
pub mod shell;
