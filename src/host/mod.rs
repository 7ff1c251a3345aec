//! Host capabilities - file system, external commands and process identity
//!
//! Everything that touches the machine goes through these traits so the
//! reconciler, installer and restart logic can run against [`SystemHost`]
//! in production and an in-memory host in tests.

#[cfg(test)]
pub mod memory;
mod system;

use std::io;
use std::path::{Path, PathBuf};

use crate::error::CommandError;

pub use system::SystemHost;

/// Numeric owner of a file or directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

/// File system access used by the reconciler and the key installer
pub trait Files {
    /// Read a whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the whole file with `contents`.
    ///
    /// An existing file keeps its mode and owner; a new file is created 0600.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, sorted by path
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create a single directory with the given mode
    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    fn owner(&self, path: &Path) -> io::Result<Owner>;

    fn set_owner(&self, path: &Path, owner: Owner) -> io::Result<()>;
}

/// Runs external programs to completion
pub trait Commands {
    /// Run `program` with `args`; `Ok` only for a zero exit status
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

/// Identity of the running process
pub trait Identity {
    /// Effective user id, `None` if it cannot be determined
    fn effective_uid(&self) -> Option<u32>;
}
