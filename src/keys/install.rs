//! Append a public key to `~/.ssh/authorized_keys` exactly once

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{KickError, Result};
use crate::host::Files;

const SSH_DIR: &str = ".ssh";
const AUTHORIZED_KEYS_FILE: &str = "authorized_keys";

/// rwx------
pub const SSH_DIR_MODE: u32 = 0o700;
/// rw-------
pub const AUTHORIZED_KEYS_MODE: u32 = 0o600;

/// Result of [`install_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyPresent,
}

pub fn ssh_dir(home: &Path) -> PathBuf {
    home.join(SSH_DIR)
}

pub fn authorized_keys_path(home: &Path) -> PathBuf {
    ssh_dir(home).join(AUTHORIZED_KEYS_FILE)
}

/// Current store content; a missing store reads as empty
fn read_store(files: &impl Files, path: &Path) -> Result<String> {
    match files.read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(KickError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Check whether the store under `home` already holds `key`
pub fn contains_key(files: &impl Files, home: &Path, key: &str) -> Result<bool> {
    let content = read_store(files, &authorized_keys_path(home))?;
    Ok(content.contains(key))
}

/// Store content with `key` appended on its own line
fn append_key(existing: &str, key: &str) -> String {
    let mut content = String::with_capacity(existing.len() + key.len() + 2);
    content.push_str(existing);
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(key);
    content.push('\n');
    content
}

/// Install `key` into `<home>/.ssh/authorized_keys`.
///
/// Creates `.ssh` (0700) when missing and leaves the store untouched if the
/// key is already there. A written store is set to 0600 and handed to the
/// owner of `home`.
pub fn install_key(files: &impl Files, home: &Path, key: &str) -> Result<InstallOutcome> {
    let dir = ssh_dir(home);

    if !files.is_dir(&dir) {
        debug!(path = %dir.display(), "creating ssh directory");
        files
            .create_dir(&dir, SSH_DIR_MODE)
            .and_then(|()| files.owner(home))
            .and_then(|owner| files.set_owner(&dir, owner))
            .map_err(|e| KickError::DirCreate {
                path: dir.clone(),
                source: e,
            })?;
    }

    let path = authorized_keys_path(home);
    let existing = read_store(files, &path)?;

    if existing.contains(key) {
        info!(path = %path.display(), "key already authorized");
        return Ok(InstallOutcome::AlreadyPresent);
    }

    let home_owner = files.owner(home).map_err(|e| KickError::Read {
        path: home.to_path_buf(),
        source: e,
    })?;
    let content = append_key(&existing, key);
    files
        .write(&path, &content)
        .and_then(|()| files.set_mode(&path, AUTHORIZED_KEYS_MODE))
        .and_then(|()| files.set_owner(&path, home_owner))
        .map_err(|e| KickError::Write {
            path: path.clone(),
            source: e,
        })?;

    info!(path = %path.display(), "key appended");
    Ok(InstallOutcome::Installed)
}
