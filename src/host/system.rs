//! The real host: std::fs, std::process and libc

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{Commands, Files, Identity, Owner};
use crate::error::CommandError;

/// Host implementation backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

/// Sibling path used while replacing `path`
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.kick-tmp"))
}

impl Files for SystemHost {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        // Replace the link target, not the link
        let path = &match fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
            Err(e) => return Err(e),
        };
        let previous = fs::metadata(path).ok();
        let staging = staging_path(path);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let result = (|| {
            let mut file = options.open(&staging)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;

            if let Some(meta) = &previous {
                fs::set_permissions(&staging, meta.permissions())?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::MetadataExt;
                    let current = file.metadata()?;
                    if current.uid() != meta.uid() || current.gid() != meta.gid() {
                        std::os::unix::fs::chown(&staging, Some(meta.uid()), Some(meta.gid()))?;
                    }
                }
            }

            fs::rename(&staging, path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            // Follows symlinks; dangling links are skipped
            if fs::metadata(&path).is_ok_and(|meta| meta.is_file()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::create_dir(path)?;
        self.set_mode(path, mode)
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn owner(&self, path: &Path) -> io::Result<Owner> {
        use std::os::unix::fs::MetadataExt;
        let meta = fs::metadata(path)?;
        Ok(Owner {
            uid: meta.uid(),
            gid: meta.gid(),
        })
    }

    #[cfg(not(unix))]
    fn owner(&self, path: &Path) -> io::Result<Owner> {
        fs::metadata(path)?;
        Ok(Owner { uid: 0, gid: 0 })
    }

    #[cfg(unix)]
    fn set_owner(&self, path: &Path, owner: Owner) -> io::Result<()> {
        // Skip the syscall when nothing changes, so unprivileged runs work
        if self.owner(path)? == owner {
            return Ok(());
        }
        std::os::unix::fs::chown(path, Some(owner.uid), Some(owner.gid))
    }

    #[cfg(not(unix))]
    fn set_owner(&self, _path: &Path, _owner: Owner) -> io::Result<()> {
        Ok(())
    }
}

impl Commands for SystemHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        debug!(program, ?args, "running command");
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(CommandError::Spawn)?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Status(status.to_string()))
        }
    }
}

impl Identity for SystemHost {
    #[cfg(unix)]
    fn effective_uid(&self) -> Option<u32> {
        // geteuid never fails
        Some(unsafe { libc::geteuid() })
    }

    #[cfg(not(unix))]
    fn effective_uid(&self) -> Option<u32> {
        None
    }
}
