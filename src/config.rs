//! Host paths the tool operates on

use std::path::PathBuf;

use crate::error::{KickError, Result};
use crate::keys;

pub const DEFAULT_SSHD_CONFIG: &str = "/etc/ssh/sshd_config";
pub const DEFAULT_SSHD_CONFIG_DIR: &str = "/etc/ssh/sshd_config.d";

/// Locations of the daemon config, its override fragments and the target home
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    pub sshd_config: PathBuf,
    pub sshd_config_dir: PathBuf,
    pub home: PathBuf,
}

impl HostLayout {
    /// Build a layout, falling back to the invoking user's home directory
    pub fn resolve(
        sshd_config: Option<PathBuf>,
        sshd_config_dir: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self> {
        let home = home
            .or_else(dirs::home_dir)
            .ok_or(KickError::HomeNotFound)?;

        Ok(Self {
            sshd_config: sshd_config.unwrap_or_else(|| PathBuf::from(DEFAULT_SSHD_CONFIG)),
            sshd_config_dir: sshd_config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_SSHD_CONFIG_DIR)),
            home,
        })
    }

    pub fn authorized_keys(&self) -> PathBuf {
        keys::authorized_keys_path(&self.home)
    }
}
