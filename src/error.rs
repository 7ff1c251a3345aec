use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KickError>;

#[derive(Debug, Error)]
pub enum KickError {
    #[error("this command needs root privileges, run it with sudo")]
    PrivilegeRequired,

    #[error("public key must start with ssh-rsa, ssh-ed25519 or ecdsa-sha2-")]
    InvalidPublicKey,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restart the SSH service (last tried `{command}`): {source}")]
    Restart {
        command: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to restart the SSH service, please restart it manually")]
    NoRestartCommand,

    #[error("could not determine the home directory, pass --home")]
    HomeNotFound,

    #[error("operation cancelled by user")]
    Cancelled,

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failure of a single external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("could not start command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0}")]
    Status(String),
}
