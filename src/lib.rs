//! kick - switch an SSH server to key-only authentication
//!
//! This crate:
//! - Reconciles `sshd_config` with a fixed set of hardened directives
//! - Comments out `PasswordAuthentication yes` in `sshd_config.d` fragments
//! - Appends a public key to `~/.ssh/authorized_keys` exactly once
//! - Restarts the SSH daemon through `service` or `systemctl`

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod keys;
pub mod logging;
pub mod privilege;
pub mod service;
pub mod sshd;

pub use error::{CommandError, KickError, Result};
