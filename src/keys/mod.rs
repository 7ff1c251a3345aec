//! Public key validation and authorized_keys installation

mod install;
mod validate;

pub use install::{
    authorized_keys_path, contains_key, install_key, ssh_dir, InstallOutcome,
    AUTHORIZED_KEYS_MODE, SSH_DIR_MODE,
};
pub use validate::{fingerprint, is_acceptable_public_key, validate_public_key, ACCEPTED_PREFIXES};
