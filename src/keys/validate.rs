//! Shallow public key check
//!
//! Only the algorithm prefix is inspected. The key body is never decoded
//! here; [`fingerprint`] parses it on a best-effort basis for display only.

use ssh_key::{HashAlg, PublicKey};

use crate::error::{KickError, Result};

/// Algorithm prefixes accepted for authorized keys
pub const ACCEPTED_PREFIXES: &[&str] = &["ssh-rsa", "ssh-ed25519", "ecdsa-sha2-"];

pub fn is_acceptable_public_key(candidate: &str) -> bool {
    let key = candidate.trim();
    !key.is_empty() && ACCEPTED_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Validate a candidate and return it trimmed
pub fn validate_public_key(candidate: &str) -> Result<&str> {
    if is_acceptable_public_key(candidate) {
        Ok(candidate.trim())
    } else {
        Err(KickError::InvalidPublicKey)
    }
}

/// SHA256 fingerprint in OpenSSH notation, if the key parses
pub fn fingerprint(key: &str) -> Option<String> {
    PublicKey::from_openssh(key.trim())
        .ok()
        .map(|k| k.fingerprint(HashAlg::Sha256).to_string())
}
