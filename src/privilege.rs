//! Superuser check performed before any host mutation

use tracing::debug;

use crate::error::{KickError, Result};
use crate::host::Identity;

/// True only when the process runs with effective uid 0.
///
/// An unknown identity counts as unprivileged.
pub fn has_elevated_privilege(identity: &impl Identity) -> bool {
    let uid = identity.effective_uid();
    debug!(?uid, "checked process identity");
    uid == Some(0)
}

pub fn require_elevated_privilege(identity: &impl Identity) -> Result<()> {
    if has_elevated_privilege(identity) {
        Ok(())
    } else {
        Err(KickError::PrivilegeRequired)
    }
}
