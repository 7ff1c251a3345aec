//! Restart the SSH daemon through whichever service manager answers

use tracing::{info, warn};

use crate::error::{CommandError, KickError, Result};
use crate::host::Commands;

/// Argument vector of one restart attempt
pub type RestartCommand = &'static [&'static str];

/// Tried in order until one succeeds: SysV `service` and systemd, for both
/// the Debian (`ssh`) and Red Hat (`sshd`) unit names
pub const RESTART_COMMANDS: &[RestartCommand] = &[
    &["service", "ssh", "restart"],
    &["systemctl", "restart", "ssh"],
    &["systemctl", "restart", "sshd"],
    &["service", "sshd", "restart"],
];

/// Restart sshd with the default candidates
pub fn restart_service(commands: &impl Commands) -> Result<RestartCommand> {
    restart_with(commands, RESTART_COMMANDS)
}

/// Try `candidates` in order and return the first that succeeded.
///
/// Fails with the last command's error if none did.
pub fn restart_with(commands: &impl Commands, candidates: &[RestartCommand]) -> Result<RestartCommand> {
    let mut last_failure: Option<(String, CommandError)> = None;

    for &candidate in candidates {
        let Some((program, args)) = candidate.split_first() else {
            continue;
        };
        let line = candidate.join(" ");

        match commands.run(program, args) {
            Ok(()) => {
                info!(command = %line, "ssh service restarted");
                return Ok(candidate);
            }
            Err(e) => {
                warn!(command = %line, error = %e, "restart attempt failed");
                last_failure = Some((line, e));
            }
        }
    }

    match last_failure {
        Some((command, source)) => Err(KickError::Restart { command, source }),
        None => Err(KickError::NoRestartCommand),
    }
}
