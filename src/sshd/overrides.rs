//! Neutralize password logins re-enabled by sshd_config.d fragments

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::host::Files;

/// Setting that must not survive in an override fragment
pub const INSECURE_LITERAL: &str = "PasswordAuthentication yes";

/// What an active insecure occurrence is rewritten to
pub const NEUTRALIZED_LITERAL: &str = "#PasswordAuthentication yes # disabled by kick";

const FRAGMENT_SUFFIX: &str = ".conf";

/// A fragment whose content has to change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRewrite {
    pub path: PathBuf,
    pub contents: String,
}

fn is_fragment(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(FRAGMENT_SUFFIX))
}

/// Comment out every active occurrence of [`INSECURE_LITERAL`].
///
/// Returns `None` when the text has nothing to neutralize. Lines that are
/// already comments are left as they are.
pub fn neutralize_fragment(text: &str) -> Option<String> {
    let mut changed = false;
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || !line.contains(INSECURE_LITERAL) {
                return line.to_string();
            }
            changed = true;
            line.replace(INSECURE_LITERAL, NEUTRALIZED_LITERAL)
        })
        .collect();

    changed.then(|| lines.join("\n"))
}

/// Scan `dir` for `*.conf` fragments that need neutralizing.
///
/// A missing directory or an unreadable fragment is skipped.
pub fn plan_fragments(files: &impl Files, dir: &Path) -> Vec<FragmentRewrite> {
    if !files.is_dir(dir) {
        debug!(dir = %dir.display(), "no override directory");
        return Vec::new();
    }

    let entries = match files.list_files(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list override directory");
            return Vec::new();
        }
    };

    let mut rewrites = Vec::new();
    for path in entries.into_iter().filter(|p| is_fragment(p)) {
        let text = match files.read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable fragment");
                continue;
            }
        };

        if let Some(contents) = neutralize_fragment(&text) {
            debug!(path = %path.display(), "fragment enables password login");
            rewrites.push(FragmentRewrite { path, contents });
        }
    }
    rewrites
}
