//! sshd configuration reconciliation
//!
//! Brings `sshd_config` in line with a [`DirectiveSet`] and neutralizes
//! override fragments that would turn password logins back on:
//! - the first active line for each directive is rewritten in place
//! - missing directives are appended
//! - `PasswordAuthentication yes` in `*.conf` fragments is commented out
//!
//! Work is split into [`plan`] (read only) and [`apply`] (writes), so a dry
//! run can show the plan without touching the host.

mod directives;
mod overrides;
mod reconcile;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{KickError, Result};
use crate::host::Files;

pub use directives::{Directive, DirectiveSet};
pub use overrides::{neutralize_fragment, plan_fragments, FragmentRewrite, INSECURE_LITERAL, NEUTRALIZED_LITERAL};
pub use reconcile::{reconcile_document, DirectiveChange};

/// Everything a reconciliation would write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub document_path: PathBuf,
    /// New document text, `None` when it is already reconciled
    pub document: Option<String>,
    pub changes: Vec<DirectiveChange>,
    pub fragments: Vec<FragmentRewrite>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.document.is_none() && self.fragments.is_empty()
    }

    /// Summary of the plan once applied
    pub fn report(&self) -> ReconcileReport {
        ReconcileReport {
            changes: self.changes.clone(),
            neutralized: self.fragments.iter().map(|f| f.path.clone()).collect(),
        }
    }
}

/// What [`reconcile`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub changes: Vec<DirectiveChange>,
    pub neutralized: Vec<PathBuf>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.neutralized.is_empty()
    }
}

/// Compute the reconciliation without writing anything
pub fn plan(
    files: &impl Files,
    document_path: &Path,
    override_dir: &Path,
    directives: &DirectiveSet,
) -> Result<ReconcilePlan> {
    let text = files
        .read_to_string(document_path)
        .map_err(|e| KickError::Read {
            path: document_path.to_path_buf(),
            source: e,
        })?;

    let (document, changes) = reconcile_document(&text, directives);
    let fragments = plan_fragments(files, override_dir);

    Ok(ReconcilePlan {
        document_path: document_path.to_path_buf(),
        document: (document != text).then_some(document),
        changes,
        fragments,
    })
}

/// Write a plan out: fragments first, then the main document.
///
/// A failing fragment does not stop the others, but the first failure is
/// returned and the main document is left unwritten.
pub fn apply(files: &impl Files, plan: &ReconcilePlan) -> Result<()> {
    let mut first_failure = None;

    for fragment in &plan.fragments {
        match files.write(&fragment.path, &fragment.contents) {
            Ok(()) => info!(path = %fragment.path.display(), "neutralized password login override"),
            Err(e) => {
                warn!(path = %fragment.path.display(), error = %e, "cannot rewrite fragment");
                if first_failure.is_none() {
                    first_failure = Some(KickError::Write {
                        path: fragment.path.clone(),
                        source: e,
                    });
                }
            }
        }
    }
    if let Some(err) = first_failure {
        return Err(err);
    }

    if let Some(document) = &plan.document {
        files
            .write(&plan.document_path, document)
            .map_err(|e| KickError::Write {
                path: plan.document_path.clone(),
                source: e,
            })?;
        for change in &plan.changes {
            match change {
                DirectiveChange::Rewritten { name, previous } => {
                    info!(directive = %name, previous = %previous.trim(), "directive rewritten")
                }
                DirectiveChange::Appended { name } => info!(directive = %name, "directive appended"),
            }
        }
    }

    Ok(())
}

/// Reconcile `document_path` and the fragments in `override_dir` in place
pub fn reconcile(
    files: &impl Files,
    document_path: &Path,
    override_dir: &Path,
    directives: &DirectiveSet,
) -> Result<ReconcileReport> {
    let plan = plan(files, document_path, override_dir, directives)?;
    apply(files, &plan)?;
    Ok(plan.report())
}
