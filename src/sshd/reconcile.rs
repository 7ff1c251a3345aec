//! Merge a directive set into sshd_config text

use std::collections::HashSet;

use super::directives::DirectiveSet;

/// How a directive ended up in the reconciled document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveChange {
    /// An existing line was replaced; holds the original line
    Rewritten { name: String, previous: String },
    /// No active line existed, one was added at the end
    Appended { name: String },
}

fn is_active(trimmed: &str) -> bool {
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Reconcile `text` against `directives`.
///
/// The first active line setting a directive is replaced by `name value`;
/// later lines for the same directive are left alone. Directives with no
/// active line are appended in set order. Everything else is kept verbatim.
/// Lines already carrying the required value are not reported as changes.
pub fn reconcile_document(text: &str, directives: &DirectiveSet) -> (String, Vec<DirectiveChange>) {
    let mut lines: Vec<String> = if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').map(str::to_string).collect()
    };

    // Appended lines go before the final newline
    let trailing_newline = text.ends_with('\n');
    if trailing_newline {
        lines.pop();
    }

    let mut satisfied: HashSet<&str> = HashSet::new();
    let mut changes = Vec::new();

    for line in lines.iter_mut() {
        let trimmed = line.trim();
        if !is_active(trimmed) {
            continue;
        }

        let Some(directive) = directives
            .iter()
            .find(|d| !satisfied.contains(d.name.as_str()) && d.matches(trimmed))
        else {
            continue;
        };

        satisfied.insert(directive.name.as_str());
        let wanted = directive.line();
        if *line != wanted {
            changes.push(DirectiveChange::Rewritten {
                name: directive.name.clone(),
                previous: std::mem::replace(line, wanted),
            });
        }
    }

    for directive in directives.iter() {
        if !satisfied.contains(directive.name.as_str()) {
            lines.push(directive.line());
            changes.push(DirectiveChange::Appended {
                name: directive.name.clone(),
            });
        }
    }

    let mut document = lines.join("\n");
    if trailing_newline || (text.is_empty() && !lines.is_empty()) {
        document.push('\n');
    }
    (document, changes)
}
