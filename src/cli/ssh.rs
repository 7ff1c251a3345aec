//! Switch the SSH server to key-only authentication

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::config::HostLayout;
use crate::error::KickError;
use crate::host::SystemHost;
use crate::keys::{self, InstallOutcome};
use crate::privilege;
use crate::service;
use crate::sshd::{self, DirectiveChange, DirectiveSet, ReconcilePlan};

use super::{prompt_line, MAX_INPUT_LEN};

#[derive(Debug, Args)]
pub struct SshArgs {
    /// Public key to authorize (prompted for when omitted)
    #[arg(long)]
    pub key: Option<String>,

    /// Home directory whose ~/.ssh/authorized_keys receives the key
    #[arg(long, env = "KICK_HOME")]
    pub home: Option<PathBuf>,

    /// Path of the SSH daemon configuration file
    #[arg(long, env = "KICK_SSHD_CONFIG")]
    pub sshd_config: Option<PathBuf>,

    /// Directory of sshd_config override fragments
    #[arg(long, env = "KICK_SSHD_CONFIG_DIR")]
    pub sshd_config_dir: Option<PathBuf>,

    /// Show what would change without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Do not restart the SSH service afterwards
    #[arg(long)]
    pub no_restart: bool,
}

pub fn run(args: SshArgs) -> anyhow::Result<()> {
    let host = SystemHost::new();

    if !args.dry_run {
        privilege::require_elevated_privilege(&host)?;
    }

    let layout = HostLayout::resolve(args.sshd_config, args.sshd_config_dir, args.home)?;
    info!(?layout, dry_run = args.dry_run, "starting ssh setup");

    let key = match args.key {
        Some(candidate) => keys::validate_public_key(&candidate)?.to_string(),
        None => prompt_for_key()?,
    };

    let directives = DirectiveSet::hardened();

    if args.dry_run {
        return show_plan(&host, &layout, &directives, &key);
    }

    step("Updating SSH daemon configuration... ")?;
    let report = sshd::reconcile(&host, &layout.sshd_config, &layout.sshd_config_dir, &directives)
        .context("failed to update SSH daemon configuration")?;
    if report.is_noop() {
        println!("{}", "already up to date".green());
    } else {
        println!("{}", "done".green());
    }

    step("Adding public key to authorized_keys... ")?;
    let outcome = keys::install_key(&host, &layout.home, &key).context("failed to add public key")?;
    match outcome {
        InstallOutcome::Installed => println!("{}", "done".green()),
        InstallOutcome::AlreadyPresent => println!("{}", "already present".green()),
    }

    if args.no_restart {
        println!("{}", "Skipping SSH service restart.".dimmed());
    } else {
        step("Restarting SSH service... ")?;
        match service::restart_service(&host) {
            Ok(command) => println!("{} {}", "done".green(), format!("({})", command.join(" ")).dimmed()),
            Err(e) => {
                println!("{}", "failed".red());
                if matches!(e, KickError::Restart { .. } | KickError::NoRestartCommand) {
                    println!(
                        "{} configuration and key are saved; restart the SSH service manually.",
                        "Note:".yellow().bold()
                    );
                }
                return Err(e).context("failed to restart SSH service");
            }
        }
    }

    println!();
    println!("{}", "=== SSH configuration complete ===".green().bold());
    if let Some(fingerprint) = keys::fingerprint(&key) {
        println!("Authorized key: {}", fingerprint.cyan());
    }
    println!("Authorized keys file: {}", layout.authorized_keys().display().to_string().cyan());
    println!();
    println!(
        "{} password authentication is now disabled.",
        "Important:".yellow().bold()
    );
    println!("Before rebooting or closing this session, check that you can log in with your key.");

    Ok(())
}

fn step(message: &str) -> io::Result<()> {
    print!("{}", message.cyan());
    io::stdout().flush()
}

/// Ask for a key until a valid one is entered or the prompt is cancelled
fn prompt_for_key() -> crate::error::Result<String> {
    println!(
        "{}",
        "Enter your public key (ssh-rsa, ssh-ed25519 or ecdsa-sha2-...):".cyan().bold()
    );
    println!("{}", "Press Enter to continue, Esc to cancel.".dimmed());
    println!();

    loop {
        let input = prompt_line("> ", MAX_INPUT_LEN)?;
        if input.trim().is_empty() {
            continue;
        }

        match keys::validate_public_key(&input) {
            Ok(key) => return Ok(key.to_string()),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }
}

fn show_plan(
    host: &SystemHost,
    layout: &HostLayout,
    directives: &DirectiveSet,
    key: &str,
) -> anyhow::Result<()> {
    let plan = sshd::plan(host, &layout.sshd_config, &layout.sshd_config_dir, directives)
        .context("failed to read SSH daemon configuration")?;
    let key_present = keys::contains_key(host, &layout.home, key).context("failed to read authorized keys")?;

    println!("{}", "=== Planned changes (dry run) ===".cyan().bold());
    println!();
    print_directive_plan(&plan, directives);

    if !plan.fragments.is_empty() {
        println!();
        println!("{}", "Override fragments:".bold());
        for fragment in &plan.fragments {
            println!(
                "  {} {} ({} will be commented out)",
                "!".yellow(),
                fragment.path.display(),
                sshd::INSECURE_LITERAL
            );
        }
    }

    println!();
    println!("{} {}", "Authorized keys:".bold(), layout.authorized_keys().display());
    if key_present {
        println!("  {}", "key already present".dimmed());
    } else {
        println!("  {} {}", "+".green(), key);
    }

    println!();
    println!("{}", "Nothing was changed.".dimmed());
    Ok(())
}

fn print_directive_plan(plan: &ReconcilePlan, directives: &DirectiveSet) {
    println!("{} {}", "SSH daemon config:".bold(), plan.document_path.display());
    if plan.changes.is_empty() {
        println!("  {}", "already up to date".dimmed());
        return;
    }

    for change in &plan.changes {
        match change {
            DirectiveChange::Rewritten { name, previous } => println!(
                "  {} {} {} (was: {})",
                "~".yellow(),
                name,
                directives.get(name).unwrap_or_default(),
                previous.trim()
            ),
            DirectiveChange::Appended { name } => println!(
                "  {} {} {}",
                "+".green(),
                name,
                directives.get(name).unwrap_or_default()
            ),
        }
    }
}
