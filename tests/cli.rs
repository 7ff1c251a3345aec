use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use kick::host::SystemHost;
use kick::privilege::has_elevated_privilege;

const KEY: &str =
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIEZzMDDHqQhYNnGUjwhnX3L7aJLvgYOAUeLH1L/Ny6RX kick@test";

const SSHD_CONFIG: &str = "\
Include /etc/ssh/sshd_config.d/*.conf
#PermitRootLogin prohibit-password
PasswordAuthentication yes
UsePAM yes
";

struct Fixture {
    _tmp: TempDir,
    config: PathBuf,
    dropin: PathBuf,
    home: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let config = tmp.path().join("sshd_config");
        let dropin = tmp.path().join("sshd_config.d");
        let home = tmp.path().join("home");
        fs::create_dir(&dropin).expect("create drop-in dir");
        fs::create_dir(&home).expect("create home");
        fs::write(&config, SSHD_CONFIG).expect("write sshd_config");
        fs::write(dropin.join("50-cloud-init.conf"), "PasswordAuthentication yes\n")
            .expect("write fragment");

        Self {
            _tmp: tmp,
            config,
            dropin,
            home,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("kick").unwrap();
        cmd.env("NO_COLOR", "1")
            .env("CLICOLOR", "0")
            .env_remove("RUST_LOG")
            .arg("ssh")
            .arg("--sshd-config")
            .arg(&self.config)
            .arg("--sshd-config-dir")
            .arg(&self.dropin)
            .arg("--home")
            .arg(&self.home);
        cmd
    }

    fn fragment(&self) -> String {
        fs::read_to_string(self.dropin.join("50-cloud-init.conf")).unwrap()
    }

    fn authorized_keys(&self) -> PathBuf {
        self.home.join(".ssh").join("authorized_keys")
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn help_lists_ssh_command() {
    Command::cargo_bin("kick")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("ssh"));
}

#[test]
fn dry_run_shows_plan_and_changes_nothing() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["--dry-run", "--key", KEY])
        .assert()
        .success()
        .stdout(contains("Planned changes"))
        .stdout(contains("PasswordAuthentication no (was: PasswordAuthentication yes)"))
        .stdout(contains("PubkeyAuthentication yes"))
        .stdout(contains("50-cloud-init.conf"))
        .stdout(contains("Nothing was changed."));

    assert_eq!(read(&fx.config), SSHD_CONFIG);
    assert_eq!(fx.fragment(), "PasswordAuthentication yes\n");
    assert!(!fx.home.join(".ssh").exists());
}

#[test]
fn dry_run_rejects_bad_key() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["--dry-run", "--key", "not-a-key"])
        .assert()
        .failure()
        .stderr(contains("public key must start with"));
}

#[test]
fn dry_run_reports_unreadable_config() {
    let fx = Fixture::new();
    fs::remove_file(&fx.config).unwrap();

    fx.cmd()
        .args(["--dry-run", "--key", KEY])
        .assert()
        .failure()
        .stderr(contains("failed to read"));
}

#[test]
fn prompt_retries_until_key_is_valid() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("--dry-run")
        .write_stdin(format!("not-a-key\n\n  {KEY}  \n"))
        .assert()
        .success()
        .stdout(contains("public key must start with"))
        .stdout(contains("Planned changes"));
}

#[test]
fn closed_input_cancels() {
    let fx = Fixture::new();

    fx.cmd()
        .arg("--dry-run")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("cancelled"));

    assert_eq!(read(&fx.config), SSHD_CONFIG);
}

#[test]
fn unprivileged_run_is_refused() {
    if has_elevated_privilege(&SystemHost) {
        return;
    }
    let fx = Fixture::new();

    fx.cmd()
        .args(["--no-restart", "--key", KEY])
        .assert()
        .failure()
        .stderr(contains("root privileges"));

    assert_eq!(read(&fx.config), SSHD_CONFIG);
    assert!(!fx.authorized_keys().exists());
}

#[test]
fn privileged_run_applies_everything_once() {
    if !has_elevated_privilege(&SystemHost) {
        return;
    }
    let fx = Fixture::new();

    for _ in 0..2 {
        fx.cmd()
            .args(["--no-restart", "--key", KEY])
            .assert()
            .success()
            .stdout(contains("SSH configuration complete"))
            .stdout(contains("SHA256:"));
    }

    let config = read(&fx.config);
    assert_eq!(
        config.lines().filter(|l| *l == "PasswordAuthentication no").count(),
        1
    );
    assert!(!config.contains("PasswordAuthentication yes"));
    assert!(fx.fragment().starts_with("#PasswordAuthentication yes # disabled by kick"));
    assert_eq!(read(&fx.authorized_keys()), format!("{KEY}\n"));
}
