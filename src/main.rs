use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

use kick::{cli, logging};

#[derive(Parser)]
#[command(name = "kick")]
#[command(author = "Oleg")]
#[command(version)]
#[command(about = "Automates common server setup tasks", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure key-based SSH authentication and disable password login
    Ssh(cli::ssh::SshArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Ssh(args) => cli::ssh::run(args),
    }
}
