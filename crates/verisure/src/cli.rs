//! Clap derive structures for the `verisure` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// verisure -- drive Verisure accessories from the command line
#[derive(Debug, Parser)]
#[command(
    name = "verisure",
    version,
    about = "Control Verisure alarms, door locks, smart plugs and climate sensors",
    long_about = "Acts as an accessory host for a Verisure account: discovers every\n\
        supported device, reads its current value, and sets targets, waiting\n\
        for the Verisure cloud to confirm each change.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List discovered accessories with their last known values
    #[command(alias = "ls")]
    Accessories,

    /// Read the current value of an accessory
    Get(GetArgs),

    /// Set the target value of an accessory and wait for confirmation
    Set(SetArgs),

    /// Inspect and manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Accessory display name (see `verisure accessories`)
    pub name: String,

    /// Read the target value instead of the current one
    #[arg(long)]
    pub target: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Accessory display name (see `verisure accessories`)
    pub name: String,

    /// New target: away|stay|night|disarmed, lock|unlock, on|off, or the
    /// numeric characteristic value
    pub value: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Store the account password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
