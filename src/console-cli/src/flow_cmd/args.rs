//! CLI argument definitions for flow commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::OutputFormat;

/// Flow CLI command group.
#[derive(Debug, Parser)]
#[command(
    name = "flow",
    about = "Step based authentication flows",
    long_about = "Check stored authentication sequences and run scripted editing sessions against them."
)]
pub struct FlowCli {
    #[command(subcommand)]
    pub command: FlowCommands,
}

#[derive(Debug, Subcommand)]
pub enum FlowCommands {
    /// Check a stored authentication sequence.
    #[command(visible_alias = "validate")]
    Check(FlowCheckArgs),

    /// Run editor commands from a script against a sequence.
    #[command(visible_alias = "edit")]
    Apply(FlowApplyArgs),
}

#[derive(Debug, Parser)]
pub struct FlowCheckArgs {
    /// Path to the sequence file (JSON or YAML).
    #[arg(short = 'f', long = "file", required = true)]
    pub file: PathBuf,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Parser)]
pub struct FlowApplyArgs {
    /// Sequence to start from. A single empty step when omitted.
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Authenticator catalog file with `local` and `federated` lists.
    #[arg(long = "catalog", conflicts_with = "server")]
    pub catalog: Option<PathBuf>,

    /// Fetch the catalog from this server API base URL instead.
    #[arg(long = "server")]
    pub server: Option<String>,

    /// Bearer token for the server API.
    #[arg(long = "token", env = "CONSOLE_API_TOKEN", requires = "server", hide_env_values = true)]
    pub token: Option<String>,

    /// Editor command script (YAML or JSON list).
    #[arg(short = 's', long = "script", required = true)]
    pub script: PathBuf,

    /// Commit after the script ran.
    #[arg(long = "commit")]
    pub commit: bool,

    /// Write the resulting sequence to this file.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
