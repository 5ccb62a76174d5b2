//! CLI argument structures and parsing.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::flow_cmd::FlowCli;
use crate::login_cmd::LoginCli;
use crate::oidc_cmd::OidcCli;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Output format of command reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON for machine processing.
    Json,
}

/// idconsole - identity console core from the command line
#[derive(Debug, Parser)]
#[command(name = "idconsole")]
#[command(author, version)]
#[command(about = "Edit authentication flows, check OIDC settings and resolve sign-in settings")]
pub struct Cli {
    /// Path to config.toml (defaults to $CONSOLE_HOME/config.toml)
    #[arg(long = "config", short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Enable trace-level logging for debugging
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        short = 'L',
        global = true,
        value_enum,
        default_value_t = LogLevel::Warn
    )]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level: `--trace`, `--verbose`, `CONSOLE_LOG_LEVEL`,
    /// then `--log-level`.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else {
            env_level
                .and_then(LogLevel::from_str_loose)
                .unwrap_or(self.log_level)
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check and edit step based authentication flows
    Flow(FlowCli),

    /// Check inbound OIDC settings of an application
    Oidc(OidcCli),

    /// Inspect how the console signs in
    Login(LoginCli),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str_loose() {
        assert_eq!(LogLevel::from_str_loose("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str_loose("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose("verbose"), None);
    }

    #[test]
    fn test_effective_log_level_precedence() {
        let cli = Cli::try_parse_from(["idconsole", "login", "settings"]).unwrap();
        assert_eq!(cli.effective_log_level(None), LogLevel::Warn);
        assert_eq!(cli.effective_log_level(Some("info")), LogLevel::Info);
        assert_eq!(cli.effective_log_level(Some("loud")), LogLevel::Warn);

        let cli = Cli::try_parse_from(["idconsole", "-v", "login", "settings"]).unwrap();
        assert_eq!(cli.effective_log_level(Some("error")), LogLevel::Debug);

        let cli = Cli::try_parse_from(["idconsole", "login", "settings", "--trace"]).unwrap();
        assert_eq!(cli.effective_log_level(None), LogLevel::Trace);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "idconsole",
            "flow",
            "check",
            "-f",
            "sequence.json",
            "--config",
            "/etc/idconsole.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/idconsole.toml")));
        assert!(matches!(cli.command, Commands::Flow(_)));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["idconsole"]).is_err());
    }
}
