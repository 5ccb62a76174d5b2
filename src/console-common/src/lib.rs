//! Shared building blocks for the identity console crates.
//!
//! - `config` - the console configuration (`config.toml`) and its sections
//! - `config_substitution` - `{env:VAR}` placeholders in configuration values
//! - `alerts` - user-facing notifications and the sinks that receive them
//! - `dirs` - configuration file discovery

pub mod alerts;
pub mod config;
pub mod config_substitution;
pub mod dirs;
mod error;

pub use alerts::{Alert, AlertLevel, AlertSink, RecordingAlertSink, TracingAlertSink};
pub use config::{
    AuthenticatorSettings, ConsoleConfig, DeploymentConfig, IdpConfig, OidcSettings, UiConfig,
};
pub use config_substitution::{ConfigSubstitution, SubstitutionError, substitute_toml_value};
pub use dirs::{CONFIG_FILE_NAME, CONSOLE_HOME_ENV, resolve_config_path};
pub use error::{ConfigError, ConfigResult};
