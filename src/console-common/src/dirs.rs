//! Configuration file discovery.
//!
//! Lookup order:
//! 1. an explicit path (CLI `--config`)
//! 2. `$CONSOLE_HOME/config.toml`
//! 3. `<platform config dir>/identity-console/config.toml`
//!
//! Relative `CONSOLE_HOME` values are resolved against the current directory.

use std::path::{Path, PathBuf};

/// Application name for directory paths.
pub const APP_NAME: &str = "identity-console";

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration directory.
pub const CONSOLE_HOME_ENV: &str = "CONSOLE_HOME";

/// Default configuration directory, honoring `CONSOLE_HOME`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var(CONSOLE_HOME_ENV) {
        let home = PathBuf::from(home);
        if home.is_relative() {
            return std::env::current_dir().ok().map(|cwd| cwd.join(home));
        }
        return Some(home);
    }
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Resolve which config file to load.
///
/// Returns `None` when no explicit path was given and no default file
/// exists, in which case built-in defaults apply.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let candidate = config_dir()?.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "using default config file");
        Some(candidate)
    } else {
        None
    }
}
