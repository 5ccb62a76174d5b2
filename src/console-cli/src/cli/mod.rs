//! CLI argument parsing and command dispatch.
//!
//! - `args` - Command-line argument structures
//! - `handlers` - Command dispatch and exit codes

pub mod args;
pub mod handlers;

pub use args::{Cli, Commands, LogLevel, OutputFormat};
pub use handlers::{dispatch_command, error_message, exit_code_for};
