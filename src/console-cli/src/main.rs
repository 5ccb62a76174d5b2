//! idconsole - main entry point.

use clap::Parser;

use console_cli::cli::{Cli, dispatch_command, error_message, exit_code_for};
use console_cli::styled_output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_level = std::env::var("CONSOLE_LOG_LEVEL").ok();
    let level = cli.effective_log_level(env_level.as_deref()).as_filter_str();

    let filter_str = if std::env::var("RUST_LOG").is_ok() {
        format!(
            "error,idconsole={level},console_cli={level},console_flow={level},\
             console_oidc={level},console_login={level},console_common={level}"
        )
    } else {
        level.to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(&filter_str)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dispatch_command(cli).await {
        print_error(&error_message(&err));
        std::process::exit(exit_code_for(&err));
    }
}
