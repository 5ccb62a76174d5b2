//! Command dispatch.

use anyhow::{Context, Result};
use console_common::{ConfigError, ConsoleConfig};
use console_login::LoginError;
use console_oidc::OidcFormError;

use super::args::{Cli, Commands};

/// Load the configuration and run the selected command.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let config = ConsoleConfig::load(cli.config.as_deref())
        .context("Could not load the console configuration")?;

    match cli.command {
        Commands::Flow(flow_cli) => flow_cli.run(&config).await,
        Commands::Oidc(oidc_cli) => oidc_cli.run(&config).await,
        Commands::Login(login_cli) => login_cli.run(&config).await,
    }
}

/// Process exit code for an error returned by [`dispatch_command`].
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<OidcFormError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<LoginError>() {
            return err.exit_code();
        }
    }
    1
}

/// Message to print for an error returned by [`dispatch_command`].
pub fn error_message(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<OidcFormError>() {
        return err.user_message();
    }
    if let Some(err) = err.downcast_ref::<LoginError>() {
        return err.user_message();
    }
    format!("{:#}", err)
}
