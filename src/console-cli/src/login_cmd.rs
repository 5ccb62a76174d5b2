//! Sign-in inspection commands.
//!
//! ```bash
//! idconsole login settings --production --browser IE
//! idconsole login resolve-url "https://is.test/oauth2/authorize?tenant=a" "https://proxy.test/authorize"
//! idconsole login profile --tenant wso2.com --token "$TOKEN"
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use console_common::ConsoleConfig;
use console_login::{
    ClientSettings, ConsoleApi, Environment, HttpConsoleApi, resolve_idp_url_after_tenant_resolves,
};

use crate::cli::OutputFormat;
use crate::helpers::print_json;
use crate::styled_output::print_dim;

#[derive(Debug, Parser)]
#[command(name = "login", about = "How the console signs in")]
pub struct LoginCli {
    #[command(subcommand)]
    pub command: LoginCommands,
}

#[derive(Debug, Subcommand)]
pub enum LoginCommands {
    /// Print the identity client settings resolved from the config.
    Settings(LoginSettingsArgs),

    /// Apply an endpoint override to a URL issued by the server.
    #[command(name = "resolve-url")]
    ResolveUrl(ResolveUrlArgs),

    /// Fetch the signed-in user's profile.
    Profile(ProfileArgs),
}

#[derive(Debug, Parser)]
pub struct LoginSettingsArgs {
    /// Resolve as a production deployment.
    #[arg(long = "production")]
    pub production: bool,

    /// Browser the console runs in, e.g. IE.
    #[arg(long = "browser")]
    pub browser: Option<String>,

    /// Tenant from the URL the console was opened with.
    #[arg(long = "tenant")]
    pub tenant: Option<String>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Parser)]
pub struct ResolveUrlArgs {
    /// URL issued by the server.
    pub original: String,

    /// Configured override.
    #[arg(value_name = "OVERRIDE")]
    pub overridden: String,
}

#[derive(Debug, Parser)]
pub struct ProfileArgs {
    /// Self user endpoint. Derived from the deployment and tenant otherwise.
    #[arg(long = "endpoint")]
    pub endpoint: Option<String>,

    #[arg(long = "tenant")]
    pub tenant: Option<String>,

    /// Bearer token for the server API.
    #[arg(long = "token", env = "CONSOLE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl LoginCli {
    pub async fn run(self, config: &ConsoleConfig) -> Result<()> {
        match self.command {
            LoginCommands::Settings(args) => run_settings(args, config),
            LoginCommands::ResolveUrl(args) => run_resolve_url(args),
            LoginCommands::Profile(args) => run_profile(args, config).await,
        }
    }
}

/// Client settings for the deployment as the given browser would see them.
pub fn resolve_settings(args: &LoginSettingsArgs, config: &ConsoleConfig) -> ClientSettings {
    let mut environment = Environment::from_deployment(&config.deployment);
    if args.production {
        environment.production = true;
    }
    if let Some(browser) = &args.browser {
        environment = environment.with_browser(browser.as_str());
    }
    if let Some(tenant) = &args.tenant {
        environment = environment.with_tenant(tenant.as_str());
    }
    ClientSettings::resolve(&config.deployment, &environment, None)
}

fn run_settings(args: LoginSettingsArgs, config: &ConsoleConfig) -> Result<()> {
    let settings = resolve_settings(&args, config);
    match args.format {
        OutputFormat::Json => print_json(&settings)?,
        OutputFormat::Text => {
            println!("Client ID:        {}", settings.client_id);
            println!("Client host:      {}", settings.client_host);
            println!("Server origin:    {}", settings.server_origin);
            println!("Base URLs:        {}", settings.base_urls.join(", "));
            println!("Storage:          {}", settings.storage);
            println!("Response mode:    {:?}", settings.response_mode);
            println!("Scope:            {}", settings.scope.join(" "));
            println!("PKCE:             {}", settings.enable_pkce);
            println!("Sign-in redirect: {}", settings.sign_in_redirect_url);
            if let Some(tolerance) = settings.clock_tolerance {
                println!("Clock tolerance:  {}s", tolerance);
            }
            let overrides = serde_json::to_value(&settings.endpoints)?;
            if let Some(map) = overrides.as_object().filter(|map| !map.is_empty()) {
                println!("Endpoint overrides:");
                for (name, url) in map {
                    println!("  {}: {}", name, url.as_str().unwrap_or_default());
                }
            }
        }
    }
    Ok(())
}

fn run_resolve_url(args: ResolveUrlArgs) -> Result<()> {
    let resolved = resolve_idp_url_after_tenant_resolves(&args.original, &args.overridden)?;
    println!("{}", resolved);
    Ok(())
}

async fn run_profile(args: ProfileArgs, config: &ConsoleConfig) -> Result<()> {
    let deployment = &config.deployment;
    let endpoint = args.endpoint.unwrap_or_else(|| {
        let tenant = args.tenant.as_deref().unwrap_or(&deployment.super_tenant);
        format!(
            "{}{}",
            deployment.server_origin_with_tenant(tenant),
            deployment.me_endpoint
        )
    });

    let mut api = HttpConsoleApi::new();
    if let Some(token) = args.token {
        api = api.with_bearer_token(token);
    }

    print_dim(&format!("GET {}", endpoint));
    let profile = api.get_profile_info(&endpoint).await?;
    print_json(&profile)?;
    Ok(())
}
