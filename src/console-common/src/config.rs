//! Console configuration.
//!
//! Everything the console components used to read from global runtime
//! config is carried here and handed to them at construction time.
//!
//! ```toml
//! [ui]
//! product_name = "Identity Server"
//! hidden_authenticators = ["SAMLSSOAuthenticator"]
//!
//! [authenticators]
//! second_factors = ["totp", "email-otp-authenticator"]
//!
//! [deployment]
//! client_id = "{env:CONSOLE_CLIENT_ID:CONSOLE}"
//! server_origin = "https://localhost:9443"
//!
//! [deployment.idp]
//! storage = "webWorker"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config_substitution::{ConfigSubstitution, substitute_toml_value};
use crate::dirs::resolve_config_path;
use crate::error::{ConfigError, ConfigResult};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub ui: UiConfig,
    pub authenticators: AuthenticatorSettings,
    pub oidc: OidcSettings,
    pub deployment: DeploymentConfig,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Product name shown in hints.
    pub product_name: String,
    /// Authenticator names never offered in the flow builder.
    pub hidden_authenticators: Vec<String>,
    /// Editors render without mutation controls.
    pub read_only: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            product_name: "Identity Server".to_string(),
            hidden_authenticators: Vec::new(),
            read_only: false,
        }
    }
}

/// Authenticator roles used by the step-based flow builder.
///
/// All entries are authenticator *names* as they appear in step options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticatorSettings {
    /// Authenticators that establish the user's identity.
    pub first_factors: Vec<String>,
    /// Authenticators that require an earlier first factor.
    pub second_factors: Vec<String>,
    /// Handlers that only make sense with conditional scripts.
    pub handlers: Vec<String>,
}

impl Default for AuthenticatorSettings {
    fn default() -> Self {
        Self {
            first_factors: vec![
                "BasicAuthenticator".to_string(),
                "IdentifierExecutor".to_string(),
                "FIDOAuthenticator".to_string(),
            ],
            second_factors: vec![
                "totp".to_string(),
                "email-otp-authenticator".to_string(),
                "sms-otp-authenticator".to_string(),
            ],
            handlers: vec!["IdentifierExecutor".to_string()],
        }
    }
}

/// Inbound OIDC form policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcSettings {
    /// Grant types never offered.
    pub hidden_grant_types: Vec<String>,
    /// Grant types that can be combined with `refresh_token`.
    pub refresh_token_grant_types: Vec<String>,
    /// Template id -> grant types the template allows.
    pub template_grant_types: BTreeMap<String, Vec<String>>,
    /// Template id -> display order of its grant types.
    pub template_grant_order: BTreeMap<String, Vec<String>>,
    /// Expiry values below this many seconds need confirmation.
    pub low_expiry_threshold_secs: u64,
}

impl Default for OidcSettings {
    fn default() -> Self {
        let spa = vec![
            "authorization_code".to_string(),
            "implicit".to_string(),
            "refresh_token".to_string(),
        ];
        let web = vec![
            "authorization_code".to_string(),
            "implicit".to_string(),
            "password".to_string(),
            "client_credentials".to_string(),
            "refresh_token".to_string(),
            "urn:ietf:params:oauth:grant-type:device_code".to_string(),
        ];

        let mut template_grant_types = BTreeMap::new();
        template_grant_types.insert("single-page-application".to_string(), spa.clone());
        template_grant_types.insert("oidc-web-application".to_string(), web.clone());

        let mut template_grant_order = BTreeMap::new();
        template_grant_order.insert("single-page-application".to_string(), spa);
        template_grant_order.insert("oidc-web-application".to_string(), web);

        Self {
            hidden_grant_types: vec!["account_switch".to_string()],
            refresh_token_grant_types: vec![
                "authorization_code".to_string(),
                "password".to_string(),
                "urn:ietf:params:oauth:grant-type:saml2-bearer".to_string(),
                "iwa:ntlm".to_string(),
                "urn:ietf:params:oauth:grant-type:device_code".to_string(),
            ],
            template_grant_types,
            template_grant_order,
            low_expiry_threshold_secs: 60,
        }
    }
}

/// Where the console is deployed and how it signs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub client_id: String,
    /// Origin serving the console.
    pub client_origin: String,
    /// Origin of the identity server.
    pub server_origin: String,
    /// Path segment the console is mounted under, without slashes.
    pub app_base: Option<String>,
    pub login_callback_url: String,
    pub logout_callback_url: String,
    pub super_tenant: String,
    /// Prefix of tenant qualified paths (`/t/<tenant>`).
    pub tenant_prefix: String,
    /// Keep the post logout URL untouched when the tenant resolves.
    pub common_post_logout_url: bool,
    pub home_route: String,
    pub login_route: String,
    /// Self user endpoint, relative to the tenant qualified server origin.
    pub me_endpoint: String,
    /// Production deployments receive the auth code from the hosting server.
    pub production: bool,
    pub idp: IdpConfig,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            client_id: "CONSOLE".to_string(),
            client_origin: "https://localhost:9443".to_string(),
            server_origin: "https://localhost:9443".to_string(),
            app_base: Some("console".to_string()),
            login_callback_url: "https://localhost:9443/console/login".to_string(),
            logout_callback_url: "https://localhost:9443/console/login".to_string(),
            super_tenant: "carbon.super".to_string(),
            tenant_prefix: "t".to_string(),
            common_post_logout_url: false,
            home_route: "/develop/applications".to_string(),
            login_route: "/login".to_string(),
            me_endpoint: "/scim2/Me".to_string(),
            production: false,
            idp: IdpConfig::default(),
        }
    }
}

impl DeploymentConfig {
    /// `/t/<tenant>` for regular tenants, empty for the super tenant.
    pub fn tenant_path(&self, tenant: &str) -> String {
        if tenant.is_empty() || tenant == self.super_tenant {
            String::new()
        } else {
            format!("/{}/{}", self.tenant_prefix, tenant)
        }
    }

    /// `/<app_base>` or empty when the console is mounted at the root.
    pub fn app_base_path(&self) -> String {
        match self.app_base.as_deref() {
            Some(base) if !base.trim_matches('/').is_empty() => {
                format!("/{}", base.trim_matches('/'))
            }
            _ => String::new(),
        }
    }

    pub fn app_base_with_tenant(&self, tenant: &str) -> String {
        format!("{}{}", self.tenant_path(tenant), self.app_base_path())
    }

    pub fn client_origin_with_tenant(&self, tenant: &str) -> String {
        format!("{}{}", self.client_origin, self.tenant_path(tenant))
    }

    pub fn server_origin_with_tenant(&self, tenant: &str) -> String {
        format!("{}{}", self.server_origin, self.tenant_path(tenant))
    }
}

/// Overrides for the identity client. Unset values fall back to
/// defaults resolved at sign-in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpConfig {
    /// `sessionStorage`, `localStorage` or `webWorker`.
    pub storage: Option<String>,
    pub base_urls: Option<Vec<String>>,
    pub clock_tolerance: Option<u64>,
    pub enable_pkce: Option<bool>,
    /// `query` or `form_post`.
    pub response_mode: Option<String>,
    pub scope: Option<Vec<String>>,
    pub server_origin: Option<String>,
    pub authorize_endpoint_url: Option<String>,
    pub jwks_endpoint_url: Option<String>,
    pub logout_endpoint_url: Option<String>,
    pub oidc_session_iframe_endpoint_url: Option<String>,
    pub token_revocation_endpoint_url: Option<String>,
    pub token_endpoint_url: Option<String>,
    pub well_known_endpoint_url: Option<String>,
}

impl ConsoleConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one the default location is
    /// tried and built-in defaults are used when nothing is found.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = resolve_config_path(explicit) else {
            tracing::debug!("no config file found, using defaults");
            return Ok(Self::default());
        };

        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "loading console config");
        Self::from_toml_str(&content, &ConfigSubstitution::new())
    }

    /// Parse configuration text, substituting placeholders first.
    pub fn from_toml_str(content: &str, substitution: &ConfigSubstitution) -> ConfigResult<Self> {
        let mut value: toml::Value = toml::from_str(content)?;
        substitute_toml_value(&mut value, substitution)?;
        let config: ConsoleConfig = value.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.deployment.server_origin.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "deployment.server_origin".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.deployment.super_tenant.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "deployment.super_tenant".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(name) = self
            .authenticators
            .second_factors
            .iter()
            .find(|name| self.authenticators.first_factors.contains(name))
        {
            return Err(ConfigError::Invalid {
                field: "authenticators.second_factors".to_string(),
                reason: format!("'{}' is also listed as a first factor", name),
            });
        }
        Ok(())
    }
}
