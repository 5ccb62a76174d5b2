//! Identity client settings resolved from the deployment configuration.

use console_common::DeploymentConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::client::AuthCodeResponse;
use crate::constants::SYSTEM_SCOPE;

/// Where the identity client keeps tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Storage {
    SessionStorage,
    LocalStorage,
    WebWorker,
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sessionStorage" => Ok(Storage::SessionStorage),
            "localStorage" => Ok(Storage::LocalStorage),
            "webWorker" => Ok(Storage::WebWorker),
            other => Err(format!("unknown storage '{}'", other)),
        }
    }
}

impl std::fmt::Display for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Storage::SessionStorage => write!(f, "sessionStorage"),
            Storage::LocalStorage => write!(f, "localStorage"),
            Storage::WebWorker => write!(f, "webWorker"),
        }
    }
}

/// How the authorization response is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Query,
    FormPost,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ResponseMode::Query),
            "form_post" => Ok(ResponseMode::FormPost),
            other => Err(format!("unknown response mode '{}'", other)),
        }
    }
}

/// Facts about where the console runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub production: bool,
    /// Browser name as reported by the user agent parser.
    pub browser: Option<String>,
    /// Tenant named in the current URL, if any.
    pub tenant: Option<String>,
}

impl Environment {
    pub fn from_deployment(deployment: &DeploymentConfig) -> Self {
        Self {
            production: deployment.production,
            ..Self::default()
        }
    }

    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn is_internet_explorer(&self) -> bool {
        self.browser
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case("IE"))
    }
}

/// Endpoint overrides passed to the identity client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorize: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_session_iframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub well_known: Option<String>,
}

/// Everything the identity client is initialized with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    pub base_urls: Vec<String>,
    pub client_host: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_tolerance: Option<u64>,
    #[serde(rename = "enablePKCE")]
    pub enable_pkce: bool,
    pub endpoints: EndpointOverrides,
    pub response_mode: ResponseMode,
    pub scope: Vec<String>,
    pub server_origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    #[serde(rename = "signInRedirectURL")]
    pub sign_in_redirect_url: String,
    #[serde(rename = "signOutRedirectURL")]
    pub sign_out_redirect_url: String,
    pub storage: Storage,
}

impl ClientSettings {
    /// Resolve client settings.
    ///
    /// `auth` is what the hosting server handed over in production.
    pub fn resolve(
        deployment: &DeploymentConfig,
        environment: &Environment,
        auth: Option<&AuthCodeResponse>,
    ) -> Self {
        let idp = &deployment.idp;
        let tenant = environment.tenant.as_deref().unwrap_or_default();

        Self {
            authorization_code: auth.and_then(|response| response.auth_code.clone()),
            base_urls: resolve_base_urls(deployment),
            client_host: deployment.client_origin_with_tenant(tenant),
            client_id: deployment.client_id.clone(),
            clock_tolerance: idp.clock_tolerance,
            enable_pkce: idp.enable_pkce.unwrap_or(true),
            endpoints: EndpointOverrides {
                authorize: idp.authorize_endpoint_url.clone(),
                jwks: idp.jwks_endpoint_url.clone(),
                logout: idp.logout_endpoint_url.clone(),
                oidc_session_iframe: idp.oidc_session_iframe_endpoint_url.clone(),
                revoke: idp.token_revocation_endpoint_url.clone(),
                token: idp.token_endpoint_url.clone(),
                well_known: idp.well_known_endpoint_url.clone(),
            },
            response_mode: resolve_response_mode(deployment, environment),
            scope: idp
                .scope
                .clone()
                .unwrap_or_else(|| vec![SYSTEM_SCOPE.to_string()]),
            server_origin: idp
                .server_origin
                .clone()
                .unwrap_or_else(|| deployment.server_origin.clone()),
            session_state: auth.and_then(|response| response.session_state.clone()),
            sign_in_redirect_url: deployment.login_callback_url.clone(),
            sign_out_redirect_url: deployment.login_callback_url.clone(),
            storage: resolve_storage(deployment, environment),
        }
    }
}

/// Configured storage, except that Internet Explorer cannot run the web
/// worker and falls back to session storage.
pub fn resolve_storage(deployment: &DeploymentConfig, environment: &Environment) -> Storage {
    let fallback = if environment.is_internet_explorer() {
        Storage::SessionStorage
    } else {
        Storage::WebWorker
    };

    let Some(configured) = deployment.idp.storage.as_deref() else {
        return fallback;
    };
    match configured.parse::<Storage>() {
        Ok(Storage::WebWorker) if environment.is_internet_explorer() => {
            tracing::debug!("web worker storage is not available on IE, using session storage");
            Storage::SessionStorage
        }
        Ok(storage) => storage,
        Err(err) => {
            tracing::warn!(storage = configured, "{}, using {}", err, fallback);
            fallback
        }
    }
}

/// Hosts the client may send tokens to. The server origin is always one.
pub fn resolve_base_urls(deployment: &DeploymentConfig) -> Vec<String> {
    let server_origin = &deployment.server_origin;
    match &deployment.idp.base_urls {
        Some(base_urls) => {
            let mut base_urls = base_urls.clone();
            if !base_urls.contains(server_origin) {
                base_urls.push(server_origin.clone());
            }
            base_urls
        }
        None => vec![server_origin.clone()],
    }
}

/// Configured response mode, else `form_post` in production and `query`
/// during development.
pub fn resolve_response_mode(deployment: &DeploymentConfig, environment: &Environment) -> ResponseMode {
    let fallback = if environment.production {
        ResponseMode::FormPost
    } else {
        ResponseMode::Query
    };

    match deployment.idp.response_mode.as_deref().map(str::parse::<ResponseMode>) {
        Some(Ok(mode)) => mode,
        Some(Err(err)) => {
            tracing::warn!("{}, using the default", err);
            fallback
        }
        None => fallback,
    }
}
