//! Constants for the console-login module.

/// Application key used for the console's own session entries.
pub const CONSOLE_APP: &str = "CONSOLE";

/// Scope requested when none is configured.
pub const SYSTEM_SCOPE: &str = "SYSTEM";

/// Session key of the logout URL issued by the identity client.
pub const LOGOUT_URL: &str = "sign_out_url";

/// Session key of the resolved authorization endpoint.
pub const AUTHORIZATION_ENDPOINT: &str = "authorization_endpoint";

/// Session key of the OIDC session iframe endpoint.
pub const OIDC_SESSION_IFRAME_ENDPOINT: &str = "oidc_session_iframe_endpoint";

/// Session key of the resolved token endpoint.
pub const TOKEN_ENDPOINT: &str = "token_endpoint";

/// Session key of the OIDC session state.
pub const SESSION_STATE: &str = "session_state";

/// Prefix of the per application callback URL key.
pub const AUTH_CALLBACK_URL_PREFIX: &str = "auth_callback_url_";

/// Path the hosting server exposes the authorization code on, below the app base.
pub const AUTH_BOOTSTRAP_PATH: &str = "/auth";

/// SCIM schema listing, relative to the tenant qualified server origin.
pub const SCHEMAS_ENDPOINT: &str = "/scim2/Schemas";

/// User-Agent string for HTTP requests
pub const USER_AGENT: &str = concat!("idconsole/", env!("CARGO_PKG_VERSION"));
