//! Seams to the identity client and the console's HTTP APIs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::USER_AGENT;
use crate::error::{LoginError, LoginResult};
use crate::profile::{ProfileInfo, ProfileSchema};
use crate::settings::ClientSettings;

/// Authorization code handed over by the hosting server in production.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthCodeResponse {
    pub auth_code: Option<String>,
    pub session_state: Option<String>,
}

/// What the identity client reports after a successful sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignInResponse {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub allowed_scopes: String,
    pub tenant_domain: String,
    pub username: String,
    pub session_state: Option<String>,
}

/// Claims of the ID token the console cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodedIdToken {
    pub associated_tenants: Option<Vec<String>>,
    pub default_tenant: Option<String>,
}

/// Endpoints discovered by the identity client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceEndpoints {
    pub authorize: String,
    pub oidc_session_iframe: String,
    pub token: String,
}

/// The OIDC client that performs the redirects and holds the tokens.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn initialize(&self, settings: &ClientSettings) -> LoginResult<()>;

    async fn sign_in(&self) -> LoginResult<()>;

    async fn sign_out(&self) -> LoginResult<()>;

    async fn decoded_id_token(&self) -> LoginResult<DecodedIdToken>;

    async fn service_endpoints(&self) -> LoginResult<ServiceEndpoints>;
}

/// HTTP calls the sign-in lifecycle makes outside the identity client.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// `GET {app base}/auth` on the hosting server.
    async fn fetch_auth_code(&self, url: &str) -> LoginResult<AuthCodeResponse>;

    /// `GET` the SCIM `Me` endpoint.
    async fn get_profile_info(&self, me_endpoint: &str) -> LoginResult<ProfileInfo>;

    /// `GET` the SCIM schemas, flattened to their attributes.
    async fn get_profile_schemas(&self, schemas_endpoint: &str) -> LoginResult<Vec<ProfileSchema>>;
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SchemaResource {
    #[serde(default)]
    attributes: Vec<ProfileSchema>,
}

/// [`ConsoleApi`] over `reqwest`.
#[derive(Clone)]
pub struct HttpConsoleApi {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl Default for HttpConsoleApi {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpConsoleApi {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Returns the status with the decoded body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> LoginResult<(u16, T)> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            tracing::debug!(endpoint = url, status = status.as_u16(), "API request failed");
            return Err(LoginError::Api {
                endpoint: url.to_string(),
                status: status.as_u16(),
                detail: error.detail,
                description: error.description,
            });
        }

        Ok((status.as_u16(), serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn fetch_auth_code(&self, url: &str) -> LoginResult<AuthCodeResponse> {
        let (_, response) = self.get_json(url).await?;
        Ok(response)
    }

    async fn get_profile_info(&self, me_endpoint: &str) -> LoginResult<ProfileInfo> {
        let (status, mut info): (u16, ProfileInfo) = self.get_json(me_endpoint).await?;
        info.response_status = status;
        Ok(info)
    }

    async fn get_profile_schemas(&self, schemas_endpoint: &str) -> LoginResult<Vec<ProfileSchema>> {
        let (_, resources): (u16, Vec<SchemaResource>) = self.get_json(schemas_endpoint).await?;
        Ok(resources
            .into_iter()
            .flat_map(|resource| resource.attributes)
            .collect())
    }
}
