//! Catalog backed by the identity server management API.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::catalog::{
    AuthenticatorCatalog, AuthenticatorDescriptor, AuthenticatorKind, AuthenticatorLists,
    LOCAL_IDP,
};
use crate::error::CatalogError;

const AUTHENTICATORS_PATH: &str = "/configs/authenticators";
const IDENTITY_PROVIDERS_PATH: &str = "/identity-providers?requiredAttributes=federatedAuthenticators";

/// Reads local authenticators and identity providers over HTTP.
///
/// `base_url` is the tenant qualified API root, e.g.
/// `https://localhost:9443/t/carbon.super/api/server/v1`.
#[derive(Clone)]
pub struct HttpAuthenticatorCatalog {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalAuthenticatorEntry {
    id: String,
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default = "enabled")]
    is_enabled: bool,
    #[serde(rename = "type", default)]
    authenticator_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityProviderList {
    #[serde(default)]
    identity_providers: Vec<IdentityProviderEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityProviderEntry {
    id: String,
    name: String,
    #[serde(default = "enabled")]
    is_enabled: bool,
    #[serde(default)]
    federated_authenticators: Option<FederatedAuthenticators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FederatedAuthenticators {
    #[serde(default)]
    default_authenticator_id: Option<String>,
    #[serde(default)]
    authenticators: Vec<FederatedAuthenticatorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FederatedAuthenticatorEntry {
    authenticator_id: String,
    name: String,
}

fn enabled() -> bool {
    true
}

impl HttpAuthenticatorCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                endpoint: url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_local(&self) -> Result<Vec<AuthenticatorDescriptor>, CatalogError> {
        let entries: Vec<LocalAuthenticatorEntry> = self.get_json(AUTHENTICATORS_PATH).await?;

        Ok(entries
            .into_iter()
            .filter(|entry| {
                entry
                    .authenticator_type
                    .as_deref()
                    .is_none_or(|kind| kind == LOCAL_IDP)
            })
            .map(|entry| AuthenticatorDescriptor {
                display_name: entry.display_name.unwrap_or_else(|| entry.name.clone()),
                id: entry.id,
                name: entry.name,
                category: AuthenticatorKind::Local,
                is_enabled: entry.is_enabled,
                idp: LOCAL_IDP.to_string(),
                default_authenticator: None,
            })
            .collect())
    }

    async fn fetch_federated(&self) -> Result<Vec<AuthenticatorDescriptor>, CatalogError> {
        let list: IdentityProviderList = self.get_json(IDENTITY_PROVIDERS_PATH).await?;

        let mut federated = Vec::new();
        for idp in list.identity_providers {
            let Some(authenticators) = idp.federated_authenticators else {
                tracing::debug!(idp = %idp.name, "identity provider has no federated authenticators");
                continue;
            };
            let default = authenticators
                .default_authenticator_id
                .as_deref()
                .and_then(|id| {
                    authenticators
                        .authenticators
                        .iter()
                        .find(|entry| entry.authenticator_id == id)
                })
                .or_else(|| authenticators.authenticators.first());
            let Some(default) = default else {
                continue;
            };

            federated.push(AuthenticatorDescriptor {
                id: idp.id,
                display_name: idp.name.clone(),
                idp: idp.name.clone(),
                name: idp.name,
                category: AuthenticatorKind::Federated,
                is_enabled: idp.is_enabled,
                default_authenticator: Some(default.name.clone()),
            });
        }
        Ok(federated)
    }
}

#[async_trait]
impl AuthenticatorCatalog for HttpAuthenticatorCatalog {
    async fn get_all_authenticators(&self) -> Result<AuthenticatorLists, CatalogError> {
        let local = self.fetch_local().await?;
        let federated = self.fetch_federated().await?;
        tracing::debug!(
            local = local.len(),
            federated = federated.len(),
            "fetched authenticator catalog"
        );
        Ok((local, federated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetches_both_lists() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/configs/authenticators",
            serde_json::json!([
                {"id": "QmFzaWM", "name": "BasicAuthenticator", "displayName": "Username & Password",
                 "isEnabled": true, "type": "LOCAL"},
                {"id": "b2F1dGg", "name": "OAuthRequestPathAuthenticator", "type": "REQUEST_PATH"},
                {"id": "dG90cA", "name": "totp", "displayName": "TOTP", "type": "LOCAL"}
            ]),
        )
        .await;
        mount_json(
            &server,
            "/identity-providers",
            serde_json::json!({
                "totalResults": 2,
                "identityProviders": [
                    {"id": "idp-1", "name": "Google", "isEnabled": true,
                     "federatedAuthenticators": {
                        "defaultAuthenticatorId": "R29vZ2xl",
                        "authenticators": [
                            {"authenticatorId": "T0lEQw", "name": "OpenIDConnectAuthenticator"},
                            {"authenticatorId": "R29vZ2xl", "name": "GoogleOIDCAuthenticator"}
                        ]
                     }},
                    {"id": "idp-2", "name": "Bare"}
                ]
            }),
        )
        .await;

        let catalog = HttpAuthenticatorCatalog::new(server.uri());
        let (local, federated) = catalog.get_all_authenticators().await.unwrap();

        assert_eq!(local.len(), 2);
        assert_eq!(local[0].display_name, "Username & Password");
        assert_eq!(local[1].display_name, "TOTP");
        assert_eq!(federated.len(), 1);
        assert_eq!(federated[0].idp, "Google");
        assert_eq!(federated[0].option_name(), "GoogleOIDCAuthenticator");
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configs/authenticators"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .mount(&server)
            .await;
        mount_json(
            &server,
            "/identity-providers",
            serde_json::json!({"identityProviders": []}),
        )
        .await;

        let catalog = HttpAuthenticatorCatalog::new(server.uri()).with_bearer_token("secret");
        let (local, federated) = catalog.get_all_authenticators().await.unwrap();
        assert!(local.is_empty());
        assert!(federated.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configs/authenticators"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = HttpAuthenticatorCatalog::new(server.uri());
        let err = catalog.get_all_authenticators().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/configs/authenticators"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
            .mount(&server)
            .await;

        let catalog = HttpAuthenticatorCatalog::new(server.uri());
        let err = catalog.get_all_authenticators().await.unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
