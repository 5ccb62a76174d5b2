//! Inbound OIDC configuration as exchanged with the application API.

use serde::{Deserialize, Serialize};

/// Access token binding type meaning "no binding".
pub const BINDING_TYPE_NONE: &str = "None";

/// Lifecycle state of the OAuth client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationState {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessTokenConfig {
    #[serde(rename = "type")]
    pub token_type: String,
    pub user_access_token_expiry_in_seconds: u64,
    pub application_access_token_expiry_in_seconds: u64,
    /// Absent when no binding is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_type: Option<String>,
    pub revoke_tokens_when_idp_session_terminated: bool,
    pub validate_token_binding: bool,
}

impl AccessTokenConfig {
    /// Binding validation options only apply to an actual binding.
    pub fn has_token_binding(&self) -> bool {
        self.binding_type
            .as_deref()
            .is_some_and(|binding| !binding.is_empty() && binding != BINDING_TYPE_NONE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshTokenConfig {
    pub expiry_in_seconds: u64,
    pub renew_refresh_token: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdTokenEncryption {
    pub enabled: bool,
    pub algorithm: String,
    pub method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdTokenConfig {
    pub audience: Vec<String>,
    pub encryption: IdTokenEncryption,
    pub expiry_in_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_channel_logout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_channel_logout_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PkceConfig {
    pub mandatory: bool,
    pub support_plain_transform_algorithm: bool,
}

impl PkceConfig {
    /// Toggle "mandatory". Unchecking it also clears plain support.
    pub fn set_mandatory(&mut self, mandatory: bool) {
        self.mandatory = mandatory;
        if !mandatory {
            self.support_plain_transform_algorithm = false;
        }
    }

    /// Plain support can only be on while PKCE is mandatory.
    pub fn normalized(mut self) -> Self {
        self.set_mandatory(self.mandatory);
        self
    }
}

/// The inbound OIDC protocol configuration of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InboundOidcConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ApplicationState>,
    pub grant_types: Vec<String>,
    #[serde(rename = "callbackURLs")]
    pub callback_urls: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub public_client: bool,
    pub pkce: PkceConfig,
    pub access_token: AccessTokenConfig,
    pub refresh_token: RefreshTokenConfig,
    pub id_token: IdTokenConfig,
    pub logout: LogoutConfig,
    pub validate_request_object_signature: bool,
    pub scope_validators: Vec<String>,
}

impl InboundOidcConfig {
    /// Client credentials exist, so the application was already created.
    pub fn is_existing_client(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.client_id) && present(&self.client_secret)
    }
}

/// How the application's signing certificate is provided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    #[default]
    Jwks,
    Pem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(rename = "type")]
    pub certificate_type: CertificateType,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedConfigurations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub advanced_configurations: AdvancedConfigurations,
}

/// Body sent when the form is saved.
///
/// New applications send the bare inbound configuration. Existing ones
/// wrap it together with the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionPayload {
    Existing {
        general: GeneralSettings,
        inbound: InboundOidcConfig,
    },
    New(InboundOidcConfig),
}

impl SubmissionPayload {
    pub fn inbound(&self) -> &InboundOidcConfig {
        match self {
            SubmissionPayload::Existing { inbound, .. } => inbound,
            SubmissionPayload::New(inbound) => inbound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_api_payload() {
        let config: InboundOidcConfig = serde_json::from_value(serde_json::json!({
            "clientId": "abc",
            "clientSecret": "s3cret",
            "state": "ACTIVE",
            "grantTypes": ["authorization_code", "refresh_token"],
            "callbackURLs": ["regexp=(https://a.test/cb|https://b.test/cb)"],
            "allowedOrigins": ["https://a.test"],
            "pkce": {"mandatory": true, "supportPlainTransformAlgorithm": false},
            "accessToken": {"type": "Default", "userAccessTokenExpiryInSeconds": 3600,
                            "applicationAccessTokenExpiryInSeconds": 3600, "bindingType": "cookie"},
            "idToken": {"audience": ["abc"], "encryption": {"enabled": false}, "expiryInSeconds": 3600}
        }))
        .unwrap();

        assert!(config.is_existing_client());
        assert_eq!(config.state, Some(ApplicationState::Active));
        assert_eq!(config.callback_urls.len(), 1);
        assert!(config.access_token.has_token_binding());
        assert_eq!(config.refresh_token, RefreshTokenConfig::default());
    }

    #[test]
    fn test_new_client_has_no_credentials() {
        let config = InboundOidcConfig {
            client_id: Some("abc".to_string()),
            client_secret: Some(String::new()),
            ..InboundOidcConfig::default()
        };
        assert!(!config.is_existing_client());
    }

    #[test]
    fn test_pkce_plain_cleared_with_mandatory() {
        let mut pkce = PkceConfig {
            mandatory: true,
            support_plain_transform_algorithm: true,
        };
        pkce.set_mandatory(false);
        assert!(!pkce.support_plain_transform_algorithm);

        let inconsistent = PkceConfig {
            mandatory: false,
            support_plain_transform_algorithm: true,
        };
        assert_eq!(inconsistent.normalized(), PkceConfig::default());
    }

    #[test]
    fn test_binding_none() {
        let token = AccessTokenConfig {
            binding_type: Some(BINDING_TYPE_NONE.to_string()),
            ..AccessTokenConfig::default()
        };
        assert!(!token.has_token_binding());
        assert!(!AccessTokenConfig::default().has_token_binding());
    }

    #[test]
    fn test_existing_payload_shape() {
        let payload = SubmissionPayload::Existing {
            general: GeneralSettings {
                advanced_configurations: AdvancedConfigurations {
                    certificate: Some(Certificate {
                        certificate_type: CertificateType::Jwks,
                        value: "https://a.test/jwks".to_string(),
                    }),
                },
            },
            inbound: InboundOidcConfig::default(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["general"]["advancedConfigurations"]["certificate"]["type"],
            "JWKS"
        );
        assert!(json["inbound"]["grantTypes"].is_array());
    }
}
