//! Server metadata describing what the OIDC form may offer.

use serde::{Deserialize, Serialize};

use crate::error::{OidcFormError, OidcResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantTypeMetadata {
    pub name: String,
    pub display_name: String,
}

impl GrantTypeMetadata {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrantTypesProperty {
    pub options: Vec<GrantTypeMetadata>,
}

/// A selectable property with a server default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetadataProperty {
    pub options: Vec<String>,
    pub default_value: String,
}

impl MetadataProperty {
    fn with(options: &[&str], default_value: &str) -> Self {
        Self {
            options: options.iter().map(|option| option.to_string()).collect(),
            default_value: default_value.to_string(),
        }
    }
}

/// `GET /applications/meta/inbound-protocols/oidc`.
///
/// Expiry defaults arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OidcMetadata {
    pub allowed_grant_types: GrantTypesProperty,
    pub default_user_access_token_expiry_time: String,
    pub default_application_access_token_expiry_time: String,
    pub default_refresh_token_expiry_time: String,
    pub default_id_token_expiry_time: String,
    pub id_token_encryption_algorithm: MetadataProperty,
    pub id_token_encryption_method: MetadataProperty,
    pub scope_validators: MetadataProperty,
    pub access_token_type: MetadataProperty,
    pub access_token_binding_type: MetadataProperty,
}

impl Default for OidcMetadata {
    fn default() -> Self {
        Self {
            allowed_grant_types: GrantTypesProperty {
                options: vec![
                    GrantTypeMetadata::new("authorization_code", "Code"),
                    GrantTypeMetadata::new("implicit", "Implicit"),
                    GrantTypeMetadata::new("password", "Password"),
                    GrantTypeMetadata::new("client_credentials", "Client Credential"),
                    GrantTypeMetadata::new("refresh_token", "Refresh Token"),
                    GrantTypeMetadata::new("account_switch", "Account Switch"),
                    GrantTypeMetadata::new("urn:ietf:params:oauth:grant-type:saml2-bearer", "SAML2"),
                    GrantTypeMetadata::new("iwa:ntlm", "IWA-NTLM"),
                    GrantTypeMetadata::new("urn:ietf:params:oauth:grant-type:device_code", "Device Code"),
                ],
            },
            default_user_access_token_expiry_time: "3600".to_string(),
            default_application_access_token_expiry_time: "3600".to_string(),
            default_refresh_token_expiry_time: "86400".to_string(),
            default_id_token_expiry_time: "3600".to_string(),
            id_token_encryption_algorithm: MetadataProperty::with(
                &["RSA1_5", "RSA-OAEP", "RSA-OAEP-256"],
                "RSA-OAEP",
            ),
            id_token_encryption_method: MetadataProperty::with(
                &["A128GCM", "A192GCM", "A256GCM", "A128CBC-HS256"],
                "A128GCM",
            ),
            scope_validators: MetadataProperty::with(&["Role based scope validator", "XACML Scope Validator"], ""),
            access_token_type: MetadataProperty::with(&["Default", "JWT"], "Default"),
            access_token_binding_type: MetadataProperty::with(&["None", "cookie", "sso-session"], "None"),
        }
    }
}

impl OidcMetadata {
    pub fn from_json(json: &str) -> OidcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Application access token expiry. The form never edits it.
    pub fn application_access_token_expiry(&self) -> OidcResult<u64> {
        parse_seconds(
            "defaultApplicationAccessTokenExpiryTime",
            &self.default_application_access_token_expiry_time,
        )
    }
}

fn parse_seconds(field: &str, value: &str) -> OidcResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| OidcFormError::InvalidMetadata {
            field: field.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_metadata() {
        let metadata = OidcMetadata::from_json(
            r#"{
                "allowedGrantTypes": {"options": [{"name": "authorization_code", "displayName": "Code"}]},
                "defaultApplicationAccessTokenExpiryTime": "7200",
                "idTokenEncryptionAlgorithm": {"options": ["RSA-OAEP"], "defaultValue": "RSA-OAEP"}
            }"#,
        )
        .unwrap();

        assert_eq!(metadata.allowed_grant_types.options.len(), 1);
        assert_eq!(metadata.application_access_token_expiry().unwrap(), 7200);
        assert_eq!(metadata.id_token_encryption_algorithm.default_value, "RSA-OAEP");
        // Missing properties keep the built-in defaults.
        assert_eq!(metadata.id_token_encryption_method.default_value, "A128GCM");
    }

    #[test]
    fn test_bad_expiry_metadata() {
        let metadata = OidcMetadata {
            default_application_access_token_expiry_time: "soon".to_string(),
            ..OidcMetadata::default()
        };
        assert!(matches!(
            metadata.application_access_token_expiry(),
            Err(OidcFormError::InvalidMetadata { .. })
        ));
    }
}
