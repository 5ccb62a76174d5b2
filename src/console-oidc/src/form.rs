//! The inbound OIDC configuration form.
//!
//! [`InboundOidcForm`] turns the application's current configuration into
//! editable [`OidcFormValues`], validates edited values and shapes the
//! body that is sent back on save.

use console_common::OidcSettings;
use serde::{Deserialize, Serialize};

use crate::error::OidcResult;
use crate::grant_types::{
    GrantTypeOption, allowed_grant_types, refresh_token_without_allowed_grant,
    shows_callback_url_field,
};
use crate::metadata::OidcMetadata;
use crate::model::{
    AccessTokenConfig, AdvancedConfigurations, ApplicationState, Certificate, CertificateType,
    GeneralSettings, IdTokenConfig, IdTokenEncryption, InboundOidcConfig, LogoutConfig,
    PkceConfig, RefreshTokenConfig, SubmissionPayload,
};
use crate::urls::{
    build_callback_url_with_regexp, build_callback_url_with_separator, is_https_or_http_url,
    is_mobile_deep_link, is_valid_origin_url, is_valid_url, resolve_allowed_origins, split_urls,
};
use crate::validation::{OidcField, ValidationResult};

/// Values as edited in the form. List fields are comma separated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OidcFormValues {
    pub grant_types: Vec<String>,
    pub callback_urls: String,
    pub allowed_origins: String,
    pub public_client: bool,
    pub pkce: PkceConfig,
    pub access_token_type: String,
    pub user_access_token_expiry_in_seconds: u64,
    pub binding_type: Option<String>,
    pub revoke_tokens_when_idp_session_terminated: bool,
    pub validate_token_binding: bool,
    pub refresh_token: RefreshTokenConfig,
    pub audience: String,
    pub encryption: IdTokenEncryption,
    pub id_token_expiry_in_seconds: u64,
    pub back_channel_logout_url: String,
    pub front_channel_logout_url: String,
    pub validate_request_object_signature: bool,
    pub scope_validators: Vec<String>,
    pub certificate: Option<Certificate>,
}

impl OidcFormValues {
    /// Uncheck or check "encryption". Disabling clears algorithm and method.
    pub fn set_encryption_enabled(&mut self, enabled: bool) {
        self.encryption.enabled = enabled;
        if !enabled {
            self.encryption.algorithm.clear();
            self.encryption.method.clear();
        }
    }
}

/// Credential management actions available for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialAction {
    RegenerateSecret,
    Revoke,
    Reactivate,
}

/// What saving the form produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(SubmissionPayload),
    /// Some expiry times are suspiciously low. Send `payload` only after
    /// the user confirms.
    NeedsConfirmation {
        fields: Vec<OidcField>,
        payload: SubmissionPayload,
    },
    /// A redirect based grant is selected but no callback URL was given.
    MissingCallbackUrl,
}

#[derive(Debug, Clone)]
pub struct InboundOidcForm {
    initial: InboundOidcConfig,
    metadata: OidcMetadata,
    settings: OidcSettings,
    template_id: Option<String>,
    certificate: Option<Certificate>,
}

impl InboundOidcForm {
    pub fn new(initial: InboundOidcConfig, metadata: OidcMetadata, settings: OidcSettings) -> Self {
        Self {
            initial,
            metadata,
            settings,
            template_id: None,
            certificate: None,
        }
    }

    /// The template the application was created from.
    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// The application's current signing certificate.
    pub fn with_certificate(mut self, certificate: Certificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn initial(&self) -> &InboundOidcConfig {
        &self.initial
    }

    /// Values the form starts with.
    pub fn initial_values(&self) -> OidcFormValues {
        let initial = &self.initial;
        let mut values = OidcFormValues {
            grant_types: initial.grant_types.clone(),
            callback_urls: build_callback_url_with_separator(&initial.callback_urls.join(",")),
            allowed_origins: initial.allowed_origins.join(","),
            public_client: initial.public_client,
            pkce: initial.pkce.clone(),
            access_token_type: initial.access_token.token_type.clone(),
            user_access_token_expiry_in_seconds: initial
                .access_token
                .user_access_token_expiry_in_seconds,
            binding_type: initial.access_token.binding_type.clone(),
            revoke_tokens_when_idp_session_terminated: initial
                .access_token
                .revoke_tokens_when_idp_session_terminated,
            validate_token_binding: initial.access_token.validate_token_binding,
            refresh_token: initial.refresh_token.clone(),
            audience: initial.id_token.audience.join(","),
            encryption: initial.id_token.encryption.clone(),
            id_token_expiry_in_seconds: initial.id_token.expiry_in_seconds,
            back_channel_logout_url: initial
                .logout
                .back_channel_logout_url
                .clone()
                .unwrap_or_default(),
            front_channel_logout_url: initial
                .logout
                .front_channel_logout_url
                .clone()
                .unwrap_or_default(),
            validate_request_object_signature: initial.validate_request_object_signature,
            scope_validators: initial.scope_validators.clone(),
            certificate: self.certificate.clone(),
        };
        if !values.encryption.enabled {
            values.set_encryption_enabled(false);
        }
        values
    }

    /// Grant type checkboxes for this application.
    pub fn grant_type_options(&self) -> Vec<GrantTypeOption> {
        allowed_grant_types(
            &self.metadata.allowed_grant_types.options,
            &self.settings,
            self.template_id.as_deref(),
        )
    }

    pub fn shows_callback_url_field(&self, values: &OidcFormValues) -> bool {
        shows_callback_url_field(&values.grant_types)
    }

    pub fn credential_actions(&self) -> Vec<CredentialAction> {
        if !self.initial.is_existing_client() {
            return Vec::new();
        }
        match self.initial.state {
            Some(ApplicationState::Revoked) => vec![CredentialAction::Reactivate],
            Some(ApplicationState::Active) | None => {
                vec![CredentialAction::RegenerateSecret, CredentialAction::Revoke]
            }
        }
    }

    /// Check every field.
    pub fn validate(&self, values: &OidcFormValues) -> ValidationResult {
        let mut result = ValidationResult::valid();

        if refresh_token_without_allowed_grant(&values.grant_types, &self.settings) {
            result = result.with_warning(
                OidcField::GrantTypes,
                "Refresh token is selected without a grant type that issues refresh tokens.",
            );
        }

        if self.shows_callback_url_field(values) {
            for url in split_urls(&values.callback_urls) {
                if !is_mobile_deep_link(&url) {
                    result = result.with_error(
                        OidcField::CallbackUrls,
                        format!("'{}' is not a valid URL.", url),
                    );
                } else if !is_https_or_http_url(&url) {
                    result = result.with_warning(
                        OidcField::CallbackUrls,
                        format!("'{}' is not an http or https URL.", url),
                    );
                }
            }
            for origin in resolve_allowed_origins(&values.allowed_origins) {
                if !is_valid_origin_url(&origin) {
                    result = result.with_error(
                        OidcField::AllowedOrigins,
                        format!("'{}' is not a valid origin URL.", origin),
                    );
                }
            }
        }

        let audiences = split_audience(&values.audience);
        if let Some(duplicate) = first_duplicate(&audiences) {
            result = result.with_error(
                OidcField::Audience,
                format!("Audience '{}' is listed more than once.", duplicate),
            );
        }

        for (field, value) in [
            (OidcField::BackChannelLogoutUrl, &values.back_channel_logout_url),
            (OidcField::FrontChannelLogoutUrl, &values.front_channel_logout_url),
        ] {
            if !value.trim().is_empty() && !is_valid_url(value.trim()) {
                result = result.with_error(field, "Please enter a valid URL.");
            }
        }

        if let Some(certificate) = &values.certificate {
            if certificate.certificate_type == CertificateType::Jwks
                && !certificate.value.trim().is_empty()
                && !is_valid_url(certificate.value.trim())
            {
                result = result.with_error(
                    OidcField::CertificateValue,
                    "The JWKS endpoint must be a valid URL.",
                );
            }
        }

        result
    }

    /// Expiry fields below the configured threshold.
    pub fn low_expiry_fields(&self, values: &OidcFormValues) -> Vec<OidcField> {
        let threshold = self.settings.low_expiry_threshold_secs;
        [
            (
                OidcField::UserAccessTokenExpiry,
                values.user_access_token_expiry_in_seconds,
            ),
            (OidcField::RefreshTokenExpiry, values.refresh_token.expiry_in_seconds),
            (OidcField::IdTokenExpiry, values.id_token_expiry_in_seconds),
        ]
        .into_iter()
        .filter(|(_, seconds)| *seconds < threshold)
        .map(|(field, _)| field)
        .collect()
    }

    /// Validate and shape the save request.
    pub fn submit(&self, values: &OidcFormValues) -> OidcResult<SubmitOutcome> {
        let warnings = self.validate(values).into_result()?;
        for warning in &warnings {
            tracing::warn!(field = %warning.field, "{}", warning.message);
        }

        if self.shows_callback_url_field(values) && split_urls(&values.callback_urls).is_empty() {
            tracing::debug!("callback URL required for the selected grant types");
            return Ok(SubmitOutcome::MissingCallbackUrl);
        }

        let payload = self.build_payload(values)?;
        let low = self.low_expiry_fields(values);
        if low.is_empty() {
            Ok(SubmitOutcome::Submitted(payload))
        } else {
            tracing::debug!(fields = ?low, "low expiry times need confirmation");
            Ok(SubmitOutcome::NeedsConfirmation {
                fields: low,
                payload,
            })
        }
    }

    /// The request body for `values`, without validation.
    pub fn build_payload(&self, values: &OidcFormValues) -> OidcResult<SubmissionPayload> {
        let encryption = if values.encryption.enabled {
            values.encryption.clone()
        } else {
            IdTokenEncryption {
                enabled: false,
                algorithm: self.metadata.id_token_encryption_algorithm.default_value.clone(),
                method: self.metadata.id_token_encryption_method.default_value.clone(),
            }
        };

        let (callback_urls, allowed_origins) = if self.shows_callback_url_field(values) {
            let urls = split_urls(&values.callback_urls).join(",");
            (
                vec![build_callback_url_with_regexp(&urls)],
                resolve_allowed_origins(&values.allowed_origins),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        let mut inbound = InboundOidcConfig {
            client_id: None,
            client_secret: None,
            state: None,
            grant_types: values.grant_types.clone(),
            callback_urls,
            allowed_origins,
            public_client: values.public_client,
            pkce: values.pkce.clone().normalized(),
            access_token: AccessTokenConfig {
                token_type: values.access_token_type.clone(),
                user_access_token_expiry_in_seconds: values.user_access_token_expiry_in_seconds,
                application_access_token_expiry_in_seconds: self
                    .metadata
                    .application_access_token_expiry()?,
                binding_type: values.binding_type.clone(),
                revoke_tokens_when_idp_session_terminated: values
                    .revoke_tokens_when_idp_session_terminated,
                validate_token_binding: values.validate_token_binding,
            },
            refresh_token: values.refresh_token.clone(),
            id_token: IdTokenConfig {
                audience: split_audience(&values.audience),
                encryption,
                expiry_in_seconds: values.id_token_expiry_in_seconds,
            },
            logout: LogoutConfig {
                back_channel_logout_url: non_empty(&values.back_channel_logout_url),
                front_channel_logout_url: non_empty(&values.front_channel_logout_url),
            },
            validate_request_object_signature: values.validate_request_object_signature,
            scope_validators: values.scope_validators.clone(),
        };

        if !self.initial.is_existing_client() {
            return Ok(SubmissionPayload::New(inbound));
        }

        inbound.client_id = self.initial.client_id.clone();
        inbound.client_secret = self.initial.client_secret.clone();
        Ok(SubmissionPayload::Existing {
            general: GeneralSettings {
                advanced_configurations: AdvancedConfigurations {
                    certificate: values.certificate.clone(),
                },
            },
            inbound,
        })
    }
}

fn split_audience(audience: &str) -> Vec<String> {
    resolve_allowed_origins(audience)
}

fn first_duplicate(values: &[String]) -> Option<&str> {
    values
        .iter()
        .enumerate()
        .find(|&(index, value)| values[..index].contains(value))
        .map(|(_, value)| value.as_str())
}
