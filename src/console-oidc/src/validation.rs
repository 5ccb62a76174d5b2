//! Field level validation results.

use serde::{Deserialize, Serialize};

use crate::error::{OidcFormError, OidcResult};

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OidcField {
    GrantTypes,
    CallbackUrls,
    AllowedOrigins,
    Audience,
    BackChannelLogoutUrl,
    FrontChannelLogoutUrl,
    CertificateValue,
    UserAccessTokenExpiry,
    RefreshTokenExpiry,
    IdTokenExpiry,
}

impl OidcField {
    /// Label shown next to the field.
    pub fn label(&self) -> &'static str {
        match self {
            OidcField::GrantTypes => "Allowed grant types",
            OidcField::CallbackUrls => "Callback URLs",
            OidcField::AllowedOrigins => "Allowed origins",
            OidcField::Audience => "Audience",
            OidcField::BackChannelLogoutUrl => "Back channel logout URL",
            OidcField::FrontChannelLogoutUrl => "Front channel logout URL",
            OidcField::CertificateValue => "Certificate",
            OidcField::UserAccessTokenExpiry => "User access token expiry time",
            OidcField::RefreshTokenExpiry => "Refresh token expiry time",
            OidcField::IdTokenExpiry => "ID token expiry time",
        }
    }
}

impl std::fmt::Display for OidcField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: OidcField,
    pub message: String,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result with optional warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub is_valid: bool,
    pub errors: Vec<FieldIssue>,
    /// Non-fatal issues, shown next to the field.
    pub warnings: Vec<FieldIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, field: OidcField, message: impl Into<String>) -> Self {
        self.warnings.push(FieldIssue {
            field,
            message: message.into(),
        });
        self
    }

    pub fn with_error(mut self, field: OidcField, message: impl Into<String>) -> Self {
        self.errors.push(FieldIssue {
            field,
            message: message.into(),
        });
        self.is_valid = false;
        self
    }

    pub fn has_error_for(&self, field: OidcField) -> bool {
        self.errors.iter().any(|issue| issue.field == field)
    }

    pub fn has_warning_for(&self, field: OidcField) -> bool {
        self.warnings.iter().any(|issue| issue.field == field)
    }

    /// Converts to a Result, returning the warnings when validation passed.
    pub fn into_result(self) -> OidcResult<Vec<FieldIssue>> {
        if self.is_valid {
            Ok(self.warnings)
        } else {
            Err(OidcFormError::Invalid(self.errors))
        }
    }
}
