//! Error types for the OIDC form.

use thiserror::Error;

use crate::validation::FieldIssue;

/// Result type alias for form operations.
pub type OidcResult<T> = std::result::Result<T, OidcFormError>;

#[derive(Error, Debug)]
pub enum OidcFormError {
    /// One or more fields hold invalid values.
    #[error("Invalid OIDC configuration: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),

    /// The server metadata could not be interpreted.
    #[error("Invalid metadata value for '{field}': '{value}'")]
    InvalidMetadata { field: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OidcFormError {
    /// Returns a user-friendly error message for terminal display.
    pub fn user_message(&self) -> String {
        match self {
            OidcFormError::Invalid(issues) => {
                let mut message = String::from("The OIDC configuration has invalid fields:\n");
                for issue in issues {
                    message.push_str(&format!("  - {}\n", issue));
                }
                message
            }
            _ => self.to_string(),
        }
    }

    /// Returns the exit code for CLI error reporting.
    pub fn exit_code(&self) -> i32 {
        match self {
            OidcFormError::Invalid(_) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::OidcField;

    #[test]
    fn test_invalid_lists_fields() {
        let err = OidcFormError::Invalid(vec![
            FieldIssue {
                field: OidcField::Audience,
                message: "duplicate audience".to_string(),
            },
            FieldIssue {
                field: OidcField::AllowedOrigins,
                message: "invalid origin URL".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "Invalid OIDC configuration: Audience: duplicate audience; \
             Allowed origins: invalid origin URL"
        );
        assert!(err.user_message().contains("  - Audience: duplicate audience"));
        assert_eq!(err.exit_code(), 3);
    }
}
