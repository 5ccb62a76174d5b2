//! Error types for the sign-in lifecycle.

use thiserror::Error;

/// Result type alias for login operations.
pub type LoginResult<T> = std::result::Result<T, LoginError>;

/// Errors raised while signing in or loading the signed-in user.
#[derive(Error, Debug)]
pub enum LoginError {
    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("{endpoint} returned status {status}")]
    Api {
        endpoint: String,
        status: u16,
        /// `detail` of the error body, when present.
        detail: Option<String>,
        /// `description` of the error body, when present.
        description: Option<String>,
    },

    /// Response body could not be decoded.
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured or returned URL does not parse.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The identity client reported a failure.
    #[error("Identity client error: {0}")]
    Client(String),
}

impl LoginError {
    /// Server supplied detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            LoginError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Server supplied description, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            LoginError::Api { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Request(_) => "Could not reach the identity server.".to_string(),
            LoginError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            LoginError::Api { status, .. } => {
                format!("The identity server rejected the request ({}).", status)
            }
            LoginError::InvalidUrl { url, .. } => format!("'{}' is not a valid URL.", url),
            other => other.to_string(),
        }
    }

    /// Returns the exit code for CLI error reporting.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoginError::InvalidUrl { .. } => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_detail() {
        let err = LoginError::Api {
            endpoint: "https://localhost:9443/scim2/Me".to_string(),
            status: 403,
            detail: Some("Operation is not supported.".to_string()),
            description: None,
        };
        assert_eq!(err.detail(), Some("Operation is not supported."));
        assert_eq!(err.user_message(), "Operation is not supported.");
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_invalid_url_exit_code() {
        let source = url::Url::parse("nope").unwrap_err();
        let err = LoginError::InvalidUrl {
            url: "nope".to_string(),
            source,
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.detail(), None);
    }
}
