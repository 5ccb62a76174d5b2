//! Error types for the flow editor.

use console_common::Alert;
use thiserror::Error;

/// Result type alias for editor operations.
pub type EditResult<T> = std::result::Result<T, SequenceRejection>;

/// Why an editor operation was refused.
///
/// A rejection is never fatal: the sequence is left exactly as it was and
/// editing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceRejection {
    /// Removing the only step.
    #[error("cannot remove the last authentication step")]
    MinimumSteps,

    /// Removing the step would leave a second factor with no first factor before it.
    #[error("removing step {step_index} leaves a second factor without a first factor")]
    SecondFactorOrphaned { step_index: usize },

    /// The step already holds an option with this authenticator.
    #[error("step {step_index} already contains authenticator '{authenticator}'")]
    DuplicateAuthenticator {
        step_index: usize,
        authenticator: String,
    },

    /// Second factor added without a first factor in an earlier step.
    #[error("second factor '{authenticator}' needs a first factor before step {step_index}")]
    SecondFactorPlacement {
        step_index: usize,
        authenticator: String,
    },

    /// A step without options cannot be saved.
    #[error("authentication step {step_id} has no authenticators")]
    EmptyStep { step_id: u32 },

    /// The editor was opened read-only.
    #[error("the authentication flow is read-only")]
    ReadOnly,

    /// An index supplied by the caller points outside the sequence.
    #[error("{what} index {index} is out of range")]
    OutOfRange { what: &'static str, index: usize },
}

impl SequenceRejection {
    /// The warning shown to the user, if this rejection produces one.
    ///
    /// Read-only and out of range rejections are caller mistakes and stay silent.
    pub fn alert(&self) -> Option<Alert> {
        let (message, description) = match self {
            SequenceRejection::MinimumSteps => (
                "Cannot remove step",
                "At least one authentication step is required.",
            ),
            SequenceRejection::SecondFactorOrphaned { .. } => (
                "Cannot remove step",
                "Second factor authenticators in later steps need a first factor \
                 authenticator in an earlier step.",
            ),
            SequenceRejection::DuplicateAuthenticator { .. } => (
                "Duplicate authenticator",
                "The same authenticator cannot be added to a step more than once.",
            ),
            SequenceRejection::SecondFactorPlacement { .. } => (
                "Cannot add second factor",
                "Second factor authenticators can only be added after a step \
                 containing a first factor authenticator.",
            ),
            SequenceRejection::EmptyStep { .. } => (
                "Empty authentication step",
                "Every authentication step needs at least one authenticator.",
            ),
            SequenceRejection::ReadOnly | SequenceRejection::OutOfRange { .. } => return None,
        };
        Some(Alert::warning(message, description))
    }

    /// Returns a user-friendly error message for terminal display.
    pub fn user_message(&self) -> String {
        match self.alert() {
            Some(alert) => format!("{}: {}", alert.message, alert.description),
            None => self.to_string(),
        }
    }
}

/// Errors fetching the authenticator catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog endpoint {endpoint} returned {status}")]
    Status { endpoint: String, status: u16 },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_common::AlertLevel;

    #[test]
    fn test_validation_rejections_alert() {
        let rejection = SequenceRejection::DuplicateAuthenticator {
            step_index: 0,
            authenticator: "BasicAuthenticator".to_string(),
        };
        let alert = rejection.alert().unwrap();
        assert_eq!(alert.level, AlertLevel::Warning);
        assert_eq!(alert.message, "Duplicate authenticator");
    }

    #[test]
    fn test_contract_rejections_are_silent() {
        assert!(SequenceRejection::ReadOnly.alert().is_none());
        assert!(
            SequenceRejection::OutOfRange {
                what: "step",
                index: 4
            }
            .alert()
            .is_none()
        );
    }

    #[test]
    fn test_user_message() {
        assert!(
            SequenceRejection::MinimumSteps
                .user_message()
                .starts_with("Cannot remove step")
        );
        assert_eq!(
            SequenceRejection::ReadOnly.user_message(),
            "the authentication flow is read-only"
        );
    }
}
