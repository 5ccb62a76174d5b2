//! Which authenticators count as first factors, second factors and handlers.

use console_common::AuthenticatorSettings;
use std::collections::HashSet;

use crate::catalog::AuthenticatorKind;
use crate::model::AuthenticationStep;

/// Authenticator roles, keyed by authenticator name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorPolicy {
    first_factors: HashSet<String>,
    second_factors: HashSet<String>,
    handlers: HashSet<String>,
}

impl Default for FactorPolicy {
    fn default() -> Self {
        Self::from(&AuthenticatorSettings::default())
    }
}

impl From<&AuthenticatorSettings> for FactorPolicy {
    fn from(settings: &AuthenticatorSettings) -> Self {
        Self {
            first_factors: settings.first_factors.iter().cloned().collect(),
            second_factors: settings.second_factors.iter().cloned().collect(),
            handlers: settings.handlers.iter().cloned().collect(),
        }
    }
}

impl FactorPolicy {
    pub fn is_first_factor(&self, name: &str) -> bool {
        self.first_factors.contains(name)
    }

    pub fn is_second_factor(&self, name: &str) -> bool {
        self.second_factors.contains(name)
    }

    pub fn is_handler(&self, name: &str) -> bool {
        self.handlers.contains(name)
    }

    /// Kind of a local authenticator. Second factor wins over handler.
    pub fn classify_local(&self, name: &str) -> AuthenticatorKind {
        if self.is_second_factor(name) {
            AuthenticatorKind::SecondFactor
        } else if self.is_handler(name) {
            AuthenticatorKind::Handler
        } else {
            AuthenticatorKind::Local
        }
    }

    /// Any option in `steps` is a first factor.
    pub fn has_first_factor(&self, steps: &[AuthenticationStep]) -> bool {
        steps
            .iter()
            .flat_map(|step| step.options.iter())
            .any(|option| self.is_first_factor(&option.authenticator))
    }

    /// Any option in `steps` is a second factor.
    pub fn has_second_factor(&self, steps: &[AuthenticationStep]) -> bool {
        steps
            .iter()
            .flat_map(|step| step.options.iter())
            .any(|option| self.is_second_factor(&option.authenticator))
    }
}
