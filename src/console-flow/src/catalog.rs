//! The authenticator catalog.
//!
//! A catalog returns two raw lists: local authenticators and federated
//! identity providers. The editor classifies them once, on load, into a
//! [`CatalogSnapshot`] keyed by [`AuthenticatorKind`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::policy::FactorPolicy;

/// Identity provider reference used by local authenticators.
pub const LOCAL_IDP: &str = "LOCAL";

/// Closed set of authenticator kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticatorKind {
    #[default]
    Local,
    SecondFactor,
    Federated,
    Handler,
}

impl std::fmt::Display for AuthenticatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticatorKind::Local => write!(f, "local"),
            AuthenticatorKind::SecondFactor => write!(f, "second factor"),
            AuthenticatorKind::Federated => write!(f, "federated"),
            AuthenticatorKind::Handler => write!(f, "handler"),
        }
    }
}

/// An authenticator offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub category: AuthenticatorKind,
    /// For second factors this is derived by the editor.
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default = "local_idp")]
    pub idp: String,
    /// Name placed in step options. Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_authenticator: Option<String>,
}

fn enabled() -> bool {
    true
}

fn local_idp() -> String {
    LOCAL_IDP.to_string()
}

impl AuthenticatorDescriptor {
    pub fn local(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            name,
            category: AuthenticatorKind::Local,
            is_enabled: true,
            idp: LOCAL_IDP.to_string(),
            default_authenticator: None,
        }
    }

    pub fn federated(
        id: impl Into<String>,
        idp_name: impl Into<String>,
        default_authenticator: impl Into<String>,
    ) -> Self {
        let name = idp_name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            idp: name.clone(),
            name,
            category: AuthenticatorKind::Federated,
            is_enabled: true,
            default_authenticator: Some(default_authenticator.into()),
        }
    }

    /// Authenticator name used when this entry is added to a step.
    pub fn option_name(&self) -> &str {
        self.default_authenticator.as_deref().unwrap_or(&self.name)
    }
}

/// Raw catalog lists: `(local, federated)`.
pub type AuthenticatorLists = (Vec<AuthenticatorDescriptor>, Vec<AuthenticatorDescriptor>);

/// Source of available authenticators.
#[async_trait]
pub trait AuthenticatorCatalog: Send + Sync {
    async fn get_all_authenticators(&self) -> Result<AuthenticatorLists, CatalogError>;
}

/// Fixed catalog, typically loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub local: Vec<AuthenticatorDescriptor>,
    #[serde(default)]
    pub federated: Vec<AuthenticatorDescriptor>,
}

impl StaticCatalog {
    pub fn new(
        local: Vec<AuthenticatorDescriptor>,
        federated: Vec<AuthenticatorDescriptor>,
    ) -> Self {
        Self { local, federated }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl AuthenticatorCatalog for StaticCatalog {
    async fn get_all_authenticators(&self) -> Result<AuthenticatorLists, CatalogError> {
        Ok((self.local.clone(), self.federated.clone()))
    }
}

/// Catalog entries grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Local authenticators and handlers.
    pub local: Vec<AuthenticatorDescriptor>,
    pub second_factors: Vec<AuthenticatorDescriptor>,
    pub federated: Vec<AuthenticatorDescriptor>,
}

impl CatalogSnapshot {
    /// Classify the raw lists once.
    ///
    /// Local entries become second factors or handlers by name; every
    /// federated entry is federated regardless of what the source claimed.
    pub fn classify(lists: AuthenticatorLists, policy: &FactorPolicy) -> Self {
        let (local, federated) = lists;
        let mut snapshot = CatalogSnapshot::default();

        for mut descriptor in local {
            descriptor.category = policy.classify_local(&descriptor.name);
            if descriptor.category == AuthenticatorKind::SecondFactor {
                snapshot.second_factors.push(descriptor);
            } else {
                snapshot.local.push(descriptor);
            }
        }

        snapshot.federated = federated
            .into_iter()
            .map(|mut descriptor| {
                descriptor.category = AuthenticatorKind::Federated;
                descriptor
            })
            .collect();

        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.second_factors.is_empty() && self.federated.is_empty()
    }

    /// Every entry: local, then federated, then second factors.
    pub fn iter(&self) -> impl Iterator<Item = &AuthenticatorDescriptor> {
        self.local
            .iter()
            .chain(self.federated.iter())
            .chain(self.second_factors.iter())
    }

    pub fn find(&self, id: &str) -> Option<&AuthenticatorDescriptor> {
        self.iter().find(|descriptor| descriptor.id == id)
    }

    pub fn of_kind(&self, kind: AuthenticatorKind) -> Vec<&AuthenticatorDescriptor> {
        self.iter()
            .filter(|descriptor| descriptor.category == kind)
            .collect()
    }

    pub(crate) fn set_second_factors_enabled(&mut self, enabled: bool) {
        for descriptor in &mut self.second_factors {
            descriptor.is_enabled = enabled;
        }
    }
}
