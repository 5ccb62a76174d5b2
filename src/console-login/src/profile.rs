//! Signed-in user state and the actions that change it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// SCIM `Me` resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileInfo {
    pub id: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub emails: Vec<serde_json::Value>,
    pub name: Option<serde_json::Value>,
    /// HTTP status the resource was served with.
    #[serde(skip)]
    pub response_status: u16,
}

/// One SCIM attribute definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileSchema {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub attribute_type: Option<String>,
    pub multi_valued: bool,
    pub required: bool,
    pub mutability: Option<String>,
    pub sub_attributes: Vec<ProfileSchema>,
}

/// The user the console is signed in as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub associated_tenants: Option<Vec<String>>,
    pub default_tenant: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub scope: String,
    pub tenant_domain: String,
    pub username: String,
}

/// State changes published by the sign-in lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    SetInitialized(bool),
    SetSignIn(AuthenticatedUser),
    SetSignOut,
    SetProfileInfo(ProfileInfo),
    SetProfileInfoRequestLoading(bool),
    SetProfileSchemaRequestLoading(bool),
    SetScimSchemas(Vec<ProfileSchema>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub initialized: bool,
    pub is_authenticated: bool,
    pub user: Option<AuthenticatedUser>,
    pub profile_info: Option<ProfileInfo>,
    pub profile_schemas: Vec<ProfileSchema>,
    pub profile_info_loading: bool,
    pub profile_schema_loading: bool,
}

impl AuthState {
    fn apply(&mut self, action: &StoreAction) {
        match action {
            StoreAction::SetInitialized(value) => self.initialized = *value,
            StoreAction::SetSignIn(user) => {
                self.user = Some(user.clone());
                self.is_authenticated = true;
            }
            StoreAction::SetSignOut => {
                self.user = None;
                self.is_authenticated = false;
                self.profile_info = None;
            }
            StoreAction::SetProfileInfo(info) => self.profile_info = Some(info.clone()),
            StoreAction::SetProfileInfoRequestLoading(value) => self.profile_info_loading = *value,
            StoreAction::SetProfileSchemaRequestLoading(value) => {
                self.profile_schema_loading = *value
            }
            StoreAction::SetScimSchemas(schemas) => self.profile_schemas = schemas.clone(),
        }
    }
}

/// Holds [`AuthState`] and every action applied to it.
#[derive(Debug, Default)]
pub struct AuthStore {
    state: Mutex<AuthState>,
    history: Mutex<Vec<StoreAction>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: StoreAction) {
        tracing::trace!(?action, "store action");
        self.state.lock().apply(&action);
        self.history.lock().push(action);
    }

    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    /// Actions in the order they were dispatched.
    pub fn history(&self) -> Vec<StoreAction> {
        self.history.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_then_out() {
        let store = AuthStore::new();
        store.dispatch(StoreAction::SetSignIn(AuthenticatedUser {
            username: "admin".to_string(),
            tenant_domain: "carbon.super".to_string(),
            ..AuthenticatedUser::default()
        }));
        store.dispatch(StoreAction::SetProfileInfo(ProfileInfo::default()));
        assert!(store.state().is_authenticated);

        store.dispatch(StoreAction::SetSignOut);
        let state = store.state();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.profile_info.is_none());
        assert_eq!(store.history().len(), 3);
    }

    #[test]
    fn test_schema_attribute_parse() {
        let schema: ProfileSchema = serde_json::from_value(serde_json::json!({
            "name": "name",
            "type": "COMPLEX",
            "subAttributes": [{"name": "givenName", "type": "STRING"}]
        }))
        .unwrap();
        assert_eq!(schema.attribute_type.as_deref(), Some("COMPLEX"));
        assert_eq!(schema.sub_attributes[0].name, "givenName");
    }
}
