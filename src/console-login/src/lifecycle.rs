//! The console's sign-in lifecycle.
//!
//! [`AuthLifecycle`] initializes the identity client, reacts to a
//! completed sign-in by resolving tenant qualified URLs and loading the
//! user's profile, and signs out.

use console_common::{Alert, AlertSink, DeploymentConfig, TracingAlertSink};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::client::{
    ConsoleApi, HttpConsoleApi, IdentityClient, ServiceEndpoints, SignInResponse,
};
use crate::constants::{
    AUTH_BOOTSTRAP_PATH, AUTHORIZATION_ENDPOINT, CONSOLE_APP, LOGOUT_URL,
    OIDC_SESSION_IFRAME_ENDPOINT, SCHEMAS_ENDPOINT, SESSION_STATE, TOKEN_ENDPOINT,
};
use crate::error::LoginResult;
use crate::profile::{AuthStore, AuthenticatedUser, StoreAction};
use crate::session::{
    SessionStore, is_valid_authentication_callback_url, remove_authentication_callback_url,
};
use crate::settings::{ClientSettings, Environment};
use crate::urls::resolve_idp_url_after_tenant_resolves;

/// Result of a sign-out attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutOutcome {
    SignedOut,
    /// Signing out failed; navigate to this route instead.
    RedirectTo(String),
}

pub struct AuthLifecycle {
    deployment: DeploymentConfig,
    environment: Environment,
    client: Arc<dyn IdentityClient>,
    session: Arc<dyn SessionStore>,
    api: Arc<dyn ConsoleApi>,
    alerts: Arc<dyn AlertSink>,
    store: Arc<AuthStore>,
    tenant: Mutex<Option<String>>,
}

impl AuthLifecycle {
    pub fn new(
        deployment: DeploymentConfig,
        environment: Environment,
        client: Arc<dyn IdentityClient>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let tenant = environment.tenant.clone();
        Self {
            deployment,
            environment,
            client,
            session,
            api: Arc::new(HttpConsoleApi::new()),
            alerts: Arc::new(TracingAlertSink),
            store: Arc::new(AuthStore::new()),
            tenant: Mutex::new(tenant),
        }
    }

    pub fn with_api(mut self, api: Arc<dyn ConsoleApi>) -> Self {
        self.api = api;
        self
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_store(mut self, store: Arc<AuthStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<AuthStore> {
        &self.store
    }

    /// Tenant resolved at sign-in, else the one from the URL.
    pub fn tenant(&self) -> Option<String> {
        self.tenant.lock().clone()
    }

    fn tenant_or_super(&self) -> String {
        self.tenant()
            .unwrap_or_else(|| self.deployment.super_tenant.clone())
    }

    /// Base path the console routes are mounted under for the tenant.
    pub fn tenant_qualified_base_name(&self) -> String {
        self.deployment.app_base_with_tenant(&self.tenant_or_super())
    }

    /// Self user endpoint of the current tenant.
    pub fn me_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.deployment.server_origin_with_tenant(&self.tenant_or_super()),
            self.deployment.me_endpoint
        )
    }

    fn schemas_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.deployment.server_origin_with_tenant(&self.tenant_or_super()),
            SCHEMAS_ENDPOINT
        )
    }

    /// Initialize the identity client.
    ///
    /// In production the hosting server has already exchanged the
    /// authorization response; its code and session state are fetched
    /// from `{app base}/auth` first.
    pub async fn initialize(&self) -> LoginResult<ClientSettings> {
        let auth = if self.environment.production {
            let url = format!(
                "{}{}{}",
                self.deployment.client_origin,
                self.deployment.app_base_path(),
                AUTH_BOOTSTRAP_PATH
            );
            tracing::debug!(url = %url, "fetching authorization code from hosting server");
            match self.api.fetch_auth_code(&url).await {
                Ok(response) => Some(response),
                Err(err) => {
                    tracing::warn!(error = %err, "could not fetch authorization code");
                    return Err(err);
                }
            }
        } else {
            None
        };

        let settings = ClientSettings::resolve(&self.deployment, &self.environment, auth.as_ref());
        self.client.initialize(&settings).await?;
        self.store.dispatch(StoreAction::SetInitialized(true));
        tracing::info!(
            storage = %settings.storage,
            production = self.environment.production,
            "identity client initialized"
        );
        Ok(settings)
    }

    pub async fn sign_in(&self) -> LoginResult<()> {
        tracing::debug!("signing in");
        self.client.sign_in().await
    }

    /// Handle a completed sign-in.
    pub async fn on_sign_in(&self, response: SignInResponse) -> LoginResult<()> {
        let tenant = response.tenant_domain.clone();
        *self.tenant.lock() = Some(tenant.clone());
        tracing::info!(tenant = %tenant, user = %response.username, "signed in");

        // A callback URL from another tenant would loop the redirect.
        if tenant != self.deployment.super_tenant {
            let tenant_path = self.deployment.tenant_path(&tenant);
            if !is_valid_authentication_callback_url(self.session.as_ref(), CONSOLE_APP, &tenant_path)
            {
                tracing::debug!(tenant_path = %tenant_path, "resetting stale callback URL");
                remove_authentication_callback_url(self.session.as_ref(), CONSOLE_APP);
            }
        }

        self.rewrite_logout_url(&tenant)?;

        let id_token = self.client.decoded_id_token().await?;
        self.store.dispatch(StoreAction::SetSignIn(AuthenticatedUser {
            associated_tenants: id_token.associated_tenants,
            default_tenant: id_token.default_tenant,
            display_name: response.display_name.clone(),
            email: response.email.clone(),
            scope: response.allowed_scopes.clone(),
            tenant_domain: tenant,
            username: response.username.clone(),
        }));

        match response.session_state.as_deref() {
            Some(state) => self.session.set(SESSION_STATE, state),
            None => self.session.remove(SESSION_STATE),
        }

        let endpoints = self.client.service_endpoints().await?;
        self.store_service_endpoints(endpoints)?;

        self.load_profile_information(&self.me_endpoint()).await;
        Ok(())
    }

    /// Point the stored logout URL's post logout redirect at the tenant.
    fn rewrite_logout_url(&self, tenant: &str) -> LoginResult<()> {
        let Some(mut logout_url) = self.session.get(LOGOUT_URL) else {
            return Ok(());
        };

        if !self.deployment.common_post_logout_url {
            if self.deployment.app_base_path().is_empty() {
                let login = format!(
                    "{}{}",
                    self.deployment.client_origin, self.deployment.login_route
                );
                logout_url = logout_url.replacen(&self.deployment.logout_callback_url, &login, 1);
            } else {
                logout_url = logout_url.replacen(
                    &self.deployment.app_base_path(),
                    &self.deployment.app_base_with_tenant(tenant),
                    1,
                );
            }
        }

        if let Some(overridden) = &self.deployment.idp.logout_endpoint_url {
            logout_url = resolve_idp_url_after_tenant_resolves(&logout_url, overridden)?;
        }

        self.session.set(LOGOUT_URL, &logout_url);
        Ok(())
    }

    /// Persist discovered endpoints, applying configured overrides.
    fn store_service_endpoints(&self, endpoints: ServiceEndpoints) -> LoginResult<()> {
        let idp = &self.deployment.idp;
        let resolve = |discovered: String, overridden: &Option<String>| match overridden {
            Some(overridden) => resolve_idp_url_after_tenant_resolves(&discovered, overridden),
            None => Ok(discovered),
        };

        let authorize = resolve(endpoints.authorize, &idp.authorize_endpoint_url)?;
        let iframe = resolve(
            endpoints.oidc_session_iframe,
            &idp.oidc_session_iframe_endpoint_url,
        )?;
        let token = resolve(endpoints.token, &idp.token_endpoint_url)?;

        self.session.set(AUTHORIZATION_ENDPOINT, &authorize);
        self.session.set(OIDC_SESSION_IFRAME_ENDPOINT, &iframe);
        self.session.set(TOKEN_ENDPOINT, &token);
        tracing::debug!("service endpoints stored, session check may start");
        Ok(())
    }

    /// Sign out. On failure the caller should navigate to the home route.
    pub async fn sign_out(&self) -> SignOutOutcome {
        match self.client.sign_out().await {
            Ok(()) => {
                remove_authentication_callback_url(self.session.as_ref(), CONSOLE_APP);
                self.store.dispatch(StoreAction::SetSignOut);
                tracing::info!("signed out");
                SignOutOutcome::SignedOut
            }
            Err(err) => {
                tracing::warn!(error = %err, "sign out failed, returning home");
                SignOutOutcome::RedirectTo(self.deployment.home_route.clone())
            }
        }
    }

    /// Load the signed-in user's profile, and the SCIM schemas when none
    /// are loaded yet. Failures are reported as alerts.
    pub async fn load_profile_information(&self, me_endpoint: &str) {
        self.store
            .dispatch(StoreAction::SetProfileInfoRequestLoading(true));

        match self.api.get_profile_info(me_endpoint).await {
            Ok(info) if info.response_status != 200 => {
                tracing::warn!(status = info.response_status, "unexpected profile response");
                self.alerts.dispatch(profile_generic_error());
            }
            Ok(info) => {
                self.store.dispatch(StoreAction::SetProfileInfo(info));
                if self.store.state().profile_schemas.is_empty() {
                    self.load_profile_schemas().await;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load profile");
                match err.detail() {
                    Some(detail) => self.alerts.dispatch(Alert::error(
                        "Error retrieving profile details",
                        detail,
                    )),
                    None => self.alerts.dispatch(profile_generic_error()),
                }
            }
        }

        self.store
            .dispatch(StoreAction::SetProfileInfoRequestLoading(false));
    }

    async fn load_profile_schemas(&self) {
        self.store
            .dispatch(StoreAction::SetProfileSchemaRequestLoading(true));

        match self.api.get_profile_schemas(&self.schemas_endpoint()).await {
            Ok(schemas) => self.store.dispatch(StoreAction::SetScimSchemas(schemas)),
            Err(err) => {
                tracing::warn!(error = %err, "could not load profile schemas");
                if let Some(description) = err.description() {
                    self.alerts.dispatch(Alert::error(
                        "Error retrieving profile schemas",
                        description,
                    ));
                }
                self.alerts.dispatch(Alert::error(
                    "Something went wrong",
                    "Couldn't retrieve user profile schemas.",
                ));
            }
        }

        self.store
            .dispatch(StoreAction::SetProfileSchemaRequestLoading(false));
    }
}

fn profile_generic_error() -> Alert {
    Alert::error(
        "Something went wrong",
        "Couldn't retrieve user profile details due to some error.",
    )
}
