//! Console Login - the identity console's sign-in lifecycle.
//!
//! Provides:
//! - Client settings resolution (storage, base URLs, response mode, scope)
//! - Endpoint override rewriting once the tenant is known
//! - The sign-in / sign-out lifecycle over an [`IdentityClient`]
//! - Loading the signed-in user's profile and SCIM schemas

// Core modules
pub mod constants;
mod error;
pub mod session;
mod settings;
mod urls;

// Lifecycle
mod client;
mod lifecycle;
mod profile;

pub use client::{
    AuthCodeResponse, ConsoleApi, DecodedIdToken, HttpConsoleApi, IdentityClient,
    ServiceEndpoints, SignInResponse,
};
pub use error::{LoginError, LoginResult};
pub use lifecycle::{AuthLifecycle, SignOutOutcome};
pub use profile::{AuthState, AuthStore, AuthenticatedUser, ProfileInfo, ProfileSchema, StoreAction};
pub use session::{MemorySessionStore, SessionStore};
pub use settings::{
    ClientSettings, EndpointOverrides, Environment, ResponseMode, Storage, resolve_base_urls,
    resolve_response_mode, resolve_storage,
};
pub use urls::resolve_idp_url_after_tenant_resolves;
