//! Inbound OIDC configuration for applications.
//!
//! Models the OIDC protocol settings of an application and the rules of
//! the form that edits them: which grant types are offered, which fields
//! are shown, how callback URLs are encoded and what is sent on save.

mod error;
mod form;
pub mod grant_types;
mod metadata;
mod model;
pub mod urls;
mod validation;

pub use error::{OidcFormError, OidcResult};
pub use form::{CredentialAction, InboundOidcForm, OidcFormValues, SubmitOutcome};
pub use grant_types::GrantTypeOption;
pub use metadata::{GrantTypeMetadata, GrantTypesProperty, MetadataProperty, OidcMetadata};
pub use model::{
    AccessTokenConfig, AdvancedConfigurations, ApplicationState, BINDING_TYPE_NONE, Certificate,
    CertificateType, GeneralSettings, IdTokenConfig, IdTokenEncryption, InboundOidcConfig,
    LogoutConfig, PkceConfig, RefreshTokenConfig, SubmissionPayload,
};
pub use validation::{FieldIssue, OidcField, ValidationResult};
