//! Step based authentication flows.
//!
//! An application's sign-in flow is an ordered list of steps, each offering
//! one or more authenticators. [`SequenceEditor`] edits that list and keeps
//! it valid:
//!
//! - step ids stay 1..N after every change
//! - a step never holds the same authenticator twice
//! - second factors only follow a step with a first factor
//! - no step may be empty when the flow is saved
//!
//! The authenticator catalog and the embedding host are traits
//! ([`AuthenticatorCatalog`], [`SequenceHost`]); user warnings go to a
//! [`console_common::AlertSink`].

mod catalog;
mod command;
mod editor;
mod error;
mod host;
mod http_catalog;
mod model;
mod policy;

pub use catalog::{
    AuthenticatorCatalog, AuthenticatorDescriptor, AuthenticatorKind, AuthenticatorLists,
    CatalogSnapshot, LOCAL_IDP, StaticCatalog,
};
pub use command::{
    AUTHENTICATION_STEP_DROPPABLE_ID, CommandOutcome, EditorCommand,
    LOCAL_AUTHENTICATORS_DROPPABLE_ID, parse_step_droppable,
};
pub use editor::{AddOutcome, EditorState, SequenceEditor};
pub use error::{CatalogError, EditResult, SequenceRejection};
pub use host::{HostEvent, NoopHost, RecordingHost, SequenceHost};
pub use http_catalog::HttpAuthenticatorCatalog;
pub use model::{AuthenticationSequence, AuthenticationStep, AuthenticatorOption, SequenceType};
pub use policy::FactorPolicy;
