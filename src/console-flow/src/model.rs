//! Authentication sequence data model.
//!
//! Field names follow the console REST payloads (camelCase JSON).

use serde::{Deserialize, Serialize};

/// One authenticator choice inside a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorOption {
    /// Authenticator name, e.g. `BasicAuthenticator`.
    pub authenticator: String,
    /// Identity provider the authenticator belongs to (`LOCAL` for local ones).
    pub idp: String,
}

impl AuthenticatorOption {
    pub fn new(authenticator: impl Into<String>, idp: impl Into<String>) -> Self {
        Self {
            authenticator: authenticator.into(),
            idp: idp.into(),
        }
    }
}

/// A step in the flow. Ids are 1-based and equal the step position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationStep {
    pub id: u32,
    #[serde(default)]
    pub options: Vec<AuthenticatorOption>,
}

impl AuthenticationStep {
    pub fn empty(id: u32) -> Self {
        Self {
            id,
            options: Vec::new(),
        }
    }

    pub fn has_authenticator(&self, name: &str) -> bool {
        self.options.iter().any(|option| option.authenticator == name)
    }
}

/// How the sequence was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceType {
    #[default]
    Default,
    UserDefined,
}

/// The full authentication flow of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSequence {
    #[serde(default)]
    pub steps: Vec<AuthenticationStep>,
    #[serde(default = "first_step")]
    pub subject_step_id: u32,
    #[serde(default = "first_step")]
    pub attribute_step_id: u32,
    #[serde(rename = "type", default)]
    pub sequence_type: SequenceType,
    #[serde(default)]
    pub request_path_authenticators: Vec<String>,
    /// Conditional authentication script. Read on load, never emitted on commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

fn first_step() -> u32 {
    1
}

impl Default for AuthenticationSequence {
    fn default() -> Self {
        Self {
            steps: vec![AuthenticationStep::empty(1)],
            subject_step_id: 1,
            attribute_step_id: 1,
            sequence_type: SequenceType::Default,
            request_path_authenticators: Vec::new(),
            script: None,
        }
    }
}

impl AuthenticationSequence {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Ids of steps that have no options.
    pub fn empty_steps(&self) -> Vec<u32> {
        self.steps
            .iter()
            .filter(|step| step.options.is_empty())
            .map(|step| step.id)
            .collect()
    }

    /// True when step ids run 1..=N in order.
    pub fn has_contiguous_ids(&self) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(index, step)| step.id as usize == index + 1)
    }

    /// True when the subject and attribute steps name existing steps.
    ///
    /// An empty sequence has nothing to reference and is accepted.
    pub fn references_existing_steps(&self) -> bool {
        if self.steps.is_empty() {
            return true;
        }
        let exists = |id: u32| self.steps.iter().any(|step| step.id == id);
        exists(self.subject_step_id) && exists(self.attribute_step_id)
    }
}
