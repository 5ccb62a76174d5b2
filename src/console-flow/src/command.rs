//! Editor commands.
//!
//! Button clicks, dropdown changes and drag-and-drop all reduce to an
//! [`EditorCommand`]. Commands deserialize from YAML or JSON so a whole
//! editing session can be scripted:
//!
//! ```yaml
//! - op: add_step
//! - op: drop
//!   draggable_id: dG90cA
//!   droppable_id: authentication-step-1
//! - op: commit
//! ```

use serde::{Deserialize, Serialize};

use crate::editor::{AddOutcome, SequenceEditor};
use crate::error::EditResult;
use crate::model::{AuthenticationSequence, AuthenticatorOption};

/// Droppable id prefix of authentication steps.
pub const AUTHENTICATION_STEP_DROPPABLE_ID: &str = "authentication-step-";

/// Droppable id of the authenticator side panel.
pub const LOCAL_AUTHENTICATORS_DROPPABLE_ID: &str = "local-authenticators";

/// Step index encoded in a droppable id like `authentication-step-2`.
pub fn parse_step_droppable(droppable_id: &str) -> Option<usize> {
    droppable_id
        .strip_prefix(AUTHENTICATION_STEP_DROPPABLE_ID)?
        .parse()
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    AddStep,
    RemoveStep {
        index: usize,
    },
    AddOption {
        step: usize,
        authenticator: String,
    },
    /// An authenticator dragged from the side panel. No destination means
    /// the drag was cancelled.
    Drop {
        draggable_id: String,
        #[serde(default)]
        droppable_id: Option<String>,
    },
    RemoveOption {
        step: usize,
        option: usize,
    },
    ChangeOption {
        step: usize,
        option: usize,
        authenticator: String,
    },
    SetSubjectStep {
        id: u32,
    },
    SetAttributeStep {
        id: u32,
    },
    Validate,
    /// Set the host trigger flag.
    Trigger {
        value: bool,
    },
    Commit,
}

/// What a successfully applied command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    StepAdded(u32),
    OptionAdded(AddOutcome),
    OptionRemoved(AuthenticatorOption),
    Validated(bool),
    Committed(AuthenticationSequence),
    /// Nothing to do, e.g. a drop outside any step or a falling trigger.
    Ignored,
}

impl SequenceEditor {
    /// Apply one command through the regular edit operations.
    pub fn apply(&mut self, command: EditorCommand) -> EditResult<CommandOutcome> {
        tracing::trace!(?command, "applying editor command");
        match command {
            EditorCommand::AddStep => self.add_step().map(CommandOutcome::StepAdded),
            EditorCommand::RemoveStep { index } => {
                self.remove_step(index).map(|()| CommandOutcome::Applied)
            }
            EditorCommand::AddOption {
                step,
                authenticator,
            } => self
                .add_option_to_step(step, &authenticator)
                .map(CommandOutcome::OptionAdded),
            EditorCommand::Drop {
                draggable_id,
                droppable_id,
            } => {
                let Some(droppable_id) = droppable_id else {
                    return Ok(CommandOutcome::Ignored);
                };
                match parse_step_droppable(&droppable_id) {
                    Some(step) => self
                        .add_option_to_step(step, &draggable_id)
                        .map(CommandOutcome::OptionAdded),
                    None => {
                        tracing::debug!(droppable_id = %droppable_id, "drop outside a step ignored");
                        Ok(CommandOutcome::Ignored)
                    }
                }
            }
            EditorCommand::RemoveOption { step, option } => self
                .remove_option(step, option)
                .map(CommandOutcome::OptionRemoved),
            EditorCommand::ChangeOption {
                step,
                option,
                authenticator,
            } => self
                .change_option_authenticator(step, option, &authenticator)
                .map(|()| CommandOutcome::Applied),
            EditorCommand::SetSubjectStep { id } => {
                self.set_subject_step(id).map(|()| CommandOutcome::Applied)
            }
            EditorCommand::SetAttributeStep { id } => {
                self.set_attribute_step(id).map(|()| CommandOutcome::Applied)
            }
            EditorCommand::Validate => Ok(CommandOutcome::Validated(self.validate())),
            EditorCommand::Trigger { value } => match self.set_trigger_update(value) {
                Some(result) => result.map(CommandOutcome::Committed),
                None => Ok(CommandOutcome::Ignored),
            },
            EditorCommand::Commit => self.commit().map(CommandOutcome::Committed),
        }
    }
}
