//! The sequence editor.
//!
//! Owns the step list of one application and applies user edits to it.
//! Every edit either succeeds or is rejected with the model untouched; a
//! rejection is reported to the alert sink and returned to the caller.

use console_common::{Alert, AlertSink, ConsoleConfig};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{
    AuthenticatorCatalog, AuthenticatorDescriptor, AuthenticatorKind, AuthenticatorLists,
    CatalogSnapshot,
};
use crate::error::{EditResult, SequenceRejection};
use crate::host::SequenceHost;
use crate::model::{
    AuthenticationSequence, AuthenticationStep, AuthenticatorOption, SequenceType,
};
use crate::policy::FactorPolicy;

/// Where the editor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Sequence loaded, nothing changed yet.
    Loaded,
    Editing,
    /// The last trigger produced a valid sequence.
    Committed,
}

/// Result of adding an authenticator to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Added, and the handler disclaimer was shown.
    AddedWithDisclaimer,
    /// The catalog has no such authenticator. Nothing changed.
    UnknownAuthenticator,
}

pub struct SequenceEditor {
    steps: Vec<AuthenticationStep>,
    subject_step_id: u32,
    attribute_step_id: u32,
    catalog: CatalogSnapshot,
    policy: FactorPolicy,
    hidden_authenticators: Vec<String>,
    read_only: bool,
    state: EditorState,
    trigger_update: bool,
    handler_disclaimer_shown: bool,
    alerts: Arc<dyn AlertSink>,
    host: Arc<dyn SequenceHost>,
}

impl std::fmt::Debug for SequenceEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceEditor")
            .field("steps", &self.steps)
            .field("subject_step_id", &self.subject_step_id)
            .field("attribute_step_id", &self.attribute_step_id)
            .field("read_only", &self.read_only)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SequenceEditor {
    /// Open an editor on `sequence`. The catalog starts empty.
    pub fn new(
        sequence: AuthenticationSequence,
        config: &ConsoleConfig,
        alerts: Arc<dyn AlertSink>,
        host: Arc<dyn SequenceHost>,
    ) -> Self {
        let mut editor = Self {
            steps: sequence.steps,
            subject_step_id: sequence.subject_step_id,
            attribute_step_id: sequence.attribute_step_id,
            catalog: CatalogSnapshot::default(),
            policy: FactorPolicy::from(&config.authenticators),
            hidden_authenticators: config.ui.hidden_authenticators.clone(),
            read_only: config.ui.read_only,
            state: EditorState::Loaded,
            trigger_update: false,
            handler_disclaimer_shown: false,
            alerts,
            host,
        };
        editor.recompute_second_factor_availability();
        tracing::debug!(steps = editor.steps.len(), "sequence editor opened");
        editor
    }

    /// Fetch and classify the catalog.
    ///
    /// A failed fetch leaves the catalog empty; adds then do nothing.
    pub async fn load_catalog(&mut self, catalog: &dyn AuthenticatorCatalog) {
        let lists = match catalog.get_all_authenticators().await {
            Ok(lists) => lists,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load authenticator catalog");
                (Vec::new(), Vec::new())
            }
        };
        self.set_catalog(lists);
    }

    /// Install already fetched catalog lists.
    pub fn set_catalog(&mut self, lists: AuthenticatorLists) {
        self.catalog = CatalogSnapshot::classify(lists, &self.policy);
        self.recompute_second_factor_availability();
        tracing::debug!(
            local = self.catalog.local.len(),
            second_factors = self.catalog.second_factors.len(),
            federated = self.catalog.federated.len(),
            "authenticator catalog loaded"
        );
    }

    pub fn steps(&self) -> &[AuthenticationStep] {
        &self.steps
    }

    pub fn subject_step_id(&self) -> u32 {
        self.subject_step_id
    }

    pub fn attribute_step_id(&self) -> u32 {
        self.attribute_step_id
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn policy(&self) -> &FactorPolicy {
        &self.policy
    }

    /// Catalog entries of `kind` minus the configured hidden authenticators.
    pub fn visible_authenticators(&self, kind: AuthenticatorKind) -> Vec<&AuthenticatorDescriptor> {
        self.catalog
            .of_kind(kind)
            .into_iter()
            .filter(|descriptor| !self.hidden_authenticators.contains(&descriptor.name))
            .collect()
    }

    /// Second factor id -> whether it can currently be picked.
    pub fn second_factor_enabled(&self) -> BTreeMap<String, bool> {
        self.catalog
            .second_factors
            .iter()
            .map(|descriptor| (descriptor.id.clone(), descriptor.is_enabled))
            .collect()
    }

    /// Snapshot of the current edit as a user defined sequence.
    pub fn sequence(&self) -> AuthenticationSequence {
        AuthenticationSequence {
            steps: self.steps.clone(),
            subject_step_id: self.subject_step_id,
            attribute_step_id: self.attribute_step_id,
            sequence_type: SequenceType::UserDefined,
            request_path_authenticators: Vec::new(),
            script: None,
        }
    }

    /// Append an empty step and return its id.
    pub fn add_step(&mut self) -> EditResult<u32> {
        self.ensure_writable()?;

        let id = self.steps.len() as u32 + 1;
        self.steps.push(AuthenticationStep::empty(id));
        self.after_step_change();
        self.host.update_steps(true);

        tracing::debug!(step_id = id, "authentication step added");
        Ok(id)
    }

    /// Remove the step at `index` and renumber the rest.
    ///
    /// Refused for the last remaining step and when a second factor after
    /// `index` would have no first factor before it.
    pub fn remove_step(&mut self, index: usize) -> EditResult<()> {
        self.ensure_writable()?;

        if self.steps.len() <= 1 {
            return self.reject(SequenceRejection::MinimumSteps);
        }
        if index >= self.steps.len() {
            return self.reject(SequenceRejection::OutOfRange {
                what: "step",
                index,
            });
        }

        let left = &self.steps[..index];
        let right = &self.steps[index + 1..];
        if self.policy.has_second_factor(right) && !self.policy.has_first_factor(left) {
            return self.reject(SequenceRejection::SecondFactorOrphaned { step_index: index });
        }

        self.steps.remove(index);
        for (position, step) in self.steps.iter_mut().enumerate() {
            step.id = position as u32 + 1;
        }
        self.after_step_change();
        self.host.update_steps(false);

        tracing::debug!(step_index = index, remaining = self.steps.len(), "authentication step removed");
        Ok(())
    }

    /// Add the catalog entry `authenticator_id` to the step at `step_index`.
    ///
    /// Checks run in order: duplicate name in the step, then second factor
    /// placement. Handlers show a disclaimer the first time one is added.
    pub fn add_option_to_step(
        &mut self,
        step_index: usize,
        authenticator_id: &str,
    ) -> EditResult<AddOutcome> {
        self.ensure_writable()?;

        if step_index >= self.steps.len() {
            return self.reject(SequenceRejection::OutOfRange {
                what: "step",
                index: step_index,
            });
        }

        let Some(descriptor) = self.catalog.find(authenticator_id) else {
            tracing::debug!(authenticator = %authenticator_id, "authenticator not in catalog");
            return Ok(AddOutcome::UnknownAuthenticator);
        };
        let kind = descriptor.category;
        let option = AuthenticatorOption::new(descriptor.option_name(), descriptor.idp.clone());

        if self.steps[step_index].has_authenticator(&option.authenticator) {
            return self.reject(SequenceRejection::DuplicateAuthenticator {
                step_index,
                authenticator: option.authenticator,
            });
        }

        if kind == AuthenticatorKind::SecondFactor
            && (step_index == 0 || !self.policy.has_first_factor(&self.steps[..step_index]))
        {
            return self.reject(SequenceRejection::SecondFactorPlacement {
                step_index,
                authenticator: option.authenticator,
            });
        }

        let mut outcome = AddOutcome::Added;
        if kind == AuthenticatorKind::Handler && !self.handler_disclaimer_shown {
            self.handler_disclaimer_shown = true;
            self.alerts.dispatch(Alert::info(
                "Handler authenticator added",
                "Handlers only take effect together with a conditional \
                 authentication script.",
            ));
            outcome = AddOutcome::AddedWithDisclaimer;
        }

        tracing::debug!(
            step_index,
            authenticator = %option.authenticator,
            idp = %option.idp,
            kind = %kind,
            "authenticator added to step"
        );
        self.steps[step_index].options.push(option);
        self.after_step_change();
        Ok(outcome)
    }

    /// Remove an option. Only fails for indices outside the sequence.
    pub fn remove_option(
        &mut self,
        step_index: usize,
        option_index: usize,
    ) -> EditResult<AuthenticatorOption> {
        self.ensure_writable()?;
        self.ensure_option(step_index, option_index)?;

        let removed = self.steps[step_index].options.remove(option_index);
        self.after_step_change();

        tracing::debug!(step_index, authenticator = %removed.authenticator, "option removed");
        Ok(removed)
    }

    /// Swap the authenticator of an option in place.
    ///
    /// Unlike [`Self::add_option_to_step`] this does not check the step for
    /// a duplicate name, so two options of one step can end up equal.
    pub fn change_option_authenticator(
        &mut self,
        step_index: usize,
        option_index: usize,
        authenticator: &str,
    ) -> EditResult<()> {
        self.ensure_writable()?;
        self.ensure_option(step_index, option_index)?;

        let option = &mut self.steps[step_index].options[option_index];
        tracing::debug!(
            step_index,
            from = %option.authenticator,
            to = %authenticator,
            "option authenticator changed"
        );
        option.authenticator = authenticator.to_string();
        self.after_step_change();
        Ok(())
    }

    /// Step the subject identifier is taken from. Not range checked.
    pub fn set_subject_step(&mut self, step_id: u32) -> EditResult<()> {
        self.ensure_writable()?;
        self.subject_step_id = step_id;
        self.state = EditorState::Editing;
        Ok(())
    }

    /// Step attributes are taken from. Not range checked.
    pub fn set_attribute_step(&mut self, step_id: u32) -> EditResult<()> {
        self.ensure_writable()?;
        self.attribute_step_id = step_id;
        self.state = EditorState::Editing;
        Ok(())
    }

    /// Second factors are pickable iff there is more than one step and a
    /// first factor anywhere in the sequence.
    pub fn recompute_second_factor_availability(&mut self) {
        let enabled = self.steps.len() > 1 && self.policy.has_first_factor(&self.steps);
        self.catalog.set_second_factors_enabled(enabled);
    }

    /// False iff a step has no options. Warns the user on failure.
    pub fn validate(&self) -> bool {
        match self.empty_step() {
            Some(rejection) => {
                tracing::warn!(reason = %rejection, "sequence validation failed");
                if let Some(alert) = rejection.alert() {
                    self.alerts.dispatch(alert);
                }
                false
            }
            None => true,
        }
    }

    /// Validate and hand the sequence to the host.
    pub fn commit(&mut self) -> EditResult<AuthenticationSequence> {
        if let Some(rejection) = self.empty_step() {
            return self.reject(rejection);
        }

        let sequence = self.sequence();
        self.host.on_update(sequence.clone());
        self.state = EditorState::Committed;

        tracing::info!(steps = sequence.steps.len(), "authentication sequence committed");
        Ok(sequence)
    }

    /// Update the host trigger flag. A rising edge commits.
    pub fn set_trigger_update(
        &mut self,
        trigger: bool,
    ) -> Option<EditResult<AuthenticationSequence>> {
        let rising = trigger && !self.trigger_update;
        self.trigger_update = trigger;
        if rising { Some(self.commit()) } else { None }
    }

    fn empty_step(&self) -> Option<SequenceRejection> {
        self.steps
            .iter()
            .find(|step| step.options.is_empty())
            .map(|step| SequenceRejection::EmptyStep { step_id: step.id })
    }

    fn ensure_writable(&self) -> EditResult<()> {
        if self.read_only {
            tracing::debug!("edit ignored, editor is read-only");
            return Err(SequenceRejection::ReadOnly);
        }
        Ok(())
    }

    fn ensure_option(&self, step_index: usize, option_index: usize) -> EditResult<()> {
        let Some(step) = self.steps.get(step_index) else {
            return Err(SequenceRejection::OutOfRange {
                what: "step",
                index: step_index,
            });
        };
        if option_index >= step.options.len() {
            return Err(SequenceRejection::OutOfRange {
                what: "option",
                index: option_index,
            });
        }
        Ok(())
    }

    fn after_step_change(&mut self) {
        self.state = EditorState::Editing;
        self.recompute_second_factor_availability();
    }

    fn reject<T>(&mut self, rejection: SequenceRejection) -> EditResult<T> {
        tracing::warn!(reason = %rejection, "editor operation rejected");
        if let Some(alert) = rejection.alert() {
            self.alerts.dispatch(alert);
        }
        self.state = EditorState::Editing;
        Err(rejection)
    }
}
