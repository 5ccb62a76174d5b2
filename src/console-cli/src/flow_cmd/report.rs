//! Flow checks and scripted editing sessions, independent of terminal output.

use console_common::{Alert, ConsoleConfig, RecordingAlertSink};
use console_flow::{
    AddOutcome, AuthenticationSequence, AuthenticatorCatalog, CommandOutcome, EditResult,
    EditorCommand, FactorPolicy, RecordingHost, SequenceEditor,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Problems found in a stored sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowCheckReport {
    pub steps: usize,
    pub issues: Vec<String>,
}

impl FlowCheckReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a sequence against the rules the editor maintains.
pub fn check_sequence(sequence: &AuthenticationSequence, policy: &FactorPolicy) -> FlowCheckReport {
    let mut issues = Vec::new();
    let steps = &sequence.steps;

    if steps.is_empty() {
        issues.push("the sequence has no steps".to_string());
    }
    if !sequence.has_contiguous_ids() {
        let ids: Vec<String> = steps.iter().map(|step| step.id.to_string()).collect();
        issues.push(format!(
            "step ids must run 1..{} in order, found [{}]",
            steps.len(),
            ids.join(", ")
        ));
    }
    if !sequence.references_existing_steps() {
        issues.push(format!(
            "subject step {} or attribute step {} does not exist",
            sequence.subject_step_id, sequence.attribute_step_id
        ));
    }
    for id in sequence.empty_steps() {
        issues.push(format!("step {} has no authenticators", id));
    }

    for (index, step) in steps.iter().enumerate() {
        let mut reported = BTreeSet::new();
        for (position, option) in step.options.iter().enumerate() {
            let name = option.authenticator.as_str();
            let repeated = step.options[..position]
                .iter()
                .any(|earlier| earlier.authenticator == name);
            if repeated && reported.insert(name) {
                issues.push(format!("step {} lists '{}' more than once", step.id, name));
            }

            if policy.is_second_factor(name) && !policy.has_first_factor(&steps[..index]) {
                issues.push(format!(
                    "step {}: second factor '{}' needs a first factor in an earlier step",
                    step.id, name
                ));
            }
        }
    }

    FlowCheckReport {
        steps: steps.len(),
        issues,
    }
}

/// Result of one script command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReport {
    /// 1-based position in the script.
    pub index: usize,
    pub op: String,
    pub result: String,
    pub rejected: bool,
}

impl CommandReport {
    fn new(index: usize, op: String, result: EditResult<CommandOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                index,
                op,
                result: describe_outcome(&outcome),
                rejected: false,
            },
            Err(rejection) => Self {
                index,
                op,
                result: rejection.user_message(),
                rejected: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowApplyReport {
    pub commands: Vec<CommandReport>,
    pub alerts: Vec<Alert>,
    /// The editor's sequence after the last command.
    pub sequence: AuthenticationSequence,
    /// Last sequence handed to the host, if any command committed.
    pub committed: Option<AuthenticationSequence>,
}

impl FlowApplyReport {
    pub fn rejected(&self) -> usize {
        self.commands.iter().filter(|command| command.rejected).count()
    }
}

/// Run `script` in an editor opened on `sequence`.
///
/// Rejections do not stop the script. With `commit` a final commit runs
/// after the last command.
pub async fn apply_script(
    sequence: AuthenticationSequence,
    config: &ConsoleConfig,
    catalog: &dyn AuthenticatorCatalog,
    script: Vec<EditorCommand>,
    commit: bool,
) -> FlowApplyReport {
    let alerts = Arc::new(RecordingAlertSink::new());
    let host = Arc::new(RecordingHost::new());
    let mut editor = SequenceEditor::new(sequence, config, alerts.clone(), host.clone());
    editor.load_catalog(catalog).await;

    let mut commands = Vec::with_capacity(script.len() + 1);
    for command in script {
        let op = op_name(&command);
        let result = editor.apply(command);
        commands.push(CommandReport::new(commands.len() + 1, op, result));
    }
    if commit {
        let result = editor.apply(EditorCommand::Commit);
        commands.push(CommandReport::new(commands.len() + 1, "commit".to_string(), result));
    }

    tracing::debug!(
        commands = commands.len(),
        alerts = alerts.len(),
        "editor script finished"
    );

    FlowApplyReport {
        commands,
        alerts: alerts.alerts(),
        sequence: editor.sequence(),
        committed: host.updates().pop(),
    }
}

/// The `op` tag the command was written with.
fn op_name(command: &EditorCommand) -> String {
    serde_json::to_value(command)
        .ok()
        .and_then(|value| value.get("op").and_then(|op| op.as_str()).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

fn describe_outcome(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Applied => "applied".to_string(),
        CommandOutcome::StepAdded(id) => format!("added step {}", id),
        CommandOutcome::OptionAdded(AddOutcome::Added) => "authenticator added".to_string(),
        CommandOutcome::OptionAdded(AddOutcome::AddedWithDisclaimer) => {
            "authenticator added, handler disclaimer shown".to_string()
        }
        CommandOutcome::OptionAdded(AddOutcome::UnknownAuthenticator) => {
            "authenticator not in the catalog, nothing changed".to_string()
        }
        CommandOutcome::OptionRemoved(option) => {
            format!("removed {} ({})", option.authenticator, option.idp)
        }
        CommandOutcome::Validated(true) => "sequence is valid".to_string(),
        CommandOutcome::Validated(false) => "sequence is invalid".to_string(),
        CommandOutcome::Committed(sequence) => {
            format!("committed {} step(s)", sequence.steps.len())
        }
        CommandOutcome::Ignored => "ignored".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_flow::{AuthenticationStep, AuthenticatorOption};

    fn step(id: u32, names: &[&str]) -> AuthenticationStep {
        AuthenticationStep {
            id,
            options: names
                .iter()
                .map(|name| AuthenticatorOption::new(*name, "LOCAL"))
                .collect(),
        }
    }

    #[test]
    fn test_op_name_uses_serde_tag() {
        assert_eq!(op_name(&EditorCommand::AddStep), "add_step");
        assert_eq!(op_name(&EditorCommand::RemoveStep { index: 0 }), "remove_step");
        assert_eq!(op_name(&EditorCommand::Trigger { value: true }), "trigger");
    }

    #[test]
    fn test_duplicates_reported_once_per_name() {
        let sequence = AuthenticationSequence {
            steps: vec![step(
                1,
                &["BasicAuthenticator", "BasicAuthenticator", "BasicAuthenticator"],
            )],
            ..AuthenticationSequence::default()
        };

        let report = check_sequence(&sequence, &FactorPolicy::default());
        assert_eq!(
            report.issues,
            vec!["step 1 lists 'BasicAuthenticator' more than once".to_string()]
        );
    }
}
