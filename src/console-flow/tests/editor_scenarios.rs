//! Behavioural tests for the sequence editor.
//!
//! Invariants are checked over every small sequence built from a fixed
//! alphabet of authenticators, followed by the documented editing scenarios.

use std::sync::Arc;

use console_common::{AlertLevel, ConsoleConfig, RecordingAlertSink};
use console_flow::{
    AddOutcome, AuthenticationSequence, AuthenticationStep, AuthenticatorDescriptor,
    AuthenticatorOption, CommandOutcome, EditorCommand, HostEvent, RecordingHost,
    SequenceEditor, SequenceRejection, SequenceType, StaticCatalog,
};

const BASIC: &str = "QmFzaWNBdXRoZW50aWNhdG9y";
const FIDO: &str = "RklET0F1dGhlbnRpY2F0b3I";
const TOTP: &str = "dG90cA";
const EMAIL_OTP: &str = "ZW1haWwtb3RwLWF1dGhlbnRpY2F0b3I";
const GOOGLE: &str = "google-idp";

struct Session {
    editor: SequenceEditor,
    alerts: Arc<RecordingAlertSink>,
    host: Arc<RecordingHost>,
}

fn catalog() -> StaticCatalog {
    StaticCatalog::new(
        vec![
            AuthenticatorDescriptor::local(BASIC, "BasicAuthenticator"),
            AuthenticatorDescriptor::local(FIDO, "FIDOAuthenticator"),
            AuthenticatorDescriptor::local(TOTP, "totp"),
            AuthenticatorDescriptor::local(EMAIL_OTP, "email-otp-authenticator"),
        ],
        vec![AuthenticatorDescriptor::federated(
            GOOGLE,
            "Google",
            "GoogleOIDCAuthenticator",
        )],
    )
}

async fn open(sequence: AuthenticationSequence) -> Session {
    let alerts = Arc::new(RecordingAlertSink::new());
    let host = Arc::new(RecordingHost::new());
    let mut editor = SequenceEditor::new(
        sequence,
        &ConsoleConfig::default(),
        alerts.clone(),
        host.clone(),
    );
    editor.load_catalog(&catalog()).await;
    Session {
        editor,
        alerts,
        host,
    }
}

fn option(name: &str) -> AuthenticatorOption {
    let idp = if name == "GoogleOIDCAuthenticator" {
        "Google"
    } else {
        "LOCAL"
    };
    AuthenticatorOption::new(name, idp)
}

fn sequence_of(steps: &[&[&str]]) -> AuthenticationSequence {
    AuthenticationSequence {
        steps: steps
            .iter()
            .enumerate()
            .map(|(index, names)| AuthenticationStep {
                id: index as u32 + 1,
                options: names.iter().map(|name| option(name)).collect(),
            })
            .collect(),
        ..AuthenticationSequence::default()
    }
}

/// Contents a step can have in generated sequences.
const STEP_SHAPES: &[&[&str]] = &[
    &[],
    &["BasicAuthenticator"],
    &["totp"],
    &["GoogleOIDCAuthenticator"],
    &["BasicAuthenticator", "totp"],
];

/// Every sequence of 1..=3 steps over `STEP_SHAPES`.
fn all_sequences() -> Vec<AuthenticationSequence> {
    let mut out = Vec::new();
    for len in 1..=3usize {
        let total = STEP_SHAPES.len().pow(len as u32);
        for mut n in 0..total {
            let mut steps: Vec<&[&str]> = Vec::with_capacity(len);
            for _ in 0..len {
                steps.push(STEP_SHAPES[n % STEP_SHAPES.len()]);
                n /= STEP_SHAPES.len();
            }
            out.push(sequence_of(&steps));
        }
    }
    out
}

fn ids(editor: &SequenceEditor) -> Vec<u32> {
    editor.steps().iter().map(|step| step.id).collect()
}

fn is_first_factor(name: &str) -> bool {
    name == "BasicAuthenticator" || name == "FIDOAuthenticator"
}

// ============================================================================
// INVARIANTS
// ============================================================================

mod invariants {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_remove_step_keeps_ids_contiguous() {
        for sequence in all_sequences() {
            for index in 0..sequence.steps.len() {
                let mut session = open(sequence.clone()).await;
                let _ = session.editor.remove_step(index);

                let expected: Vec<u32> = (1..=session.editor.steps().len() as u32).collect();
                assert_eq!(ids(&session.editor), expected, "sequence {:?}", sequence);
            }
        }
    }

    #[tokio::test]
    async fn test_remove_only_step_always_rejected() {
        for shape in STEP_SHAPES {
            let sequence = sequence_of(&[shape]);
            let mut session = open(sequence.clone()).await;

            assert_eq!(
                session.editor.remove_step(0),
                Err(SequenceRejection::MinimumSteps)
            );
            assert_eq!(session.editor.steps(), sequence.steps.as_slice());

            let alerts = session.alerts.alerts();
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].level, AlertLevel::Warning);
            assert!(session.host.events().is_empty());
        }
    }

    #[tokio::test]
    async fn test_add_option_never_duplicates() {
        let ids_to_add = [BASIC, FIDO, TOTP, EMAIL_OTP, GOOGLE];
        for sequence in all_sequences() {
            for step in 0..sequence.steps.len() {
                let mut session = open(sequence.clone()).await;
                for id in ids_to_add {
                    let _ = session.editor.add_option_to_step(step, id);
                    let _ = session.editor.add_option_to_step(step, id);
                }

                for step in session.editor.steps() {
                    let mut names: Vec<&str> = step
                        .options
                        .iter()
                        .map(|option| option.authenticator.as_str())
                        .collect();
                    let before = names.len();
                    names.sort_unstable();
                    names.dedup();
                    assert_eq!(names.len(), before, "duplicate in {:?}", step);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_second_factor_never_added_to_first_step() {
        for sequence in all_sequences() {
            if sequence.steps[0].has_authenticator("email-otp-authenticator") {
                continue;
            }
            let mut session = open(sequence.clone()).await;

            let result = session.editor.add_option_to_step(0, EMAIL_OTP);

            assert!(
                matches!(result, Err(SequenceRejection::SecondFactorPlacement { step_index: 0, .. })),
                "sequence {:?} gave {:?}",
                sequence,
                result
            );
            assert_eq!(session.editor.steps(), sequence.steps.as_slice());
        }
    }

    #[tokio::test]
    async fn test_second_factor_needs_earlier_first_factor() {
        for sequence in all_sequences() {
            for k in 1..sequence.steps.len() {
                let mut session = open(sequence.clone()).await;
                let earlier_first_factor = sequence.steps[..k]
                    .iter()
                    .flat_map(|step| step.options.iter())
                    .any(|option| is_first_factor(&option.authenticator));

                let result = session.editor.add_option_to_step(k, EMAIL_OTP);

                assert_eq!(
                    result.is_ok(),
                    earlier_first_factor,
                    "sequence {:?} step {}",
                    sequence,
                    k
                );
                if result.is_ok() {
                    assert!(session.editor.steps()[k].has_authenticator("email-otp-authenticator"));
                } else {
                    assert_eq!(session.editor.steps(), sequence.steps.as_slice());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_validate_false_iff_empty_step() {
        for sequence in all_sequences() {
            let session = open(sequence.clone()).await;
            let has_empty = sequence.steps.iter().any(|step| step.options.is_empty());

            assert_eq!(session.editor.validate(), !has_empty, "sequence {:?}", sequence);
            assert_eq!(session.alerts.len(), usize::from(has_empty));
        }
    }

    #[tokio::test]
    async fn test_rejected_commit_emits_nothing() {
        let mut session = open(sequence_of(&[&["BasicAuthenticator"], &[]])).await;

        assert_eq!(
            session.editor.commit(),
            Err(SequenceRejection::EmptyStep { step_id: 2 })
        );
        assert!(session.host.updates().is_empty());
        assert_eq!(session.alerts.alerts()[0].message, "Empty authentication step");
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_add_second_factor_then_refuse_orphaning_removal() {
        let mut session = open(sequence_of(&[&["BasicAuthenticator"]])).await;

        session.editor.add_step().unwrap();
        assert_eq!(ids(&session.editor), vec![1, 2]);

        assert_eq!(
            session.editor.add_option_to_step(1, TOTP).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(session.editor.steps()[1].options, vec![option("totp")]);

        let before = session.editor.sequence();
        assert_eq!(
            session.editor.remove_step(0),
            Err(SequenceRejection::SecondFactorOrphaned { step_index: 0 })
        );
        assert_eq!(session.editor.sequence(), before);

        let alerts = session.alerts.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(
            session.host.events(),
            vec![HostEvent::StepsChanged { added: true }]
        );
    }

    #[tokio::test]
    async fn test_remove_second_of_two_steps() {
        let mut session = open(sequence_of(&[
            &["BasicAuthenticator"],
            &["GoogleOIDCAuthenticator"],
        ]))
        .await;

        session.editor.remove_step(1).unwrap();

        assert_eq!(
            session.editor.steps(),
            &[AuthenticationStep {
                id: 1,
                options: vec![option("BasicAuthenticator")],
            }]
        );
        assert_eq!(
            session.host.events(),
            vec![HostEvent::StepsChanged { added: false }]
        );
    }

    #[tokio::test]
    async fn test_remove_middle_step_renumbers() {
        let mut session = open(sequence_of(&[
            &["BasicAuthenticator"],
            &["GoogleOIDCAuthenticator"],
            &["totp"],
        ]))
        .await;

        session.editor.remove_step(1).unwrap();

        assert_eq!(ids(&session.editor), vec![1, 2]);
        assert_eq!(session.editor.steps()[1].options, vec![option("totp")]);
    }

    #[tokio::test]
    async fn test_change_option_allows_duplicates() {
        let mut session = open(sequence_of(&[&["BasicAuthenticator", "totp"]])).await;

        session
            .editor
            .change_option_authenticator(0, 1, "BasicAuthenticator")
            .unwrap();

        let names: Vec<&str> = session.editor.steps()[0]
            .options
            .iter()
            .map(|option| option.authenticator.as_str())
            .collect();
        assert_eq!(names, vec!["BasicAuthenticator", "BasicAuthenticator"]);
        assert!(session.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_scripted_drag_and_drop_session() {
        let mut session = open(sequence_of(&[&["BasicAuthenticator"]])).await;

        let script: Vec<EditorCommand> = serde_yaml::from_str(
            r#"
- op: add_step
- op: drop
  draggable_id: dG90cA
  droppable_id: authentication-step-1
- op: drop
  draggable_id: google-idp
  droppable_id: local-authenticators
- op: drop
  draggable_id: google-idp
- op: set_attribute_step
  id: 2
- op: trigger
  value: true
"#,
        )
        .unwrap();

        let outcomes: Vec<CommandOutcome> = script
            .into_iter()
            .map(|command| session.editor.apply(command).unwrap())
            .collect();

        assert_eq!(outcomes[0], CommandOutcome::StepAdded(2));
        assert_eq!(outcomes[1], CommandOutcome::OptionAdded(AddOutcome::Added));
        assert_eq!(outcomes[2], CommandOutcome::Ignored);
        assert_eq!(outcomes[3], CommandOutcome::Ignored);

        let CommandOutcome::Committed(committed) = &outcomes[5] else {
            panic!("expected a commit, got {:?}", outcomes[5]);
        };
        assert_eq!(committed.sequence_type, SequenceType::UserDefined);
        assert_eq!(committed.attribute_step_id, 2);
        assert_eq!(committed.subject_step_id, 1);
        assert!(committed.request_path_authenticators.is_empty());
        assert_eq!(session.host.updates(), vec![committed.clone()]);

        let json = serde_json::to_value(committed).unwrap();
        assert_eq!(json["type"], "USER_DEFINED");
        assert_eq!(json["steps"][1]["options"][0]["authenticator"], "totp");
    }

    #[tokio::test]
    async fn test_rejected_command_keeps_session_going() {
        let mut session = open(sequence_of(&[&["BasicAuthenticator"]])).await;

        let rejected = session.editor.apply(EditorCommand::AddOption {
            step: 0,
            authenticator: BASIC.to_string(),
        });
        assert!(matches!(
            rejected,
            Err(SequenceRejection::DuplicateAuthenticator { .. })
        ));

        assert_eq!(
            session.editor.apply(EditorCommand::Commit).unwrap(),
            CommandOutcome::Committed(session.editor.sequence())
        );
    }
}
