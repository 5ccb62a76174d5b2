//! Tests for the idconsole command layer.

use clap::Parser;
use console_cli::cli::{Cli, Commands, OutputFormat};
use console_cli::flow_cmd::{FlowCommands, apply_script, check_sequence};
use console_cli::helpers::load_document;
use console_cli::login_cmd::LoginCommands;
use console_common::{AlertLevel, ConsoleConfig};
use console_flow::{
    AuthenticationSequence, AuthenticatorDescriptor, EditorCommand, FactorPolicy, StaticCatalog,
};

fn catalog() -> StaticCatalog {
    StaticCatalog::new(
        vec![
            AuthenticatorDescriptor::local("QmFzaWM", "BasicAuthenticator"),
            AuthenticatorDescriptor::local("dG90cA", "totp"),
            AuthenticatorDescriptor::local("SWRlbnRpZmllcg", "IdentifierExecutor"),
        ],
        vec![AuthenticatorDescriptor::federated(
            "R29vZ2xl",
            "Google",
            "GoogleOIDCAuthenticator",
        )],
    )
}

fn sequence(json: serde_json::Value) -> AuthenticationSequence {
    serde_json::from_value(json).unwrap()
}

// ============================================================================
// ARGUMENT PARSING
// ============================================================================

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flow_apply_args() {
        let cli = Cli::try_parse_from([
            "idconsole",
            "flow",
            "apply",
            "-f",
            "sequence.json",
            "--catalog",
            "catalog.json",
            "--script",
            "ops.yaml",
            "--commit",
            "--format",
            "json",
        ])
        .unwrap();

        let Commands::Flow(flow) = cli.command else {
            panic!("expected flow command");
        };
        let FlowCommands::Apply(args) = flow.command else {
            panic!("expected apply");
        };
        assert!(args.commit);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.catalog.unwrap().to_str(), Some("catalog.json"));
    }

    #[test]
    fn test_catalog_and_server_conflict() {
        let result = Cli::try_parse_from([
            "idconsole",
            "flow",
            "apply",
            "--script",
            "ops.yaml",
            "--catalog",
            "catalog.json",
            "--server",
            "https://localhost:9443/api/server/v1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_url_positionals() {
        let cli = Cli::try_parse_from([
            "idconsole",
            "login",
            "resolve-url",
            "https://is.test/oauth2/authorize?a=1",
            "https://proxy.test/authorize",
        ])
        .unwrap();

        let Commands::Login(login) = cli.command else {
            panic!("expected login command");
        };
        let LoginCommands::ResolveUrl(args) = login.command else {
            panic!("expected resolve-url");
        };
        assert_eq!(args.original, "https://is.test/oauth2/authorize?a=1");
        assert_eq!(args.overridden, "https://proxy.test/authorize");
    }

    #[test]
    fn test_check_alias() {
        let cli =
            Cli::try_parse_from(["idconsole", "flow", "validate", "-f", "sequence.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Flow(_)));
    }
}

// ============================================================================
// FLOW CHECK
// ============================================================================

mod flow_check {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_sequence() {
        let sequence = sequence(serde_json::json!({
            "steps": [
                {"id": 1, "options": [{"authenticator": "BasicAuthenticator", "idp": "LOCAL"}]},
                {"id": 2, "options": [{"authenticator": "totp", "idp": "LOCAL"}]}
            ],
            "subjectStepId": 1,
            "attributeStepId": 1
        }));

        let report = check_sequence(&sequence, &FactorPolicy::default());
        assert!(report.is_valid(), "{:?}", report.issues);
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_every_problem_reported() {
        let sequence = sequence(serde_json::json!({
            "steps": [
                {"id": 1, "options": [{"authenticator": "totp", "idp": "LOCAL"}]},
                {"id": 3, "options": []}
            ],
            "subjectStepId": 2,
            "attributeStepId": 1
        }));

        let report = check_sequence(&sequence, &FactorPolicy::default());
        assert_eq!(
            report.issues,
            vec![
                "step ids must run 1..2 in order, found [1, 3]".to_string(),
                "subject step 2 or attribute step 1 does not exist".to_string(),
                "step 3 has no authenticators".to_string(),
                "step 1: second factor 'totp' needs a first factor in an earlier step"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_loaded_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequence.yaml");
        std::fs::write(
            &path,
            "steps:\n  - id: 1\n    options:\n      - authenticator: BasicAuthenticator\n        idp: LOCAL\n",
        )
        .unwrap();

        let sequence: AuthenticationSequence = load_document(&path).unwrap();
        assert_eq!(sequence.subject_step_id, 1);
        assert!(check_sequence(&sequence, &FactorPolicy::default()).is_valid());
    }
}

// ============================================================================
// FLOW APPLY
// ============================================================================

mod flow_apply {
    use super::*;
    use pretty_assertions::assert_eq;

    fn script(yaml: &str) -> Vec<EditorCommand> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[tokio::test]
    async fn test_script_builds_two_factor_flow() {
        let commands = script(
            r#"
- op: add_option
  step: 0
  authenticator: QmFzaWM
- op: add_step
- op: drop
  draggable_id: dG90cA
  droppable_id: authentication-step-1
"#,
        );

        let report = apply_script(
            AuthenticationSequence::default(),
            &ConsoleConfig::default(),
            &catalog(),
            commands,
            true,
        )
        .await;

        let results: Vec<&str> = report.commands.iter().map(|c| c.result.as_str()).collect();
        assert_eq!(
            results,
            vec![
                "authenticator added",
                "added step 2",
                "authenticator added",
                "committed 2 step(s)",
            ]
        );
        assert_eq!(report.rejected(), 0);

        let committed = report.committed.unwrap();
        assert_eq!(committed.steps[1].options[0].authenticator, "totp");
        assert_eq!(committed, report.sequence);
    }

    #[tokio::test]
    async fn test_rejections_reported_and_script_continues() {
        let commands = script(
            r#"
- op: add_option
  step: 0
  authenticator: dG90cA
- op: remove_step
  index: 0
- op: add_option
  step: 0
  authenticator: R29vZ2xl
"#,
        );

        let report = apply_script(
            AuthenticationSequence::default(),
            &ConsoleConfig::default(),
            &catalog(),
            commands,
            false,
        )
        .await;

        assert_eq!(report.rejected(), 2);
        assert!(report.commands[0].rejected);
        assert_eq!(report.commands[0].op, "add_option");
        assert!(report.commands[0].result.starts_with("Cannot add second factor"));
        assert_eq!(report.commands[1].op, "remove_step");
        assert!(!report.commands[2].rejected);
        assert_eq!(
            report.sequence.steps[0].options[0].authenticator,
            "GoogleOIDCAuthenticator"
        );

        assert_eq!(report.alerts.len(), 2);
        assert!(report.alerts.iter().all(|alert| alert.level == AlertLevel::Warning));
        assert!(report.committed.is_none());
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_nothing_committed() {
        let report = apply_script(
            AuthenticationSequence::default(),
            &ConsoleConfig::default(),
            &catalog(),
            Vec::new(),
            true,
        )
        .await;

        assert_eq!(report.commands.len(), 1);
        assert!(report.commands[0].rejected);
        assert_eq!(report.commands[0].op, "commit");
        assert!(report.committed.is_none());
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let report = apply_script(
            AuthenticationSequence::default(),
            &ConsoleConfig::default(),
            &catalog(),
            vec![EditorCommand::Validate],
            false,
        )
        .await;

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["commands"][0]["op"], "validate");
        assert_eq!(value["commands"][0]["result"], "sequence is invalid");
        assert_eq!(value["sequence"]["steps"][0]["id"], 1);
        assert!(value["committed"].is_null());
    }
}
