//! Inbound OIDC form commands.
//!
//! ```bash
//! idconsole oidc check -f inbound.json --metadata oidc-meta.json --template single-page-application
//! ```

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use console_common::ConsoleConfig;
use console_oidc::{
    Certificate, CredentialAction, FieldIssue, GrantTypeOption, InboundOidcConfig,
    InboundOidcForm, OidcField, OidcFormError, OidcFormValues, OidcMetadata, OidcResult,
    SubmissionPayload, SubmitOutcome,
};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::helpers::{load_document, print_json};
use crate::styled_output::{
    MessageType, print_error, print_info, print_success, print_warning, styled_label,
};

#[derive(Debug, Parser)]
#[command(name = "oidc", about = "Inbound OIDC settings of an application")]
pub struct OidcCli {
    #[command(subcommand)]
    pub command: OidcCommands,
}

#[derive(Debug, Subcommand)]
pub enum OidcCommands {
    /// Validate edited settings and show what saving would send.
    #[command(visible_alias = "validate")]
    Check(OidcCheckArgs),
}

#[derive(Debug, Parser)]
pub struct OidcCheckArgs {
    /// The application's current inbound OIDC configuration (JSON or YAML).
    #[arg(short = 'f', long = "file", required = true)]
    pub file: PathBuf,

    /// Protocol metadata served by the server. Built-in defaults otherwise.
    #[arg(long = "metadata")]
    pub metadata: Option<PathBuf>,

    /// Template the application was created from.
    #[arg(long = "template")]
    pub template: Option<String>,

    /// Edited form values. The form's initial values otherwise.
    #[arg(long = "values")]
    pub values: Option<PathBuf>,

    /// The application's signing certificate.
    #[arg(long = "certificate")]
    pub certificate: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// What saving the form would do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeReport {
    Submitted {
        payload: SubmissionPayload,
    },
    NeedsConfirmation {
        fields: Vec<OidcField>,
        payload: SubmissionPayload,
    },
    MissingCallbackUrl,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OidcCheckReport {
    pub grant_types: Vec<GrantTypeOption>,
    pub credential_actions: Vec<CredentialAction>,
    pub warnings: Vec<FieldIssue>,
    pub errors: Vec<FieldIssue>,
    pub outcome: OutcomeReport,
}

/// Validate `values` and run the submission.
pub fn check_form(form: &InboundOidcForm, values: &OidcFormValues) -> OidcResult<OidcCheckReport> {
    let validation = form.validate(values);
    let outcome = match form.submit(values) {
        Ok(SubmitOutcome::Submitted(payload)) => OutcomeReport::Submitted { payload },
        Ok(SubmitOutcome::NeedsConfirmation { fields, payload }) => {
            OutcomeReport::NeedsConfirmation { fields, payload }
        }
        Ok(SubmitOutcome::MissingCallbackUrl) => OutcomeReport::MissingCallbackUrl,
        Err(OidcFormError::Invalid(_)) => OutcomeReport::Invalid,
        Err(err) => return Err(err),
    };

    Ok(OidcCheckReport {
        grant_types: form.grant_type_options(),
        credential_actions: form.credential_actions(),
        warnings: validation.warnings,
        errors: validation.errors,
        outcome,
    })
}

impl OidcCli {
    pub async fn run(self, config: &ConsoleConfig) -> Result<()> {
        match self.command {
            OidcCommands::Check(args) => run_check(args, config).await,
        }
    }
}

async fn run_check(args: OidcCheckArgs, config: &ConsoleConfig) -> Result<()> {
    let initial: InboundOidcConfig = load_document(&args.file)?;
    let metadata = match &args.metadata {
        Some(path) => load_document::<OidcMetadata>(path)?,
        None => OidcMetadata::default(),
    };

    let mut form = InboundOidcForm::new(initial, metadata, config.oidc.clone());
    if let Some(template) = &args.template {
        form = form.with_template(template.as_str());
    }
    if let Some(path) = &args.certificate {
        form = form.with_certificate(load_document::<Certificate>(path)?);
    }

    let values = match &args.values {
        Some(path) => load_document::<OidcFormValues>(path)?,
        None => form.initial_values(),
    };

    let report = check_form(&form, &values)?;
    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report, &values)?,
    }

    match report.outcome {
        OutcomeReport::Invalid => Err(OidcFormError::Invalid(report.errors).into()),
        OutcomeReport::MissingCallbackUrl => {
            bail!("A callback URL is required for the selected grant types")
        }
        OutcomeReport::Submitted { .. } | OutcomeReport::NeedsConfirmation { .. } => Ok(()),
    }
}

fn print_report(report: &OidcCheckReport, values: &OidcFormValues) -> Result<()> {
    eprintln!("Allowed grant types:");
    for grant in &report.grant_types {
        let selected = values.grant_types.contains(&grant.name);
        let mark = if selected {
            styled_label(MessageType::Success, "[x]")
        } else {
            "[ ]".to_string()
        };
        match &grant.hint {
            Some(hint) if selected => eprintln!("  {} {} ({})", mark, grant.label, hint),
            _ => eprintln!("  {} {}", mark, grant.label),
        }
    }

    if !report.credential_actions.is_empty() {
        let actions: Vec<String> = report
            .credential_actions
            .iter()
            .map(|action| format!("{:?}", action))
            .collect();
        print_info(&format!("Credential actions: {}", actions.join(", ")));
    }

    for warning in &report.warnings {
        print_warning(&warning.to_string());
    }
    for error in &report.errors {
        print_error(&error.to_string());
    }

    match &report.outcome {
        OutcomeReport::Submitted { payload } => {
            print_success("Settings are ready to submit");
            print_json(payload)?;
        }
        OutcomeReport::NeedsConfirmation { fields, payload } => {
            let labels: Vec<&str> = fields.iter().map(OidcField::label).collect();
            print_warning(&format!(
                "Low expiry times need confirmation: {}",
                labels.join(", ")
            ));
            print_json(payload)?;
        }
        OutcomeReport::MissingCallbackUrl => {
            print_error("The selected grant types need at least one callback URL");
        }
        OutcomeReport::Invalid => {}
    }
    Ok(())
}
