//! Flow command implementations.

use anyhow::{Context, Result, bail};
use console_common::ConsoleConfig;
use console_flow::{
    AuthenticationSequence, AuthenticatorCatalog, EditorCommand, FactorPolicy,
    HttpAuthenticatorCatalog, StaticCatalog,
};

use super::args::{FlowApplyArgs, FlowCheckArgs};
use super::report::{FlowApplyReport, FlowCheckReport, apply_script, check_sequence};
use crate::cli::OutputFormat;
use crate::helpers::{load_document, print_json};
use crate::styled_output::{
    format_alert, format_error, format_success, format_warning, print_error, print_info,
    print_success,
};

pub async fn run_check(args: FlowCheckArgs, config: &ConsoleConfig) -> Result<()> {
    let sequence: AuthenticationSequence = load_document(&args.file)?;
    let report = check_sequence(&sequence, &FactorPolicy::from(&config.authenticators));

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_check_report(&report),
    }

    if !report.is_valid() {
        bail!("{} problem(s) found in {}", report.issues.len(), args.file.display());
    }
    Ok(())
}

fn print_check_report(report: &FlowCheckReport) {
    if report.is_valid() {
        print_success(&format!("Sequence is valid ({} steps)", report.steps));
        return;
    }
    for issue in &report.issues {
        print_error(issue);
    }
}

pub async fn run_apply(args: FlowApplyArgs, config: &ConsoleConfig) -> Result<()> {
    let sequence = match &args.file {
        Some(path) => load_document(path)?,
        None => AuthenticationSequence::default(),
    };
    let script: Vec<EditorCommand> =
        load_document(&args.script).context("Invalid editor command script")?;

    let catalog: Box<dyn AuthenticatorCatalog> = match (&args.catalog, &args.server) {
        (Some(path), _) => Box::new(load_document::<StaticCatalog>(path)?),
        (None, Some(server)) => {
            let mut catalog = HttpAuthenticatorCatalog::new(server.as_str());
            if let Some(token) = &args.token {
                catalog = catalog.with_bearer_token(token.as_str());
            }
            Box::new(catalog)
        }
        (None, None) => {
            print_info("No catalog given; authenticators cannot be added");
            Box::new(StaticCatalog::default())
        }
    };

    let report = apply_script(sequence, config, catalog.as_ref(), script, args.commit).await;

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_apply_report(&report)?,
    }

    if let Some(path) = &args.output {
        let result = report.committed.as_ref().unwrap_or(&report.sequence);
        std::fs::write(path, result.to_json_pretty()?)
            .with_context(|| format!("Failed to write sequence: {}", path.display()))?;
        print_info(&format!("Sequence written to {}", path.display()));
    }

    if args.commit && report.committed.is_none() {
        bail!("The sequence could not be committed");
    }
    Ok(())
}

fn print_apply_report(report: &FlowApplyReport) -> Result<()> {
    for command in &report.commands {
        let line = format!("{:>3}. {}: {}", command.index, command.op, command.result);
        if command.rejected {
            eprintln!("{}", format_warning(&line));
        } else {
            eprintln!("{}", format_success(&line));
        }
    }
    for alert in &report.alerts {
        eprintln!("{}", format_alert(alert));
    }
    if report.rejected() > 0 {
        eprintln!(
            "{}",
            format_error(&format!("{} command(s) rejected", report.rejected()))
        );
    }

    println!("{}", report.sequence.to_json_pretty()?);
    Ok(())
}
