//! `localscan scan` - Scan a single file with the local engine.

use anyhow::Result;
use colored::Colorize;
use localscan::{ScanOutcome, ScanParams, ScanResult};

use super::Context;
use crate::cli::args::ScanArgs;
use crate::license::DEFAULT_AGENT;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ScanArgs) -> Result<()> {
    let mut orchestrator = ctx.orchestrator(args.location.as_deref())?;

    let mut params = ScanParams::new(args.file_source)
        .update_version(args.latest_version)
        .default_agent(args.agent == DEFAULT_AGENT);
    if let Some(path) = args.ignored_file_path {
        params = params.ignored_file(path);
    }

    let outcome = orchestrator.create_scan_request(&params).await?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome.result())?);
        }
        OutputFormat::Pretty => print_outcome_pretty(&outcome),
    }

    Ok(())
}

fn print_outcome_pretty(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::NothingToScan(result) => {
            println!("{} {}", "Engine:".bold(), result.message);
        }
        ScanOutcome::FileNotFound(result) => {
            if let Some(error) = &result.error {
                println!("{} {}", "Error:".red().bold(), error.description);
            }
        }
        ScanOutcome::Scanned(result) => print_result_pretty(result),
    }
}

fn print_result_pretty(result: &ScanResult) {
    if let Some(error) = &result.error {
        println!("{} {} ({})", "Engine error:".red().bold(), error.description, error.code);
        return;
    }

    if result.scan_details.is_empty() {
        println!("{}", "No findings.".green());
        return;
    }

    println!(
        "{} {} ({} high, {} medium, {} low)",
        "Findings:".bold(),
        result.scan_details.len().to_string().cyan(),
        result.count_severity("high"),
        result.count_severity("medium"),
        result.count_severity("low"),
    );
    println!();

    for detail in &result.scan_details {
        println!(
            "  {} {}:{} {}",
            severity_label(&detail.severity),
            detail.file_name,
            detail.line,
            detail.rule_name.bold()
        );
        if !detail.problematic_line.is_empty() {
            println!("      {}", detail.problematic_line.trim().dimmed());
        }
        if !detail.remediation.is_empty() {
            println!("      {} {}", "Fix:".bold(), detail.remediation);
        }
    }

    if !result.request_id.is_empty() {
        println!();
        println!("{} {}", "Request:".dimmed(), result.request_id.dimmed());
    }
}

fn severity_label(severity: &str) -> colored::ColoredString {
    let label = format!("[{severity}]");
    match severity.to_ascii_lowercase().as_str() {
        "critical" | "high" => label.red().bold(),
        "medium" => label.yellow().bold(),
        "low" => label.blue(),
        _ => label.normal(),
    }
}
