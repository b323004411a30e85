//! `localscan engine` - Install, inspect and stop the local engine.

use anyhow::Result;
use colored::Colorize;
use localscan::{InstalledState, ScanParams};
use serde_json::json;

use super::Context;
use crate::cli::args::{EngineArgs, EngineCommands};
use crate::license::DEFAULT_AGENT;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: EngineArgs) -> Result<()> {
    match args.command {
        EngineCommands::Install { agent } => install(ctx, &agent).await,
        EngineCommands::Status => status(ctx).await,
        EngineCommands::Stop => stop(ctx).await,
    }
}

async fn install(ctx: Context, agent: &str) -> Result<()> {
    let orchestrator = ctx.orchestrator(None)?;
    let params = ScanParams::default()
        .update_version(true)
        .default_agent(agent == DEFAULT_AGENT);

    let upgraded = orchestrator.ensure_installed(&params).await?;
    let executable = orchestrator.profile().descriptor.executable_file_path();

    match ctx.output_format {
        OutputFormat::Json => {
            let report = json!({
                "engine": orchestrator.profile().name,
                "installed": upgraded,
                "executable": executable.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => {
            if upgraded {
                println!(
                    "{} {} installed at {}",
                    "Success:".green().bold(),
                    orchestrator.profile().name,
                    executable.display()
                );
            } else {
                println!("{} {} is up to date.", "Info:".cyan().bold(), orchestrator.profile().name);
            }
        }
    }

    Ok(())
}

async fn status(ctx: Context) -> Result<()> {
    let orchestrator = ctx.orchestrator(None)?;
    let profile = orchestrator.profile();

    let installed = match orchestrator.installed_state().await {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine installation state");
            None
        }
    };
    let health = orchestrator.engine().health_check().await;
    let port = orchestrator.engine().port();

    match ctx.output_format {
        OutputFormat::Json => {
            let report = json!({
                "engine": profile.name,
                "executable": profile.descriptor.executable_file_path().display().to_string(),
                "user_managed": profile.descriptor.is_user_managed(),
                "installed": installed.map(|s| s.to_string()),
                "port": (port != 0).then_some(port),
                "healthy": health.is_ok(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => {
            println!("{} {}", "Engine:".bold(), profile.name.cyan().bold());
            println!();
            println!(
                "  {} {}",
                "Executable:".bold(),
                profile.descriptor.executable_file_path().display()
            );
            let installed_display = match installed {
                Some(InstalledState::PresentCurrent) => "up to date".green().to_string(),
                Some(InstalledState::PresentStale) => "outdated".yellow().to_string(),
                Some(InstalledState::Absent) => "not installed".red().to_string(),
                None => "unknown".dimmed().to_string(),
            };
            println!("  {} {}", "Installed:".bold(), installed_display);
            let port_display = if port == 0 {
                "(not set)".dimmed().to_string()
            } else {
                port.to_string()
            };
            println!("  {} {}", "Port:".bold(), port_display);
            match &health {
                Ok(()) => println!("  {} {}", "Health:".bold(), "serving".green()),
                Err(e) if ctx.verbose => println!("  {} {} ({e})", "Health:".bold(), "not running".red()),
                Err(_) => println!("  {} {}", "Health:".bold(), "not running".red()),
            }
        }
    }

    Ok(())
}

async fn stop(ctx: Context) -> Result<()> {
    let orchestrator = ctx.orchestrator(None)?;
    let name = orchestrator.profile().name.clone();

    if orchestrator.engine().health_check().await.is_err() {
        println!("{} {name} is not running.", "Info:".cyan().bold());
        return Ok(());
    }

    orchestrator.shutdown().await?;
    println!("{} {name} stopped.", "Success:".green().bold());
    Ok(())
}
