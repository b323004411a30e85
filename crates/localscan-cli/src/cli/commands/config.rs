//! `localscan config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{Config, KEYS};
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(&ctx, &key, &value),
        ConfigCommands::Path => show_path(&ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.store.snapshot();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();
            for (key, _) in KEYS {
                let value = config
                    .get(key)
                    .unwrap_or_else(|| "(not set)".dimmed().to_string());
                println!("  {} {}", format!("{key}:").bold(), value);
            }
        }
    }

    Ok(())
}

fn set_config(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = ctx.store.path();
    let mut config = Config::load(path)?;
    config.set(key, value)?;
    config.save(path)?;

    if value.trim().is_empty() {
        println!("{} {} cleared.", "Success:".green().bold(), key);
    } else {
        println!("{} {} set to {}.", "Success:".green().bold(), key, value.trim().cyan());
    }
    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.store.path().display());
    Ok(())
}
