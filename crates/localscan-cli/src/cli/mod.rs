//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, FileConfigStore};
use crate::license::FeatureLicense;
use crate::output::OutputFormat;
use std::sync::Arc;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let store = Arc::new(FileConfigStore::open(config_path)?);

    // Licensed features from CLI/env, else config
    let license = cli.licensed_features.as_deref().map_or_else(
        || FeatureLicense::new(store.snapshot().licensed_features),
        FeatureLicense::from_list,
    );

    // Determine output format
    let output_format = cli
        .output
        .or(store.snapshot().output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Create context for commands
    let ctx = commands::Context {
        engine: cli.engine.into(),
        output_format,
        verbose: cli.verbose,
        store,
        license: Arc::new(license),
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(ctx, args).await,
        Commands::Engine(args) => commands::engine::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Log to stderr so JSON on stdout stays clean; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
