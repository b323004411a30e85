//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use localscan::EngineKind;
use std::path::PathBuf;

use crate::license::DEFAULT_AGENT;
use crate::output::OutputFormat;

/// Run a local security engine sidecar and scan files with it
///
/// The engine is downloaded on first use, started in the background and
/// reused by later invocations.
#[derive(Parser, Debug)]
#[command(name = "localscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine to use
    #[arg(short, long, global = true, value_enum, default_value_t = EngineArg::Asca)]
    pub engine: EngineArg,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "LOCALSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Licensed engine features, comma separated (overrides the config file)
    #[arg(long, global = true, env = "LOCALSCAN_LICENSED_FEATURES", hide_env_values = true)]
    pub licensed_features: Option<String>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a single file with the local engine
    Scan(ScanArgs),

    /// Install, inspect or stop the local engine
    Engine(EngineArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

/// Local engines selectable on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// AI secure coding assistant engine
    #[default]
    Asca,
    /// Legacy realtime engine
    Vorpal,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Asca => Self::Asca,
            EngineArg::Vorpal => Self::Vorpal,
        }
    }
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File to scan; omit to only make sure the engine is running
    #[arg(short = 's', long = "file-source", default_value = "")]
    pub file_source: String,

    /// Check for a newer engine build before scanning
    #[arg(long)]
    pub latest_version: bool,

    /// JSON file of findings to ignore
    #[arg(long)]
    pub ignored_file_path: Option<PathBuf>,

    /// Directory holding a user-managed engine executable
    #[arg(long)]
    pub location: Option<String>,

    /// Calling agent; the default agent skips the license check
    #[arg(long, default_value = DEFAULT_AGENT)]
    pub agent: String,
}

// ============================================================================
// Engine command
// ============================================================================

#[derive(Args, Debug)]
pub struct EngineArgs {
    #[command(subcommand)]
    pub command: EngineCommands,
}

#[derive(Subcommand, Debug)]
pub enum EngineCommands {
    /// Download the engine, or upgrade it if a newer build is published
    Install {
        /// Calling agent; the default agent skips the license check
        #[arg(long, default_value = DEFAULT_AGENT)]
        agent: String,
    },

    /// Show installation and health state
    Status,

    /// Ask a running engine to exit
    Stop,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set (empty clears the key)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::parse_from(["localscan", "scan", "--file-source", "app.py"]);
        assert_eq!(cli.engine, EngineArg::Asca);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.file_source, "app.py");
        assert_eq!(args.agent, DEFAULT_AGENT);
        assert!(!args.latest_version);
    }

    #[test]
    fn test_global_engine_flag() {
        let cli = Cli::parse_from(["localscan", "engine", "status", "--engine", "vorpal"]);
        assert_eq!(EngineKind::from(cli.engine), EngineKind::Vorpal);
        assert!(matches!(
            cli.command,
            Commands::Engine(EngineArgs {
                command: EngineCommands::Status
            })
        ));
    }
}
