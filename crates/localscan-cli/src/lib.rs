//! # localscan-cli
//!
//! Command-line interface for the localscan engine sidecar.
//!
//! ## Features
//!
//! - **Scanning**: scan a single file with the ASCA or Vorpal engine
//! - **Engine lifecycle**: install, upgrade, inspect and stop the sidecar
//! - **Persistent configuration**: engine ports and locations in a TOML file
//! - **Multiple output formats**: Pretty text or JSON

pub mod cli;
pub mod config;
pub mod license;
pub mod output;

pub use cli::run;
