//! Core types and errors for the localscan engine sidecar.
//!
//! This crate provides the foundational types shared by the localscan crates:
//!
//! - **Types**: The scan result model returned by the engine ([`ScanResult`], [`ScanOutcome`])
//! - **Descriptors**: Where an engine is downloaded from and installed to ([`InstallationDescriptor`])
//! - **Profiles**: Per-engine naming, health service and license feature ([`EngineProfile`])
//! - **Errors**: Operational failures with [`LocalScanError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use localscan_core::{ScanOutcome, Result};
//!
//! fn report(outcome: ScanOutcome) -> Result<()> {
//!     let result = outcome.into_result();
//!     println!("{} findings", result.scan_details.len());
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/localscan-core/0.3.0")]

mod descriptor;
mod error;
mod profile;
pub mod types;

pub use descriptor::{ArchiveFormat, InstallationDescriptor, DEFAULT_DOWNLOAD_BASE};
pub use error::{LocalScanError, Result};
pub use profile::{EngineKind, EngineProfile, AI_PROTECTION_FEATURE};
pub use types::*;
