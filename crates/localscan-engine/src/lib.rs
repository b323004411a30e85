//! Lifecycle management for the localscan engine sidecar.
//!
//! The engine is an opaque executable that is downloaded on demand, started
//! as a detached process listening on a local port, and driven over gRPC.
//! This crate provides:
//!
//! - [`ArchiveInstaller`]: content-addressed install and upgrade
//! - [`PortAllocator`]: free-port discovery with persistence
//! - [`ProcessSupervisor`]: detached launch and readiness polling
//! - [`ScanOrchestrator`]: the single entry point that ties them together
//!
//! # Example
//!
//! ```rust,ignore
//! use localscan_engine::{ScanOrchestrator, ScanParams, MemoryConfigStore, StaticLicense};
//! use localscan_core::EngineKind;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> localscan_core::Result<()> {
//!     let mut orchestrator = ScanOrchestrator::for_profile(
//!         EngineKind::Asca.profile(),
//!         Arc::new(MemoryConfigStore::default()),
//!         Arc::new(StaticLicense::allow()),
//!     );
//!     let outcome = orchestrator
//!         .create_scan_request(&ScanParams::new("src/app.py"))
//!         .await?;
//!     println!("{:?}", outcome.into_result());
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/localscan-engine/0.3.0")]

pub mod ignored;
pub mod installer;
mod normalize;
mod orchestrator;
mod ports;
mod supervisor;
mod traits;

pub use installer::{ArchiveInstaller, InstalledState};
pub use normalize::normalize_source;
pub use orchestrator::{ScanOrchestrator, ScanParams};
pub use ports::PortAllocator;
pub use supervisor::{ProcessSupervisor, SupervisorConfig};
pub use traits::{ConfigStore, Engine, LicenseChecker, MemoryConfigStore, StaticLicense};

pub use localscan_core::{LocalScanError, Result};
