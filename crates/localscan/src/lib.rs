//! Local security engine sidecar: install, supervise and scan.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use localscan::{EngineKind, MemoryConfigStore, ScanOrchestrator, ScanParams, StaticLicense};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> localscan::Result<()> {
//!     let mut orchestrator = ScanOrchestrator::for_profile(
//!         EngineKind::Asca.profile(),
//!         Arc::new(MemoryConfigStore::default()),
//!         Arc::new(StaticLicense::allow()),
//!     );
//!
//!     // Installs the engine on first use, starts it, then scans
//!     let outcome = orchestrator
//!         .create_scan_request(&ScanParams::new("src/app.py").update_version(true))
//!         .await?;
//!
//!     for finding in &outcome.result().scan_details {
//!         println!("{}:{} {} ({})", finding.file_name, finding.line, finding.rule_name, finding.severity);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for engine downloads (recommended)
//! - `native-tls` - Use system native TLS for engine downloads

#![doc(html_root_url = "https://docs.rs/localscan/0.3.0")]

// Re-export core types
pub use localscan_core::*;

// Re-export the gRPC client
pub use localscan_client::{ClientConfig, EngineClient, EngineClientBuilder};

// Re-export engine lifecycle
pub use localscan_engine::{
    ignored, installer, normalize_source, ArchiveInstaller, ConfigStore, Engine, InstalledState,
    LicenseChecker, MemoryConfigStore, PortAllocator, ProcessSupervisor, ScanOrchestrator,
    ScanParams, StaticLicense, SupervisorConfig,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
