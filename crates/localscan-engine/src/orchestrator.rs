//! Scan orchestration: install gate, health gate, input validation, scan.

use crate::ignored::{filter_ignored, load_ignored};
use crate::installer::{ArchiveInstaller, InstalledState};
use crate::normalize::normalize_source;
use crate::ports::PortAllocator;
use crate::supervisor::ProcessSupervisor;
use crate::traits::{ConfigStore, Engine, LicenseChecker};
use localscan_client::EngineClient;
use localscan_core::{EngineProfile, LocalScanError, Result, ScanOutcome, ScanResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to scan and how
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanParams {
    /// File to scan; empty means only bring the engine up
    pub file_path: String,
    /// Check for and install a newer engine build first
    pub update_version: bool,
    /// The caller is the default agent, which skips the license check
    pub is_default_agent: bool,
    /// JSON file listing findings to drop from the result
    pub ignored_file_path: Option<PathBuf>,
}

impl ScanParams {
    /// Scan `file_path`
    #[must_use]
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Request an engine upgrade check
    #[must_use]
    pub const fn update_version(mut self, update: bool) -> Self {
        self.update_version = update;
        self
    }

    /// Mark the caller as the default agent
    #[must_use]
    pub const fn default_agent(mut self, is_default: bool) -> Self {
        self.is_default_agent = is_default;
        self
    }

    /// Drop findings listed in `path`
    #[must_use]
    pub fn ignored_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignored_file_path = Some(path.into());
        self
    }
}

/// Drives one engine from "maybe not installed" to a scan result
pub struct ScanOrchestrator<E = EngineClient> {
    profile: EngineProfile,
    engine: E,
    installer: ArchiveInstaller,
    supervisor: ProcessSupervisor,
    ports: PortAllocator,
    license: Arc<dyn LicenseChecker>,
}

impl ScanOrchestrator<EngineClient> {
    /// Orchestrator for `profile` talking to the engine over gRPC on the
    /// port persisted in `config`, if any
    pub fn for_profile(
        profile: EngineProfile,
        config: Arc<dyn ConfigStore>,
        license: Arc<dyn LicenseChecker>,
    ) -> Self {
        let ports = PortAllocator::new(config.clone(), profile.port_config_key.clone());
        let client = EngineClient::new(&profile, ports.configured_port().unwrap_or(0));
        Self::new(profile, client, config, license)
    }
}

impl<E: Engine> ScanOrchestrator<E> {
    /// Orchestrator driving `engine`
    pub fn new(
        profile: EngineProfile,
        engine: E,
        config: Arc<dyn ConfigStore>,
        license: Arc<dyn LicenseChecker>,
    ) -> Self {
        let ports = PortAllocator::new(config, profile.port_config_key.clone());
        Self {
            profile,
            engine,
            installer: ArchiveInstaller::new(),
            supervisor: ProcessSupervisor::default(),
            ports,
            license,
        }
    }

    /// Replace the installer
    #[must_use]
    pub fn with_installer(mut self, installer: ArchiveInstaller) -> Self {
        self.installer = installer;
        self
    }

    /// Replace the process supervisor
    #[must_use]
    pub fn with_supervisor(mut self, supervisor: ProcessSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Engine being driven
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Engine profile
    pub const fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    /// Install if needed, make sure the engine runs, then scan
    /// `params.file_path`.
    ///
    /// A missing or empty path is reported in the returned outcome, not as
    /// an error.
    pub async fn create_scan_request(&mut self, params: &ScanParams) -> Result<ScanOutcome> {
        self.ensure_installed(params).await?;
        self.ensure_running(params.is_default_agent).await?;

        if let Some(outcome) = self.validate_file_path(&params.file_path).await {
            return Ok(outcome);
        }

        let mut result = self.execute_scan(&params.file_path).await?;
        if let Some(ignored_path) = &params.ignored_file_path {
            let ignored = load_ignored(ignored_path).await?;
            filter_ignored(&mut result, &ignored);
        }

        Ok(ScanOutcome::Scanned(result))
    }

    /// Install the engine when it is missing, or upgrade it when asked.
    ///
    /// Returns true if a new build was installed. A running engine is shut
    /// down after an upgrade so the next health gate restarts it.
    pub async fn ensure_installed(&self, params: &ScanParams) -> Result<bool> {
        let descriptor = &self.profile.descriptor;
        if descriptor.is_user_managed() {
            debug!(engine = %self.profile.name, "using user managed engine executable");
            return Ok(false);
        }

        let installed = tokio::fs::metadata(descriptor.executable_file_path()).await.is_ok();
        if installed && !params.update_version {
            return Ok(false);
        }

        if let Err(e) = self.check_license(params.is_default_agent).await {
            self.shutdown_quietly().await;
            return Err(e);
        }

        let upgraded = self.installer.install_or_upgrade(descriptor).await?;
        if upgraded {
            info!(engine = %self.profile.name, "engine installed, restarting any running instance");
            self.shutdown_quietly().await;
        }
        Ok(upgraded)
    }

    /// Make sure an engine answers health checks, starting one if needed
    pub async fn ensure_running(&mut self, is_default_agent: bool) -> Result<()> {
        match self.engine.health_check().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() => {
                debug!(engine = %self.profile.name, error = %e, "engine is not running");
            }
            Err(e) => warn!(engine = %self.profile.name, error = %e, "engine port answered but failed the health check"),
        }

        if let Err(e) = self.check_license(is_default_agent).await {
            self.shutdown_quietly().await;
            return Err(e);
        }

        let port = self.ports.find_port()?;
        self.engine.configure_port(port);

        let executable = self.profile.descriptor.executable_file_path();
        self.supervisor.launch(&executable, port).await?;
        self.engine.health_check().await
    }

    /// Installation state of the engine binary
    pub async fn installed_state(&self) -> Result<InstalledState> {
        self.installer.installed_state(&self.profile.descriptor).await
    }

    /// Stop a running engine
    pub async fn shutdown(&self) -> Result<()> {
        self.engine.shutdown().await
    }

    async fn check_license(&self, is_default_agent: bool) -> Result<()> {
        if is_default_agent {
            return Ok(());
        }

        let feature = &self.profile.license_feature;
        let allowed = self
            .license
            .is_allowed_engine(feature)
            .await
            .map_err(|e| match e {
                LocalScanError::License(_) | LocalScanError::LicenseDenied { .. } => e,
                other => LocalScanError::License(format!(
                    "checking {feature} for the {} engine: {other}",
                    self.profile.name
                )),
            })?;
        if allowed {
            Ok(())
        } else {
            warn!(engine = %self.profile.name, feature = %feature, "engine is not licensed");
            Err(LocalScanError::LicenseDenied {
                engine: self.profile.name.clone(),
                feature: feature.clone(),
            })
        }
    }

    async fn shutdown_quietly(&self) {
        if let Err(e) = self.engine.shutdown().await {
            debug!(engine = %self.profile.name, error = %e, "shutdown of running engine failed");
        }
    }

    async fn validate_file_path(&self, file_path: &str) -> Option<ScanOutcome> {
        if file_path.is_empty() {
            let result = ScanResult::not_provided(self.profile.kind);
            debug!("{}", result.message);
            return Some(ScanOutcome::NothingToScan(result));
        }

        if tokio::fs::metadata(file_path).await.is_err() {
            debug!(file = file_path, "file not found");
            return Some(ScanOutcome::FileNotFound(ScanResult::file_not_found(file_path)));
        }

        None
    }

    async fn execute_scan(&self, file_path: &str) -> Result<ScanResult> {
        let path = Path::new(file_path);
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LocalScanError::io(path, e))?;
        let file_name = path
            .file_name()
            .map_or_else(|| file_path.to_string(), |name| name.to_string_lossy().into_owned());

        debug!(engine = %self.profile.name, file = %file_name, "scanning file");
        self.engine.scan(&file_name, &normalize_source(&source)).await
    }
}
