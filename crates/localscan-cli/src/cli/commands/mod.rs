//! Command implementations.

pub mod config;
pub mod engine;
pub mod scan;

use localscan::{EngineKind, EngineProfile, LicenseChecker, ScanOrchestrator};
use std::sync::Arc;

use crate::config::FileConfigStore;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Clone)]
pub struct Context {
    /// Engine selected with `--engine`
    pub engine: EngineKind,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// Persistent configuration
    pub store: Arc<FileConfigStore>,

    /// License collaborator for non-default agents
    pub license: Arc<dyn LicenseChecker>,
}

impl Context {
    /// Engine profile with install locations taken from the configuration.
    ///
    /// A persisted `asca_location` takes precedence over `location` (from
    /// `--location`); a blank flag is rejected either way.
    pub fn profile(&self, location: Option<&str>) -> anyhow::Result<EngineProfile> {
        let config = self.store.snapshot();
        let mut profile = self.engine.profile();
        let mut descriptor = profile.descriptor.clone();

        if let Some(base_dir) = &config.base_dir {
            descriptor = descriptor.with_base_dir(base_dir);
        }

        if location.is_some_and(|flag| flag.trim().is_empty()) {
            anyhow::bail!("--location flag is provided but empty");
        }

        let persisted = config
            .asca_location
            .filter(|_| self.engine == EngineKind::Asca)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        let location = persisted.or_else(|| location.map(|flag| flag.trim().to_string()));
        if let Some(dir) = location {
            descriptor = descriptor.with_custom_executable_dir(dir);
        }

        profile = profile.with_descriptor(descriptor);
        Ok(profile)
    }

    /// Orchestrator for the selected engine.
    pub fn orchestrator(&self, location: Option<&str>) -> anyhow::Result<ScanOrchestrator> {
        Ok(ScanOrchestrator::for_profile(
            self.profile(location)?,
            self.store.clone(),
            self.license.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::FeatureLicense;
    use localscan::ConfigStore;
    use std::path::Path;

    fn context(dir: &Path, engine: EngineKind) -> Context {
        Context {
            engine,
            output_format: OutputFormat::Json,
            verbose: false,
            store: Arc::new(FileConfigStore::open(dir.join("config.toml")).unwrap()),
            license: Arc::new(FeatureLicense::default()),
        }
    }

    #[test]
    fn test_profile_uses_config_locations() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), EngineKind::Asca);
        ctx.store.set("base_dir", &dir.path().display().to_string()).unwrap();
        ctx.store.set("asca_location", "/opt/asca").unwrap();

        let profile = ctx.profile(None).unwrap();
        assert!(profile.descriptor.is_user_managed());
        assert!(profile.descriptor.executable_file_path().starts_with("/opt/asca"));
        assert_eq!(profile.descriptor.working_dir(), dir.path().join("ASCA"));
    }

    #[test]
    fn test_persisted_location_wins_over_flag() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), EngineKind::Asca);
        ctx.store.set("asca_location", "/opt/asca").unwrap();

        let profile = ctx.profile(Some("/srv/engines")).unwrap();
        assert!(profile.descriptor.executable_file_path().starts_with("/opt/asca"));
        assert!(ctx.profile(Some("  ")).is_err());
    }

    #[test]
    fn test_location_flag_used_without_persisted_location() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), EngineKind::Asca);

        let profile = ctx.profile(Some(" /srv/engines ")).unwrap();
        assert!(profile.descriptor.is_user_managed());
        assert!(profile.descriptor.executable_file_path().starts_with("/srv/engines"));
    }

    #[test]
    fn test_asca_location_ignored_for_vorpal() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), EngineKind::Vorpal);
        ctx.store.set("asca_location", "/opt/asca").unwrap();

        assert!(!ctx.profile(None).unwrap().descriptor.is_user_managed());
    }
}
