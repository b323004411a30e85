//! Per-engine identity: names, health service, config key and license feature.

use crate::descriptor::{InstallationDescriptor, DEFAULT_DOWNLOAD_BASE};
use serde::{Deserialize, Serialize};

/// License feature that gates the local engines
pub const AI_PROTECTION_FEATURE: &str = "AI Protection";

/// Built-in local engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// AI secure coding assistant engine
    #[default]
    Asca,
    /// Legacy realtime engine
    Vorpal,
}

impl EngineKind {
    /// Profile with the default installation descriptor for this platform
    #[must_use]
    pub fn profile(self) -> EngineProfile {
        match self {
            Self::Asca => EngineProfile::asca(),
            Self::Vorpal => EngineProfile::vorpal(),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asca => write!(f, "asca"),
            Self::Vorpal => write!(f, "vorpal"),
        }
    }
}

impl std::str::FromStr for EngineKind {
    type Err = crate::LocalScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asca" => Ok(Self::Asca),
            "vorpal" => Ok(Self::Vorpal),
            _ => Err(crate::LocalScanError::Config(format!(
                "unknown engine: {s} (expected asca or vorpal)"
            ))),
        }
    }
}

/// Everything that distinguishes one local engine from another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    /// Which built-in engine this is
    pub kind: EngineKind,
    /// Display name (e.g. "ASCA")
    pub name: String,
    /// Service name passed to the gRPC health check
    pub health_service_name: String,
    /// Configuration key the engine port is persisted under
    pub port_config_key: String,
    /// License feature required for non-default agents
    pub license_feature: String,
    /// Download and install locations
    pub descriptor: InstallationDescriptor,
}

impl EngineProfile {
    /// The AI secure coding assistant engine
    #[must_use]
    pub fn asca() -> Self {
        Self {
            kind: EngineKind::Asca,
            name: "ASCA".to_string(),
            health_service_name: "ScanService".to_string(),
            port_config_key: "asca_port".to_string(),
            license_feature: AI_PROTECTION_FEATURE.to_string(),
            descriptor: InstallationDescriptor::for_platform(DEFAULT_DOWNLOAD_BASE, "asca", "ASCA", "ASCA"),
        }
    }

    /// The legacy realtime engine
    #[must_use]
    pub fn vorpal() -> Self {
        Self {
            kind: EngineKind::Vorpal,
            name: "Vorpal".to_string(),
            health_service_name: "VorpalEngine".to_string(),
            port_config_key: "vorpal_port".to_string(),
            license_feature: AI_PROTECTION_FEATURE.to_string(),
            descriptor: InstallationDescriptor::for_platform(
                DEFAULT_DOWNLOAD_BASE,
                "vorpal",
                "vorpal",
                "CxVorpal",
            ),
        }
    }

    /// Replace the installation descriptor
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: InstallationDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!("ASCA".parse::<EngineKind>().unwrap(), EngineKind::Asca);
        assert_eq!("vorpal".parse::<EngineKind>().unwrap(), EngineKind::Vorpal);
        assert!("sast".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_profiles_do_not_share_state() {
        let asca = EngineKind::Asca.profile();
        let vorpal = EngineKind::Vorpal.profile();
        assert_ne!(asca.port_config_key, vorpal.port_config_key);
        assert_ne!(asca.descriptor.working_dir(), vorpal.descriptor.working_dir());
        assert_eq!(asca.license_feature, vorpal.license_feature);
    }

    #[test]
    fn test_profile_knows_its_kind() {
        assert_eq!(EngineKind::Vorpal.profile().kind, EngineKind::Vorpal);
        assert_eq!(EngineKind::Asca.profile().kind.to_string(), "asca");
    }
}
