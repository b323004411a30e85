//! Seams to the outside world: configuration, licensing and the engine itself.

use async_trait::async_trait;
use localscan_client::EngineClient;
use localscan_core::{Result, ScanResult};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key/value store for settings that outlive one invocation (engine ports,
/// custom engine locations).
pub trait ConfigStore: Send + Sync {
    /// Current value of `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory [`ConfigStore`]; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryConfigStore {
    /// Store pre-populated with `values`
    #[must_use]
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Answers whether the current user may run a licensed engine feature
#[async_trait]
pub trait LicenseChecker: Send + Sync {
    /// Returns true if `feature` is licensed
    async fn is_allowed_engine(&self, feature: &str) -> Result<bool>;
}

/// License checker with a fixed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticLicense(pub bool);

impl StaticLicense {
    /// Every feature is licensed
    #[must_use]
    pub const fn allow() -> Self {
        Self(true)
    }

    /// No feature is licensed
    #[must_use]
    pub const fn deny() -> Self {
        Self(false)
    }
}

#[async_trait]
impl LicenseChecker for StaticLicense {
    async fn is_allowed_engine(&self, _feature: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Operations the orchestrator needs from a running engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Scan `source_code` as `file_name`
    async fn scan(&self, file_name: &str, source_code: &str) -> Result<ScanResult>;

    /// Succeeds only if the engine reports itself as serving
    async fn health_check(&self) -> Result<()>;

    /// Ask the engine to exit
    async fn shutdown(&self) -> Result<()>;

    /// Point later calls at `port`
    fn configure_port(&mut self, port: u16);

    /// Port later calls go to
    fn port(&self) -> u16;
}

#[async_trait]
impl Engine for EngineClient {
    async fn scan(&self, file_name: &str, source_code: &str) -> Result<ScanResult> {
        Self::scan(self, file_name, source_code).await
    }

    async fn health_check(&self) -> Result<()> {
        Self::health_check(self).await
    }

    async fn shutdown(&self) -> Result<()> {
        Self::shutdown(self).await
    }

    fn configure_port(&mut self, port: u16) {
        Self::configure_port(self, port);
    }

    fn port(&self) -> u16 {
        Self::port(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryConfigStore::default();
        assert!(store.get("asca_port").is_none());

        store.set("asca_port", "40123").unwrap();
        assert_eq!(store.get("asca_port").as_deref(), Some("40123"));

        store.set("asca_port", "40124").unwrap();
        assert_eq!(store.get("asca_port").as_deref(), Some("40124"));
    }

    #[test]
    fn test_memory_store_with_values() {
        let store = MemoryConfigStore::with_values([("vorpal_port", "9000")]);
        assert_eq!(store.get("vorpal_port").as_deref(), Some("9000"));
    }

    #[tokio::test]
    async fn test_static_license() {
        assert!(StaticLicense::allow().is_allowed_engine("AI Protection").await.unwrap());
        assert!(!StaticLicense::deny().is_allowed_engine("AI Protection").await.unwrap());
    }
}
