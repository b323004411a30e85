//! License checks against the features listed in the configuration.

use async_trait::async_trait;
use localscan::LicenseChecker;

/// Agent name that runs without a license check
pub const DEFAULT_AGENT: &str = "localscan";

/// Licensed features taken from the config file or environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureLicense {
    features: Vec<String>,
}

impl FeatureLicense {
    /// License granting `features`
    pub fn new(features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated feature list
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim).filter(|f| !f.is_empty()))
    }
}

#[async_trait]
impl LicenseChecker for FeatureLicense {
    async fn is_allowed_engine(&self, feature: &str) -> localscan::Result<bool> {
        Ok(self
            .features
            .iter()
            .any(|f| f.eq_ignore_ascii_case(feature)))
    }
}
