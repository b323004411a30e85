//! Findings the user has chosen to suppress.
//!
//! The ignore file is a JSON array of `{"FileName", "Line", "RuleID"}`
//! objects; a finding is dropped when all three match.

use localscan_core::{LocalScanError, Result, ScanDetail, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One suppressed finding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IgnoredFinding {
    /// Base name of the scanned file
    #[serde(rename = "FileName")]
    pub file_name: String,

    /// 1-based line number
    #[serde(rename = "Line")]
    pub line: u32,

    /// Rule identifier
    #[serde(rename = "RuleID")]
    pub rule_id: u32,
}

impl IgnoredFinding {
    /// Returns true if `detail` is this finding
    #[must_use]
    pub fn matches(&self, detail: &ScanDetail) -> bool {
        self.file_name == detail.file_name && self.line == detail.line && self.rule_id == detail.rule_id
    }
}

/// Read an ignore file
pub async fn load_ignored(path: &Path) -> Result<Vec<IgnoredFinding>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LocalScanError::io(path, e))?;
    let ignored: Vec<IgnoredFinding> = serde_json::from_str(&content)?;
    debug!(path = %path.display(), count = ignored.len(), "loaded ignored findings");
    Ok(ignored)
}

/// Drop every finding in `result` that appears in `ignored`
pub fn filter_ignored(result: &mut ScanResult, ignored: &[IgnoredFinding]) {
    if ignored.is_empty() {
        return;
    }
    let before = result.scan_details.len();
    result
        .scan_details
        .retain(|detail| !ignored.iter().any(|i| i.matches(detail)));
    debug!(removed = before - result.scan_details.len(), "filtered ignored findings");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(file_name: &str, line: u32, rule_id: u32) -> ScanDetail {
        ScanDetail {
            file_name: file_name.to_string(),
            line,
            rule_id,
            ..ScanDetail::default()
        }
    }

    #[tokio::test]
    async fn test_load_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignored.json");
        std::fs::write(
            &path,
            r#"[{"FileName": "python-vul-file.py", "Line": 34, "RuleID": 4006}]"#,
        )
        .unwrap();

        let ignored = load_ignored(&path).await.unwrap();
        assert_eq!(ignored.len(), 1);

        let mut result = ScanResult {
            scan_details: vec![
                detail("python-vul-file.py", 34, 4006),
                detail("python-vul-file.py", 35, 4006),
                detail("other.py", 34, 4006),
            ],
            ..ScanResult::default()
        };
        filter_ignored(&mut result, &ignored);

        assert_eq!(result.scan_details.len(), 2);
        assert!(result.scan_details.iter().all(|d| !ignored[0].matches(d)));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_ignored(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, LocalScanError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignored.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_ignored(&path).await.unwrap_err();
        assert!(matches!(err, LocalScanError::Json(_)));
    }
}
