use crate::EngineKind;
use serde::{Deserialize, Serialize};

/// Result of a single-file scan as returned by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Identifier of the request that produced this result
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,

    /// Whether the engine completed the scan
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub status: bool,

    /// Informational message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Findings
    #[serde(default)]
    pub scan_details: Vec<ScanDetail>,

    /// Tool error reported by the engine, or a missing input file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ScanError>,
}

impl ScanResult {
    /// Result for an invocation that carried no file to scan
    #[must_use]
    pub fn not_provided(engine: EngineKind) -> Self {
        Self {
            message: format!("File path not provided, {engine} engine is running successfully."),
            ..Self::default()
        }
    }

    /// Result for a scan target that does not exist
    #[must_use]
    pub fn file_not_found(path: &str) -> Self {
        Self {
            error: Some(ScanError {
                code: ErrorCode::Unknown,
                description: format!("File {path} not found"),
            }),
            ..Self::default()
        }
    }

    /// Returns true if the engine (or input validation) reported an error
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of findings with the given severity (case-insensitive)
    #[must_use]
    pub fn count_severity(&self, severity: &str) -> usize {
        self.scan_details
            .iter()
            .filter(|d| d.severity.eq_ignore_ascii_case(severity))
            .count()
    }
}

/// A single finding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDetail {
    /// Rule identifier
    #[serde(default)]
    pub rule_id: u32,

    /// Source language
    #[serde(default)]
    pub language: String,

    /// Rule name (e.g. "Stored XSS")
    #[serde(default)]
    pub rule_name: String,

    /// Severity (e.g. "High")
    #[serde(default)]
    pub severity: String,

    /// File the finding belongs to
    #[serde(default)]
    pub file_name: String,

    /// 1-based line number
    #[serde(default)]
    pub line: u32,

    /// Text of the offending line
    #[serde(default, rename = "problematicLine")]
    pub problematic_line: String,

    /// Length of the offending snippet
    #[serde(default)]
    pub length: u32,

    /// Remediation advice
    #[serde(default, rename = "remediationAdvise")]
    pub remediation: String,

    /// Long description
    #[serde(default)]
    pub description: String,
}

/// Error reported inside a [`ScanResult`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    /// Error class
    #[serde(default, skip_serializing_if = "ErrorCode::is_unknown")]
    pub code: ErrorCode,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Error classes reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ErrorCode {
    /// Unclassified error
    #[default]
    Unknown,
    /// The request was malformed
    InvalidRequest,
    /// The engine failed internally
    Internal,
}

impl ErrorCode {
    /// Returns true for [`ErrorCode::Unknown`]
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::InvalidRequest,
            2 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Unknown => 0,
            ErrorCode::InvalidRequest => 1,
            ErrorCode::Internal => 2,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN_ERROR"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::Internal => write!(f, "INTERNAL_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_provided_message() {
        let result = ScanResult::not_provided(EngineKind::Asca);
        assert_eq!(
            result.message,
            "File path not provided, asca engine is running successfully."
        );
        assert_eq!(
            ScanResult::not_provided(EngineKind::Vorpal).message,
            "File path not provided, vorpal engine is running successfully."
        );
        assert!(!result.has_error());
        assert!(result.scan_details.is_empty());
    }

    #[test]
    fn test_file_not_found_is_data() {
        let result = ScanResult::file_not_found("/no/such/file");
        let error = result.error.expect("error set");
        assert_eq!(error.description, "File /no/such/file not found");
    }

    #[test]
    fn test_json_field_names() {
        let result = ScanResult {
            request_id: "1234567890".into(),
            status: true,
            scan_details: vec![ScanDetail {
                rule_id: 4006,
                problematic_line: "eval(x)".into(),
                remediation: "Avoid eval".into(),
                ..ScanDetail::default()
            }],
            ..ScanResult::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["request_id"], "1234567890");
        assert_eq!(json["status"], true);
        assert!(json.get("message").is_none());
        assert!(json.get("error").is_none());
        let detail = &json["scan_details"][0];
        assert_eq!(detail["rule_id"], 4006);
        assert_eq!(detail["problematicLine"], "eval(x)");
        assert_eq!(detail["remediationAdvise"], "Avoid eval");
    }

    #[test]
    fn test_error_code_as_integer() {
        let error = ScanError {
            code: ErrorCode::Internal,
            description: "An internal error occurred.".into(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"code":2,"description":"An internal error occurred."}"#);

        let parsed: ScanError = serde_json::from_str(r#"{"code":7}"#).unwrap();
        assert_eq!(parsed.code, ErrorCode::Unknown);
    }

    #[test]
    fn test_count_severity() {
        let result = ScanResult {
            scan_details: vec![
                ScanDetail { severity: "High".into(), ..ScanDetail::default() },
                ScanDetail { severity: "high".into(), ..ScanDetail::default() },
                ScanDetail { severity: "Medium".into(), ..ScanDetail::default() },
            ],
            ..ScanResult::default()
        };
        assert_eq!(result.count_severity("HIGH"), 2);
        assert_eq!(result.count_severity("Low"), 0);
    }
}
