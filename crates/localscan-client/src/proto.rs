//! Wire messages for the engine's scan and management services.

use localscan_core::{ErrorCode as CoreErrorCode, ScanDetail as CoreScanDetail};
use localscan_core::{ScanError as CoreScanError, ScanResult as CoreScanResult};

/// Envelope for a single-file scan
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SingleScanRequest {
    /// The file to scan
    #[prost(message, optional, tag = "1")]
    pub scan_request: Option<ScanRequest>,
}

/// A file and its source text
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScanRequest {
    /// Request identifier (UUID)
    #[prost(string, tag = "1")]
    pub id: String,
    /// Base name of the file
    #[prost(string, tag = "2")]
    pub file_name: String,
    /// Full source text
    #[prost(string, tag = "3")]
    pub source_code: String,
}

/// Result of a scan
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScanResult {
    #[prost(string, tag = "1")]
    pub request_id: String,
    #[prost(bool, tag = "2")]
    pub status: bool,
    #[prost(string, tag = "3")]
    pub message: String,
    #[prost(message, repeated, tag = "4")]
    pub scan_details: Vec<ScanDetail>,
    #[prost(message, optional, tag = "5")]
    pub error: Option<Error>,
}

/// One finding
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScanDetail {
    #[prost(uint32, tag = "1")]
    pub rule_id: u32,
    #[prost(string, tag = "2")]
    pub language: String,
    #[prost(string, tag = "3")]
    pub rule_name: String,
    #[prost(string, tag = "4")]
    pub severity: String,
    #[prost(string, tag = "5")]
    pub file_name: String,
    #[prost(uint32, tag = "6")]
    pub line: u32,
    #[prost(uint32, tag = "7")]
    pub length: u32,
    #[prost(string, tag = "8")]
    pub remediation_advise: String,
    #[prost(string, tag = "9")]
    pub description: String,
    #[prost(string, tag = "10")]
    pub problematic_line: String,
}

/// Tool error reported by the engine
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(enumeration = "ErrorCode", tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ErrorCode {
    UnknownError = 0,
    InvalidRequest = 1,
    InternalError = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShutdownRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ShutdownResponse {}

impl From<ScanDetail> for CoreScanDetail {
    fn from(d: ScanDetail) -> Self {
        Self {
            rule_id: d.rule_id,
            language: d.language,
            rule_name: d.rule_name,
            severity: d.severity,
            file_name: d.file_name,
            line: d.line,
            problematic_line: d.problematic_line,
            length: d.length,
            remediation: d.remediation_advise,
            description: d.description,
        }
    }
}

impl From<Error> for CoreScanError {
    fn from(e: Error) -> Self {
        Self {
            code: CoreErrorCode::from(e.code),
            description: e.description,
        }
    }
}

impl From<ScanResult> for CoreScanResult {
    fn from(r: ScanResult) -> Self {
        Self {
            request_id: r.request_id,
            status: r.status,
            message: r.message,
            scan_details: r.scan_details.into_iter().map(Into::into).collect(),
            error: r.error.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_scan_result_into_core() {
        let wire = ScanResult {
            request_id: "some-request-id".into(),
            status: false,
            message: "Scan failed.".into(),
            scan_details: vec![ScanDetail {
                rule_id: 4006,
                severity: "High".into(),
                remediation_advise: "Encode output".into(),
                ..ScanDetail::default()
            }],
            error: Some(Error {
                code: ErrorCode::InternalError as i32,
                description: "An internal error occurred.".into(),
            }),
        };

        let core: CoreScanResult = wire.into();
        assert_eq!(core.request_id, "some-request-id");
        assert_eq!(core.scan_details[0].remediation, "Encode output");
        let error = core.error.expect("error carried over");
        assert_eq!(error.code, CoreErrorCode::Internal);
    }

    #[test]
    fn test_request_decodes_from_wire() {
        let request = SingleScanRequest {
            scan_request: Some(ScanRequest {
                id: "abc".into(),
                file_name: "python-vul-file.py".into(),
                source_code: "print('hi')".into(),
            }),
        };
        let bytes = request.encode_to_vec();
        let decoded = SingleScanRequest::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.scan_request.unwrap().file_name, "python-vul-file.py");
    }
}
