use thiserror::Error;

/// Result type alias for localscan operations
pub type Result<T> = std::result::Result<T, LocalScanError>;

/// Errors that prevent a local scan from running at all.
///
/// A scan that ran but reported a tool error is not a `LocalScanError`; it is
/// carried inside [`crate::ScanResult::error`].
#[derive(Error, Debug)]
pub enum LocalScanError {
    /// Downloading the engine archive or its hash file failed
    #[error("download of {url} failed: {message}")]
    Download {
        /// URL that was requested
        url: String,
        /// Transport or HTTP status description
        message: String,
    },

    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was working on
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be decoded
    #[error("archive error: {0}")]
    Archive(String),

    /// Archive contained an entry type the installer refuses to handle
    #[error("unsupported archive entry type {kind} for {entry}")]
    UnsupportedArchiveEntry {
        /// Entry name inside the archive
        entry: String,
        /// Entry type as reported by the archive
        kind: String,
    },

    /// Archive entry resolved outside the working directory (zip-slip)
    #[error("illegal file path: {path}")]
    IllegalArchivePath {
        /// Offending destination path
        path: String,
    },

    /// Another process held the install lock for too long
    #[error("engine installation in {path} is locked by another process")]
    InstallLocked {
        /// Lock file path
        path: String,
    },

    /// The engine executable could not be started
    #[error("failed to start engine {executable}: {source}")]
    Spawn {
        /// Executable path
        executable: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The engine process never accepted connections
    #[error("server did not become ready in time: {address} (waited {waited_ms} ms)")]
    EngineNotReady {
        /// Address that was polled
        address: String,
        /// Milliseconds spent waiting
        waited_ms: u64,
    },

    /// Could not open a gRPC channel to the engine
    #[error("error occurred while creating the gRPC client at address {address}: {message}")]
    Connection {
        /// Engine address
        address: String,
        /// Transport error description
        message: String,
    },

    /// Health check answered, but the service is not serving
    #[error("service {service} not serving, status: {status}, host address: {address}")]
    NotServing {
        /// Health service name
        service: String,
        /// Reported serving status
        status: String,
        /// Engine address
        address: String,
    },

    /// A gRPC call returned a non-OK status
    #[error("gRPC call failed ({code}): {message}")]
    Rpc {
        /// gRPC status code
        code: String,
        /// Status message
        message: String,
    },

    /// The scan RPC failed
    #[error("{engine} scan failed for file {file_name} (request {request_id}): {message}")]
    Scan {
        /// Engine name
        engine: String,
        /// File that was being scanned
        file_name: String,
        /// Request identifier sent to the engine
        request_id: String,
        /// Underlying error description
        message: String,
    },

    /// The management shutdown RPC failed
    #[error("failed to shutdown {engine} engine: {message}")]
    Shutdown {
        /// Engine name
        engine: String,
        /// Underlying error description
        message: String,
    },

    /// The user is not entitled to run this engine
    #[error("user doesn't have a license for the {engine} engine ({feature})")]
    LicenseDenied {
        /// Engine name
        engine: String,
        /// License feature that was checked
        feature: String,
    },

    /// The license check itself failed
    #[error("license check failed: {0}")]
    License(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No free local port was available
    #[error("could not allocate a local port: {0}")]
    PortAllocation(String),
}

impl LocalScanError {
    /// Build an [`LocalScanError::Io`] for the given path
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Returns true if the user lacks the license to run the engine
    #[must_use]
    pub const fn is_license_error(&self) -> bool {
        matches!(self, Self::LicenseDenied { .. })
    }

    /// Returns true if the installer rejected a hostile archive
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(
            self,
            Self::IllegalArchivePath { .. } | Self::UnsupportedArchiveEntry { .. }
        )
    }

    /// Returns true if the engine may simply not be up yet
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::NotServing { .. } | Self::EngineNotReady { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_error_is_distinct() {
        let err = LocalScanError::LicenseDenied {
            engine: "asca".into(),
            feature: "AI Protection".into(),
        };
        assert!(err.is_license_error());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("license"));
    }

    #[test]
    fn test_security_errors() {
        let err = LocalScanError::IllegalArchivePath {
            path: "/tmp/evil".into(),
        };
        assert!(err.is_security_error());
        assert_eq!(err.to_string(), "illegal file path: /tmp/evil");
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = LocalScanError::io(
            "/no/such/dir",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().starts_with("I/O error on /no/such/dir"));
    }
}
