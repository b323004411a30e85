use super::ScanResult;

/// What a scan request produced, short of an operational failure.
///
/// Every variant carries a presentable [`ScanResult`]; the variant tells the
/// caller whether the engine actually looked at a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No file path was given; the engine was only brought up
    NothingToScan(ScanResult),
    /// The target file does not exist; the result carries the error
    FileNotFound(ScanResult),
    /// The engine scanned the file
    Scanned(ScanResult),
}

impl ScanOutcome {
    /// Borrow the result
    #[must_use]
    pub const fn result(&self) -> &ScanResult {
        match self {
            Self::NothingToScan(r) | Self::FileNotFound(r) | Self::Scanned(r) => r,
        }
    }

    /// Take the result
    #[must_use]
    pub fn into_result(self) -> ScanResult {
        match self {
            Self::NothingToScan(r) | Self::FileNotFound(r) | Self::Scanned(r) => r,
        }
    }

    /// Returns true if the engine scanned a file
    #[must_use]
    pub const fn is_scanned(&self) -> bool {
        matches!(self, Self::Scanned(_))
    }
}
