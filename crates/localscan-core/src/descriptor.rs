//! Where an engine is downloaded from and where it lives on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default host publishing engine builds
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://download.localscan.dev/engines";

/// Archive container used for a given platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// gzip-compressed tarball (Linux, macOS)
    TarGz,
    /// zip archive (Windows)
    Zip,
}

impl ArchiveFormat {
    /// Format published for the platform this binary was built for
    #[must_use]
    pub const fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// File extension, without a leading dot
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// Static description of one installable engine.
///
/// All local paths are rooted at `<base_dir>/<working_dir_name>`, where the
/// base directory defaults to the system temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationDescriptor {
    /// Executable file name inside the archive
    pub executable_file: String,
    /// URL of the engine archive
    pub download_url: String,
    /// URL of the detached hash file
    pub hash_download_url: String,
    /// Local file name for the downloaded archive
    pub archive_file_name: String,
    /// Local file name for the downloaded hash file
    pub hash_file_name: String,
    /// Directory name under the base directory
    pub working_dir_name: String,
    /// Container format of the archive
    pub archive_format: ArchiveFormat,
    base_dir: PathBuf,
    custom_executable_dir: Option<PathBuf>,
}

impl InstallationDescriptor {
    /// Describe an engine published under `download_base` as
    /// `<remote_stem>-<os>-<arch>.<ext>` plus a `.sha256` hash file.
    #[must_use]
    pub fn for_platform(
        download_base: &str,
        remote_stem: &str,
        executable_stem: &str,
        working_dir_name: &str,
    ) -> Self {
        let format = ArchiveFormat::platform_default();
        let ext = format.extension();
        let base = download_base.trim_end_matches('/');
        let archive = format!("{remote_stem}-{}-{}.{ext}", platform_os(), platform_arch());
        let executable_file = if cfg!(windows) {
            format!("{executable_stem}.exe")
        } else {
            executable_stem.to_string()
        };

        Self {
            executable_file,
            download_url: format!("{base}/{archive}"),
            hash_download_url: format!("{base}/{archive}.sha256"),
            archive_file_name: format!("{working_dir_name}.{ext}"),
            hash_file_name: "hash.txt".to_string(),
            working_dir_name: working_dir_name.to_string(),
            archive_format: format,
            base_dir: std::env::temp_dir(),
            custom_executable_dir: None,
        }
    }

    /// Root all local paths at `dir` instead of the system temp directory
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Use an executable the user manages in `dir`; it is never downloaded
    #[must_use]
    pub fn with_custom_executable_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.custom_executable_dir = Some(dir.into());
        self
    }

    /// Override the remote archive and hash URLs
    #[must_use]
    pub fn with_urls(mut self, download_url: impl Into<String>, hash_url: impl Into<String>) -> Self {
        self.download_url = download_url.into();
        self.hash_download_url = hash_url.into();
        self
    }

    /// Override the archive format
    #[must_use]
    pub fn with_archive_format(mut self, format: ArchiveFormat) -> Self {
        self.archive_format = format;
        self
    }

    /// Base directory the working directory lives under
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns true if the executable is managed by the user, not downloaded
    #[must_use]
    pub const fn is_user_managed(&self) -> bool {
        self.custom_executable_dir.is_some()
    }

    /// `<base>/<working_dir_name>`
    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.base_dir.join(&self.working_dir_name)
    }

    /// Full path of the engine executable
    #[must_use]
    pub fn executable_file_path(&self) -> PathBuf {
        self.custom_executable_dir.as_ref().map_or_else(
            || self.working_dir().join(&self.executable_file),
            |dir| dir.join(&self.executable_file),
        )
    }

    /// Full path of the cached hash file
    #[must_use]
    pub fn hash_file_path(&self) -> PathBuf {
        self.working_dir().join(&self.hash_file_name)
    }

    /// Full path of the downloaded archive
    #[must_use]
    pub fn archive_file_path(&self) -> PathBuf {
        self.working_dir().join(&self.archive_file_name)
    }
}

const fn platform_os() -> &'static str {
    if cfg!(windows) {
        "windows"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else {
        "linux"
    }
}

const fn platform_arch() -> &'static str {
    if cfg!(target_arch = "aarch64") {
        "arm64"
    } else {
        "amd64"
    }
}
