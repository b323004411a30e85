//! Content-addressed install and upgrade of engine executables.
//!
//! An installation is current when the SHA-256 of the cached hash file
//! matches that of the hash file currently published next to the archive.

mod download;
pub mod extract;
mod hash;
mod lock;

pub use download::download_file;
pub use hash::{same_digest, sha256_file};
pub use lock::{InstallLock, LockConfig, LOCK_FILE_NAME};

use localscan_core::{InstallationDescriptor, LocalScanError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for a single download
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Installation state of an engine on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstalledState {
    /// The executable does not exist
    Absent,
    /// The executable exists but a newer build is published
    PresentStale,
    /// The executable matches the published build
    PresentCurrent,
}

impl std::fmt::Display for InstalledState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::PresentStale => write!(f, "outdated"),
            Self::PresentCurrent => write!(f, "up to date"),
        }
    }
}

/// Downloads, verifies and unpacks engine archives
#[derive(Debug, Clone)]
pub struct ArchiveInstaller {
    http: Client,
    lock: LockConfig,
}

impl Default for ArchiveInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveInstaller {
    /// Installer with its own HTTP client
    #[must_use]
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(DEFAULT_DOWNLOAD_TIMEOUT)
            .user_agent(format!("localscan/{}", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .unwrap_or_default();
        Self::with_client(http)
    }

    /// Installer that reuses an existing HTTP client
    #[must_use]
    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            lock: LockConfig::default(),
        }
    }

    /// Override install lock timing
    #[must_use]
    pub const fn lock_config(mut self, lock: LockConfig) -> Self {
        self.lock = lock;
        self
    }

    /// Determine whether the engine is absent, stale or current.
    ///
    /// A user-managed executable that exists is always current. Otherwise
    /// this downloads the published hash file to a temporary sibling of the cached
    /// one; the cached file is left untouched.
    pub async fn installed_state(&self, descriptor: &InstallationDescriptor) -> Result<InstalledState> {
        if !file_exists(&descriptor.executable_file_path()).await {
            return Ok(InstalledState::Absent);
        }
        if descriptor.is_user_managed() {
            return Ok(InstalledState::PresentCurrent);
        }

        let cached = descriptor.hash_file_path();
        let fresh = remote_hash_path(&cached);
        download_file(&self.http, &descriptor.hash_download_url, &fresh).await?;

        let same = same_digest(&cached, &fresh).await;
        let _ = tokio::fs::remove_file(&fresh).await;

        if same? {
            Ok(InstalledState::PresentCurrent)
        } else {
            Ok(InstalledState::PresentStale)
        }
    }

    /// Install the engine if it is absent or outdated.
    ///
    /// Returns true if a new build was downloaded and extracted. Executables
    /// in a user-managed location are never touched.
    pub async fn install_or_upgrade(&self, descriptor: &InstallationDescriptor) -> Result<bool> {
        if descriptor.is_user_managed() {
            debug!(
                executable = %descriptor.executable_file_path().display(),
                "engine location is user managed, skipping install"
            );
            return Ok(false);
        }

        let working_dir = descriptor.working_dir();
        tokio::fs::create_dir_all(&working_dir)
            .await
            .map_err(|e| LocalScanError::io(&working_dir, e))?;

        let _lock = InstallLock::acquire(&working_dir, self.lock).await?;

        let state = self.installed_state(descriptor).await?;
        if state == InstalledState::PresentCurrent {
            debug!(dir = %working_dir.display(), "engine is up to date, skipping download");
            return Ok(false);
        }

        info!(dir = %working_dir.display(), %state, url = %descriptor.download_url, "installing engine");

        let archive = descriptor.archive_file_path();
        download_file(&self.http, &descriptor.download_url, &archive).await?;
        download_file(&self.http, &descriptor.hash_download_url, &descriptor.hash_file_path()).await?;
        extract::extract(&archive, &working_dir, descriptor.archive_format).await?;

        info!(executable = %descriptor.executable_file_path().display(), "engine installed");
        Ok(true)
    }
}

fn remote_hash_path(cached: &Path) -> PathBuf {
    let mut name = cached
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}.remote", std::process::id()));
    cached.with_file_name(name)
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use localscan_core::{ArchiveFormat, DEFAULT_DOWNLOAD_BASE};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let body = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, "ASCA", &body[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn descriptor(server: &MockServer, base: &Path) -> InstallationDescriptor {
        InstallationDescriptor::for_platform(DEFAULT_DOWNLOAD_BASE, "asca", "ASCA", "ASCA")
            .with_urls(
                format!("{}/asca.tar.gz", server.uri()),
                format!("{}/asca.tar.gz.sha256", server.uri()),
            )
            .with_archive_format(ArchiveFormat::TarGz)
            .with_base_dir(base)
    }

    #[test]
    fn test_remote_hash_path_is_sibling() {
        let cached = Path::new("/tmp/ASCA/hash.txt");
        let fresh = remote_hash_path(cached);
        assert_eq!(fresh.parent(), cached.parent());
        assert_ne!(fresh, cached);
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(engine_tarball()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz.sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0123abcd  asca.tar.gz\n"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let descriptor = descriptor(&server, dir.path());
        let installer = ArchiveInstaller::new();

        assert!(installer.install_or_upgrade(&descriptor).await.unwrap());
        assert!(descriptor.executable_file_path().exists());
        assert!(!installer.install_or_upgrade(&descriptor).await.unwrap());
        assert!(!descriptor.working_dir().join(LOCK_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_changed_hash_triggers_upgrade() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(engine_tarball()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz.sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0123abcd  asca.tar.gz\n"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let descriptor = descriptor(&server, dir.path());
        let installer = ArchiveInstaller::new();

        assert!(installer.install_or_upgrade(&descriptor).await.unwrap());

        let hash_file = descriptor.hash_file_path();
        let mut cached = std::fs::read(&hash_file).unwrap();
        cached[0] ^= 0x01;
        std::fs::write(&hash_file, cached).unwrap();

        assert_eq!(
            installer.installed_state(&descriptor).await.unwrap(),
            InstalledState::PresentStale
        );
        assert!(installer.install_or_upgrade(&descriptor).await.unwrap());
        assert_eq!(
            installer.installed_state(&descriptor).await.unwrap(),
            InstalledState::PresentCurrent
        );
    }

    #[tokio::test]
    async fn test_missing_executable_forces_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(engine_tarball()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz.sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0123abcd"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let descriptor = descriptor(&server, dir.path());
        let installer = ArchiveInstaller::new();

        assert!(installer.install_or_upgrade(&descriptor).await.unwrap());
        std::fs::remove_file(descriptor.executable_file_path()).unwrap();

        assert_eq!(
            installer.installed_state(&descriptor).await.unwrap(),
            InstalledState::Absent
        );
        assert!(installer.install_or_upgrade(&descriptor).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_download_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asca.tar.gz.sha256"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let descriptor = descriptor(&server, dir.path());
        std::fs::create_dir_all(descriptor.working_dir()).unwrap();
        std::fs::write(descriptor.executable_file_path(), "old").unwrap();

        let err = ArchiveInstaller::new()
            .install_or_upgrade(&descriptor)
            .await
            .unwrap_err();
        assert!(matches!(err, LocalScanError::Download { .. }), "{err}");
        assert!(!descriptor.working_dir().join(LOCK_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_user_managed_is_never_downloaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let descriptor = descriptor(&server, dir.path()).with_custom_executable_dir(dir.path());

        assert!(!ArchiveInstaller::new()
            .install_or_upgrade(&descriptor)
            .await
            .unwrap());
    }
}
