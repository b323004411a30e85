//! Cross-process advisory lock around an engine working directory.

use localscan_core::{LocalScanError, Result};
use ring::rand::{SecureRandom, SystemRandom};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lock file name inside the working directory
pub const LOCK_FILE_NAME: &str = ".install.lock";

const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// How long lock acquisition waits and when a lock counts as abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Locks not refreshed for this long are removed
    pub stale_after: Duration,
    /// Delay between acquisition attempts
    pub poll_interval: Duration,
    /// Give up after this long
    pub max_wait: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Held install lock.
///
/// The lock file holds a `<pid>-<nonce>` token. While held, a heartbeat keeps
/// its mtime fresh so only an abandoned lock ever looks stale. On drop the
/// file is removed if it still carries this holder's token.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
    token: String,
    heartbeat: JoinHandle<()>,
}

impl InstallLock {
    /// Acquire the lock in `dir`, waiting for other holders
    pub async fn acquire(dir: &Path, config: LockConfig) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let token = new_token();
        let started = Instant::now();

        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    if let Err(e) = write!(file, "{token}") {
                        let _ = std::fs::remove_file(&path);
                        return Err(LocalScanError::io(&path, e));
                    }
                    debug!(path = %path.display(), %token, "acquired install lock");
                    let heartbeat = spawn_heartbeat(path.clone(), token.clone(), config.stale_after);
                    return Ok(Self {
                        path,
                        token,
                        heartbeat,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path, config.stale_after) {
                        warn!(path = %path.display(), "removing stale install lock");
                        let _ = std::fs::remove_file(&path);
                        continue;
                    }
                }
                Err(e) => return Err(LocalScanError::io(&path, e)),
            }

            if started.elapsed() >= config.max_wait {
                return Err(LocalScanError::InstallLocked {
                    path: path.display().to_string(),
                });
            }
            tokio::time::sleep(config.poll_interval).await;
        }
    }

    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        self.heartbeat.abort();

        if !holds(&self.path, &self.token) {
            warn!(path = %self.path.display(), "install lock was taken over, leaving it in place");
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "failed to remove install lock");
        }
    }
}

fn new_token() -> String {
    let mut nonce = [0u8; 8];
    if SystemRandom::new().fill(&mut nonce).is_err() {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.subsec_nanos());
        nonce[..4].copy_from_slice(&nanos.to_le_bytes());
    }
    format!("{}-{}", std::process::id(), hex::encode(nonce))
}

fn holds(path: &Path, token: &str) -> bool {
    std::fs::read_to_string(path).is_ok_and(|content| content.trim() == token)
}

/// Refresh the lock file's mtime every quarter of `stale_after` until the
/// lock is dropped or someone else owns the file
fn spawn_heartbeat(path: PathBuf, token: String, stale_after: Duration) -> JoinHandle<()> {
    let every = (stale_after / 4).max(MIN_HEARTBEAT);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if !holds(&path, &token) {
                debug!(path = %path.display(), "install lock no longer ours, stopping heartbeat");
                break;
            }
            if let Err(e) = touch(&path) {
                warn!(path = %path.display(), error = %e, "failed to refresh install lock");
            }
        }
    })
}

fn touch(path: &Path) -> std::io::Result<()> {
    std::fs::OpenOptions::new()
        .write(true)
        .open(path)?
        .set_modified(SystemTime::now())
}

fn is_stale(path: &Path, stale_after: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > stale_after)
}
