//! Streaming SHA-256 hashing via `ring::digest`.

use localscan_core::{LocalScanError, Result};
use ring::digest::{Context, SHA256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Buffer size for streaming file reads (64 KiB).
const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file, streaming to avoid loading it all into memory.
///
/// Returns lowercase hex-encoded digest.
pub async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| LocalScanError::io(path, e))?;

    let mut context = Context::new(&SHA256);
    let mut buf = vec![0u8; BUF_SIZE];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| LocalScanError::io(path, e))?;
        if n == 0 {
            break;
        }
        context.update(&buf[..n]);
    }

    Ok(hex::encode(context.finish().as_ref()))
}

/// Returns true if both files exist and have the same SHA-256 digest.
///
/// A missing `cached` file compares unequal; a missing `fresh` file is an error.
pub async fn same_digest(cached: &Path, fresh: &Path) -> Result<bool> {
    let fresh_digest = sha256_file(fresh).await?;
    match sha256_file(cached).await {
        Ok(cached_digest) => Ok(cached_digest == fresh_digest),
        Err(LocalScanError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_sha256_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "hello world").unwrap();
        tmp.flush().unwrap();

        let hash = sha256_file(tmp.path()).await.unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_same_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "abc123  asca-linux-amd64.tar.gz\n").unwrap();
        std::fs::write(&b, "abc123  asca-linux-amd64.tar.gz\n").unwrap();
        assert!(same_digest(&a, &b).await.unwrap());

        std::fs::write(&a, "abc124  asca-linux-amd64.tar.gz\n").unwrap();
        assert!(!same_digest(&a, &b).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_cached_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("fresh.txt");
        std::fs::write(&fresh, "digest").unwrap();

        assert!(!same_digest(&dir.path().join("hash.txt"), &fresh).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_fresh_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = same_digest(&dir.path().join("a"), &dir.path().join("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, LocalScanError::Io { .. }));
    }
}
