//! HTTP download of engine archives and hash files.

use localscan_core::{LocalScanError, Result};
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

/// Stream `url` into `dest`, replacing any existing file.
///
/// Non-2xx responses are errors; a partially written file is removed.
pub async fn download_file(http: &Client, url: &str, dest: &Path) -> Result<()> {
    let download_error = |message: String| LocalScanError::Download {
        url: url.to_string(),
        message,
    };

    let parsed = Url::parse(url).map_err(|e| download_error(e.to_string()))?;
    debug!(url = %parsed, dest = %dest.display(), "downloading");

    let mut response = http
        .get(parsed)
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("HTTP {status}")));
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| LocalScanError::io(dest, e))?;

    let written = async {
        let mut total = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| LocalScanError::io(dest, e))?;
            total += chunk.len();
        }
        file.flush().await.map_err(|e| LocalScanError::io(dest, e))?;
        Ok::<_, LocalScanError>(total)
    }
    .await;

    match written {
        Ok(bytes) => {
            debug!(url, bytes, "download complete");
            Ok(())
        }
        Err(e) => {
            drop(file);
            let _ = tokio::fs::remove_file(dest).await;
            Err(e)
        }
    }
}
