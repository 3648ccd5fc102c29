use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use golink_backend::{AcquireError, AcquireProgress};

pub(crate) async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    progress: Option<&mpsc::Sender<AcquireProgress>>,
) -> Result<u64, AcquireError> {
    use futures_util::StreamExt;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| AcquireError::http("download request failed", error))?;

    if !response.status().is_success() {
        return Err(AcquireError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
        AcquireError::io_with_path("failed to create download file", dest, &error)
    })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| AcquireError::http("download stream error", error))?;
        file.write_all(&chunk).await.map_err(|error| {
            AcquireError::io_with_path("failed to write download data", dest, &error)
        })?;
        downloaded += chunk.len() as u64;
        if let Some(progress) = progress {
            let _ = progress
                .send(AcquireProgress::Downloading { downloaded, total })
                .await;
        }
    }

    file.flush().await.map_err(|error| {
        AcquireError::io_with_path("failed to flush download file", dest, &error)
    })?;

    info!("Download complete: {downloaded} bytes");
    Ok(downloaded)
}

/// Check `archive` against the digest published at `{url}.sha256`.
///
/// A release without a published digest is accepted with a warning. The
/// archive is hashed on the blocking pool.
pub(crate) async fn verify_published_checksum(
    client: &reqwest::Client,
    url: &str,
    asset_name: &str,
    archive: &Path,
    cancel: &CancellationToken,
) -> Result<(), AcquireError> {
    let checksum_url = format!("{url}.sha256");
    let response = client
        .get(&checksum_url)
        .send()
        .await
        .map_err(|error| AcquireError::http("failed to download checksum", error))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        warn!("No checksum published for {asset_name}, skipping verification");
        return Ok(());
    }
    if !response.status().is_success() {
        return Err(AcquireError::Status {
            url: checksum_url,
            status: response.status(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|error| AcquireError::http("failed to read checksum", error))?;
    let expected = parse_checksum_body(&body).ok_or_else(|| {
        AcquireError::archive_from("malformed checksum file", format!("{checksum_url}: {body}"))
    })?;
    let path = archive.to_path_buf();
    let token = cancel.clone();
    let actual = tokio::task::spawn_blocking(move || sha256_file(&path, &token))
        .await
        .map_err(|error| AcquireError::archive_from("checksum task failed", error))??;

    if actual.eq_ignore_ascii_case(&expected) {
        debug!("Checksum verified for {asset_name}");
        Ok(())
    } else {
        Err(AcquireError::ChecksumMismatch {
            asset: asset_name.to_string(),
            expected,
            actual,
        })
    }
}

/// First token of a `.sha256` file, if it is a hex SHA-256 digest.
fn parse_checksum_body(body: &str) -> Option<String> {
    let hash = body.split_whitespace().next()?;
    if hash.len() != 64 || !hash.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(hash.to_ascii_lowercase())
}

fn sha256_file(path: &Path, cancel: &CancellationToken) -> Result<String, AcquireError> {
    let mut file = std::fs::File::open(path).map_err(|error| {
        AcquireError::io_with_path("failed to open file for checksum", path, &error)
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }
        let read = file.read(&mut buffer).map_err(|error| {
            AcquireError::io_with_path("failed to read file for checksum", path, &error)
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
