use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use golink_backend::{AcquireError, AcquireProgress, Acquirer, VersionRequest};
use golink_platform::{ArchiveFormat, GoTarget};

use crate::archive::extract_archive;
use crate::download::{download_file, verify_published_checksum};

pub const DEFAULT_DOWNLOAD_HOST: &str = "https://go.dev/dl";
pub const DEFAULT_DEV_ARCHIVE_URL: &str =
    "https://go.googlesource.com/go/+archive/refs/heads/master.tar.gz";

/// Fetches release archives over HTTP and unpacks them.
pub struct HttpAcquirer {
    client: reqwest::Client,
    download_host: String,
    dev_archive_url: String,
    download_dir: PathBuf,
    target: Option<GoTarget>,
    progress: Option<mpsc::Sender<AcquireProgress>>,
}

impl HttpAcquirer {
    /// `download_dir` holds archives while they download; each acquisition
    /// uses its own temporary directory below it.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        download_host: impl Into<String>,
        dev_archive_url: impl Into<String>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            download_host: download_host.into(),
            dev_archive_url: dev_archive_url.into(),
            download_dir,
            target: GoTarget::current(),
            progress: None,
        }
    }

    /// Report download and extraction progress on `sender`.
    #[must_use]
    pub fn with_progress(mut self, sender: mpsc::Sender<AcquireProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: GoTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Where the archive for `request` is published.
    ///
    /// # Errors
    /// Returns [`AcquireError::UnsupportedPlatform`] for a release request
    /// when Go publishes no binaries for the running platform.
    pub fn archive_url(&self, request: &VersionRequest) -> Result<String, AcquireError> {
        match request {
            VersionRequest::Development => Ok(self.dev_archive_url.clone()),
            VersionRequest::Release(version) => {
                let target = self.target.ok_or(AcquireError::UnsupportedPlatform {
                    os: std::env::consts::OS,
                    arch: std::env::consts::ARCH,
                })?;
                Ok(format!(
                    "{}/{}",
                    self.download_host.trim_end_matches('/'),
                    target.archive_name(version.as_str())
                ))
            }
        }
    }
}

fn asset_name(url: &str) -> &str {
    let raw_name = url.rsplit('/').next().unwrap_or_default();
    Path::new(raw_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && !n.contains(".."))
        .unwrap_or("download")
}

async fn or_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T, AcquireError>>,
) -> Result<T, AcquireError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(AcquireError::Cancelled),
        result = work => result,
    }
}

#[async_trait]
impl Acquirer for HttpAcquirer {
    async fn acquire(
        &self,
        request: &VersionRequest,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), AcquireError> {
        let url = self.archive_url(request)?;
        let file_name = asset_name(&url);
        let format = ArchiveFormat::from_name(file_name)
            .ok_or_else(|| AcquireError::archive_from("unsupported archive format", &url))?;

        std::fs::create_dir_all(&self.download_dir).map_err(|error| {
            AcquireError::io_with_path("failed to create download directory", &self.download_dir, &error)
        })?;
        let temp_dir = tempfile::tempdir_in(&self.download_dir)
            .map_err(|error| AcquireError::io("failed to create temp directory", error))?;
        let archive_path = temp_dir.path().join(file_name);

        info!("Downloading {request} from {url}");
        or_cancelled(
            cancel,
            download_file(&self.client, &url, &archive_path, self.progress.as_ref()),
        )
        .await?;
        if !request.is_development() {
            if let Some(progress) = &self.progress {
                let _ = progress.send(AcquireProgress::Verifying).await;
            }
            or_cancelled(
                cancel,
                verify_published_checksum(&self.client, &url, file_name, &archive_path, cancel),
            )
            .await?;
        }

        // Awaited to completion even when cancelled: the task stops at the
        // next entry and nothing writes to `dest` after this returns.
        info!("Unpacking {file_name} into {}", dest.display());
        let extraction = {
            let archive_path = archive_path.clone();
            let dest = dest.to_path_buf();
            let cancel = cancel.clone();
            let progress = self.progress.clone();
            tokio::task::spawn_blocking(move || {
                extract_archive(format, &archive_path, &dest, &cancel, progress.as_ref())
            })
        };
        extraction
            .await
            .map_err(|error| AcquireError::archive_from("extraction task failed", error))??;

        if let Err(error) = temp_dir.close() {
            warn!("Failed to remove downloaded archive {file_name}: {error}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use golink_backend::{AcquireError, Acquirer, GoVersion, VersionRequest};
    use golink_platform::GoTarget;
    use tokio_util::sync::CancellationToken;

    use super::{DEFAULT_DEV_ARCHIVE_URL, DEFAULT_DOWNLOAD_HOST, HttpAcquirer, asset_name};

    fn acquirer(host: &str) -> HttpAcquirer {
        HttpAcquirer::new(
            reqwest::Client::new(),
            host,
            DEFAULT_DEV_ARCHIVE_URL,
            PathBuf::from("/tmp/golink-downloads"),
        )
    }

    #[test]
    fn release_url_follows_download_page_layout() {
        let linux = GoTarget::from_rust("linux", "x86_64").expect("supported");
        let acquirer = acquirer(DEFAULT_DOWNLOAD_HOST).with_target(linux);
        let request = VersionRequest::from(GoVersion::parse("1.12.1"));

        assert_eq!(
            acquirer.archive_url(&request).expect("url"),
            "https://go.dev/dl/go1.12.1.linux-amd64.tar.gz"
        );
    }

    #[test]
    fn release_url_tolerates_trailing_slash_and_windows_zip() {
        let windows = GoTarget::from_rust("windows", "x86_64").expect("supported");
        let acquirer = acquirer("https://mirror.example/golang/").with_target(windows);
        let request = VersionRequest::from(GoVersion::parse("1.22rc1"));

        assert_eq!(
            acquirer.archive_url(&request).expect("url"),
            "https://mirror.example/golang/go1.22rc1.windows-amd64.zip"
        );
    }

    #[test]
    fn development_url_ignores_target() {
        let mut acquirer = acquirer(DEFAULT_DOWNLOAD_HOST);
        acquirer.target = None;

        assert_eq!(
            acquirer
                .archive_url(&VersionRequest::Development)
                .expect("url"),
            DEFAULT_DEV_ARCHIVE_URL
        );
    }

    #[test]
    fn release_url_requires_supported_platform() {
        let mut acquirer = acquirer(DEFAULT_DOWNLOAD_HOST);
        acquirer.target = None;
        let request = VersionRequest::from(GoVersion::parse("1.21.0"));

        assert!(matches!(
            acquirer.archive_url(&request),
            Err(AcquireError::UnsupportedPlatform { .. })
        ));
    }

    #[tokio::test]
    async fn cancelled_acquire_stops_before_download() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let linux = GoTarget::from_rust("linux", "x86_64").expect("supported");
        let acquirer = HttpAcquirer::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            DEFAULT_DEV_ARCHIVE_URL,
            temp.path().join("downloads"),
        )
        .with_target(linux);
        let dest = temp.path().join("1.21.0");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = acquirer
            .acquire(
                &VersionRequest::from(GoVersion::parse("1.21.0")),
                &dest,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(AcquireError::Cancelled)));
        assert!(!dest.exists());
    }

    #[test]
    fn asset_name_is_last_url_segment() {
        assert_eq!(
            asset_name("https://go.dev/dl/go1.21.0.linux-amd64.tar.gz"),
            "go1.21.0.linux-amd64.tar.gz"
        );
        assert_eq!(asset_name(DEFAULT_DEV_ARCHIVE_URL), "master.tar.gz");
        assert_eq!(asset_name("https://example.com/"), "download");
    }
}
