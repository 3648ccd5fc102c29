#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use golink_backend::{AcquireError, Acquirer, Catalog, CatalogError, GoVersion, VersionRequest};
use tokio_util::sync::CancellationToken;

pub struct StaticCatalog {
    names: Vec<&'static str>,
    calls: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn list_versions(&self) -> Result<Vec<GoVersion>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.names.iter().map(|name| GoVersion::parse(name)).collect())
    }
}

/// Writes a `VERSION` file into the destination, or fails halfway through.
pub struct FakeAcquirer {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeAcquirer {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Acquirer for FakeAcquirer {
    async fn acquire(
        &self,
        request: &VersionRequest,
        dest: &Path,
        _cancel: &CancellationToken,
    ) -> Result<(), AcquireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(dest.join("bin"))
            .map_err(|error| AcquireError::io("failed to create dest", error))?;
        if self.fail {
            return Err(AcquireError::Archive {
                context: "failed to read tar entry",
                details: "unexpected end of file".to_string(),
            });
        }
        std::fs::write(dest.join("VERSION"), format!("go{}", request.dir_name()))
            .map_err(|error| AcquireError::io("failed to write VERSION", error))?;
        Ok(())
    }
}

/// Keeps writing files into the destination from a blocking thread until
/// cancelled, like an unpack of a very large archive.
pub struct EndlessAcquirer;

#[async_trait]
impl Acquirer for EndlessAcquirer {
    async fn acquire(
        &self,
        _request: &VersionRequest,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), AcquireError> {
        let dest = dest.to_path_buf();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let mut written = 0_u64;
            while !cancel.is_cancelled() {
                std::fs::create_dir_all(&dest)
                    .and_then(|()| std::fs::write(dest.join(format!("file-{written}")), b"x"))
                    .map_err(|error| AcquireError::io("failed to write entry", error))?;
                written += 1;
                std::thread::sleep(std::time::Duration::from_millis(2));
            }
            Err(AcquireError::Cancelled)
        })
        .await
        .map_err(|error| AcquireError::archive_from("unpack task failed", error))?
    }
}

/// Names in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("dir readable")
        .map(|entry| {
            entry
                .expect("entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
