use std::io;
use std::path::{Component, Path, PathBuf};

use golink_backend::{Acquirer, Catalog, GoVersion, VersionRequest};
use log::{debug, info, warn};

use crate::error::SwitchError;
use crate::guard::OperationGuard;

const STAGING_PREFIX: &str = ".golink-staging-";

/// Reject names that would escape the root or collide with golink's own
/// hidden entries.
pub(crate) fn validate_dir_name(name: &str) -> Result<(), SwitchError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name && !name.starts_with('.') => Ok(()),
        _ => Err(SwitchError::InvalidRequest(name.to_string())),
    }
}

/// Versions already unpacked under `root`, newest first.
///
/// Hidden entries, plain files, links, and the `link_name` entry are
/// skipped.
///
/// # Errors
/// Returns the I/O error from reading `root`.
pub fn installed_versions(root: &Path, link_name: &str) -> io::Result<Vec<GoVersion>> {
    let mut versions = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') || name == link_name {
            continue;
        }
        versions.push(GoVersion::parse(name));
    }
    versions.sort_by(|a, b| b.cmp(a).then_with(|| a.as_str().cmp(b.as_str())));
    Ok(versions)
}

/// Maps a request to an installation directory, acquiring it when needed.
pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
    acquirer: &'a dyn Acquirer,
    guard: &'a OperationGuard,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a dyn Catalog,
        acquirer: &'a dyn Acquirer,
        guard: &'a OperationGuard,
    ) -> Self {
        Self {
            catalog,
            acquirer,
            guard,
        }
    }

    /// Return `{root}/{name}` for `request`.
    ///
    /// An existing release directory is returned as is, without consulting
    /// the catalog. A development request always discards the previous tree
    /// and acquires a fresh one. Anything else must be listed by the catalog
    /// before it is acquired.
    ///
    /// # Errors
    /// Returns [`SwitchError::NotFound`] for unlisted versions, and catalog,
    /// acquisition, timeout, or interruption errors from the lookup and
    /// download. A failed acquisition leaves no `{root}/{name}` behind.
    pub async fn resolve(
        &self,
        root: &Path,
        request: &VersionRequest,
    ) -> Result<PathBuf, SwitchError> {
        let name = request.dir_name();
        validate_dir_name(name)?;
        let path = root.join(name);

        match request {
            VersionRequest::Development => purge(&path)?,
            VersionRequest::Release(_) => {
                if path.exists() {
                    debug!("{name} already installed at {}", path.display());
                    return Ok(path);
                }

                let listed = self
                    .guard
                    .run("catalog lookup", async {
                        self.catalog.find(name).await.map_err(SwitchError::from)
                    })
                    .await?;
                if listed.is_none() {
                    return Err(SwitchError::NotFound {
                        version: name.to_string(),
                    });
                }
            }
        }

        self.acquire_into(root, request, &path).await?;
        Ok(path)
    }

    /// Unpack into a hidden staging directory first so an interrupted or
    /// failed acquisition never leaves a partial `{root}/{name}`.
    async fn acquire_into(
        &self,
        root: &Path,
        request: &VersionRequest,
        path: &Path,
    ) -> Result<(), SwitchError> {
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(root)
            .map_err(|error| SwitchError::io("failed to create staging directory", error))?;
        let unpacked = staging.path().join(request.dir_name());
        let target = unpacked.as_path();

        let result = self
            .guard
            .run_cooperative("download", |cancel| async move {
                self.acquirer
                    .acquire(request, target, &cancel)
                    .await
                    .map_err(|source| SwitchError::Acquisition {
                        version: request.dir_name().to_string(),
                        source,
                    })
            })
            .await
            .and_then(|()| {
                std::fs::rename(&unpacked, path).map_err(|error| {
                    SwitchError::io("failed to move unpacked SDK into place", error)
                })
            });

        remove_staging(staging);
        result?;
        info!("Installed {request} at {}", path.display());
        Ok(())
    }
}

fn remove_staging(staging: tempfile::TempDir) {
    let staging_path = staging.path().to_path_buf();
    if let Err(error) = staging.close() {
        warn!(
            "Failed to remove staging directory {}: {error}",
            staging_path.display()
        );
    }
}

fn purge(path: &Path) -> Result<(), SwitchError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            info!("Removed previous development tree {}", path.display());
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(SwitchError::io(
            "failed to remove previous development tree",
            error,
        )),
    }
}
