use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::{AcquireError, CatalogError};
use crate::types::{GoVersion, VersionRequest};

/// Source of installable release names.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Every release the catalog offers, in catalog order.
    async fn list_versions(&self) -> Result<Vec<GoVersion>, CatalogError>;

    /// Look up a release by its exact raw text.
    async fn find(&self, raw: &str) -> Result<Option<GoVersion>, CatalogError> {
        let versions = self.list_versions().await?;
        Ok(versions.into_iter().find(|v| v.as_str() == raw))
    }

    /// The newest final (non beta/rc) release.
    async fn latest_final(&self) -> Result<Option<GoVersion>, CatalogError> {
        let versions = self.list_versions().await?;
        Ok(versions.into_iter().filter(GoVersion::is_final).max())
    }
}

/// Downloads a release and unpacks it.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Unpack `request` into `dest`. `dest` does not exist yet; the acquirer
    /// creates it.
    ///
    /// Once `cancel` fires the acquirer stops writing to `dest` and returns
    /// [`AcquireError::Cancelled`]. It must not return while work it started
    /// is still touching `dest`.
    async fn acquire(
        &self,
        request: &VersionRequest,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), AcquireError>;
}
