//! HTTP-backed collaborators for golink.
//!
//! - [`GoDevCatalog`] lists installable releases from the go.dev JSON index.
//! - [`HttpAcquirer`] downloads a release archive, verifies its published
//!   SHA-256 and unpacks it with the shared top-level `go/` directory removed.

mod acquirer;
mod archive;
mod catalog;
mod download;

pub use acquirer::{DEFAULT_DEV_ARCHIVE_URL, DEFAULT_DOWNLOAD_HOST, HttpAcquirer};
pub use archive::extract_archive;
pub use catalog::{DEFAULT_CATALOG_URL, GoDevCatalog, release_name};
