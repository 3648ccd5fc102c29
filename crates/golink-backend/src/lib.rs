mod error;
mod traits;
mod types;

pub use error::{AcquireError, CatalogError};
pub use traits::{Acquirer, Catalog};
pub use types::{AcquireProgress, DEVELOPMENT_DIR_NAME, GoVersion, PrereleaseKind, VersionRequest};
