mod link;
mod paths;
mod target;

pub use link::{create_dir_link, entry_exists, remove_link};
pub use paths::{AppPaths, AppPathsError};
pub use target::{ArchiveFormat, GoTarget};
