use std::path::{Path, PathBuf};

use golink_platform::{create_dir_link, entry_exists, remove_link};
use log::debug;

use crate::error::{LinkAction, SwitchError};

/// Remove whatever sits at `{root}/{link_name}`, including a link whose
/// target no longer exists, and return that path.
///
/// # Errors
/// Returns [`SwitchError::Link`] when an existing entry cannot be removed. A
/// real directory at the link path is not removed.
pub fn clear(root: &Path, link_name: &str) -> Result<PathBuf, SwitchError> {
    let link = root.join(link_name);
    if entry_exists(&link) {
        remove_link(&link).map_err(|error| SwitchError::link(LinkAction::Remove, link.clone(), error))?;
        debug!("Removed {}", link.display());
    }
    Ok(link)
}

/// Point `link` at `target`. `link` must not exist.
///
/// # Errors
/// Returns [`SwitchError::Link`] when the link cannot be created.
pub fn bind(link: &Path, target: &Path) -> Result<(), SwitchError> {
    create_dir_link(target, link)
        .map_err(|error| SwitchError::link(LinkAction::Create, link.to_path_buf(), error))
}

/// Directory name the active link points at, if it is a link.
#[must_use]
pub fn active_version(root: &Path, link_name: &str) -> Option<String> {
    let target = std::fs::read_link(root.join(link_name)).ok()?;
    target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
