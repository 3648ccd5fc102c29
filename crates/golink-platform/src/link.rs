use std::io;
use std::path::Path;

use log::debug;

/// Whether anything occupies `path`, without following a final symlink.
///
/// A dangling link counts as present.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Create a symlink at `link` that points at the directory `target`.
///
/// # Errors
/// Returns the underlying I/O error when the link cannot be created.
pub fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    debug!("Linking {} -> {}", link.display(), target.display());

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(target, link)
    }
}

/// Remove the entry at `link` without touching what it points at.
///
/// # Errors
/// Returns the underlying I/O error, including `NotFound` when nothing is
/// there.
pub fn remove_link(link: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        // Directory symlinks are directories to the Win32 API.
        let metadata = link.symlink_metadata()?;
        if metadata.is_dir() {
            return std::fs::remove_dir(link);
        }
    }

    std::fs::remove_file(link)
}
