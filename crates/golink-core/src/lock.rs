use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::error::SwitchError;

pub const LOCK_FILE_NAME: &str = ".golink.lock";

/// Advisory exclusive lock on an SDK root, held until dropped.
///
/// Serializes concurrent runs against the same root so the clear-then-bind
/// window of one run cannot interleave with another.
#[derive(Debug)]
pub struct RootLock {
    _file: File,
    path: PathBuf,
}

impl RootLock {
    /// # Errors
    /// Returns [`SwitchError::Locked`] when another process (or another
    /// handle in this one) holds the lock.
    pub fn acquire(root: &Path) -> Result<Self, SwitchError> {
        let path = root.join(LOCK_FILE_NAME);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|error| SwitchError::io("failed to open root lock file", error))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == fs2::lock_contended_error().kind() => {
                return Err(SwitchError::Locked { path });
            }
            Err(error) => return Err(SwitchError::io("failed to acquire root lock", error)),
        }

        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(file, "{}", std::process::id()))
            .map_err(|error| SwitchError::io("failed to write root lock metadata", error))?;

        debug!("Locked {}", path.display());
        Ok(Self { _file: file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
