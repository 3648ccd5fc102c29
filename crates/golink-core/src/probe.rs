use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use golink_platform::{create_dir_link, remove_link};
use log::debug;
use thiserror::Error;

const PROBE_PREFIX: &str = ".golink-probe-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    CreateDirectory,
    CreateSymlink,
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDirectory => write!(f, "creating a scratch directory failed"),
            Self::CreateSymlink => write!(f, "creating a symbolic link failed"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{step}: {source}")]
pub struct AuthorizationError {
    pub step: ProbeStep,
    #[source]
    pub source: io::Error,
}

/// A probe artifact that could not be removed.
#[derive(Debug)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub error: io::Error,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to remove probe artifact {}: {}",
            self.path.display(),
            self.error
        )
    }
}

#[derive(Debug)]
pub struct ProbeOutcome {
    pub result: Result<(), AuthorizationError>,
    pub cleanup: Vec<CleanupWarning>,
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.result.is_ok()
    }
}

/// Check that `dir` accepts both a new directory and a symbolic link, using
/// throwaway hidden entries.
///
/// Every artifact the probe creates is removed before it returns, whether
/// the probe succeeded or not. Removal failures are reported alongside the
/// result rather than replacing it.
#[must_use]
pub fn probe(dir: &Path) -> ProbeOutcome {
    let mut cleanup = Vec::new();
    let result = run_probe(dir, &mut cleanup);
    debug!(
        "Probe of {} finished: authorized={}, cleanup warnings={}",
        dir.display(),
        result.is_ok(),
        cleanup.len()
    );
    ProbeOutcome { result, cleanup }
}

fn run_probe(dir: &Path, cleanup: &mut Vec<CleanupWarning>) -> Result<(), AuthorizationError> {
    run_probe_with(dir, cleanup, create_dir_link)
}

/// `link_dir` creates the test link; swapped out in tests to force the
/// link step to fail after the scratch directory exists.
pub(crate) fn run_probe_with<L>(
    dir: &Path,
    cleanup: &mut Vec<CleanupWarning>,
    link_dir: L,
) -> Result<(), AuthorizationError>
where
    L: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let scratch = tempfile::Builder::new()
        .prefix(PROBE_PREFIX)
        .tempdir_in(dir)
        .map_err(|source| AuthorizationError {
            step: ProbeStep::CreateDirectory,
            source,
        })?;

    let mut link_name = scratch
        .path()
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    link_name.push(".link");
    let link = dir.join(link_name);

    let result = match link_dir(scratch.path(), &link) {
        Ok(()) => {
            if let Err(error) = remove_link(&link) {
                cleanup.push(CleanupWarning { path: link, error });
            }
            Ok(())
        }
        Err(source) => Err(AuthorizationError {
            step: ProbeStep::CreateSymlink,
            source,
        }),
    };

    let scratch_path = scratch.path().to_path_buf();
    if let Err(error) = scratch.close() {
        cleanup.push(CleanupWarning {
            path: scratch_path,
            error,
        });
    }

    result
}
