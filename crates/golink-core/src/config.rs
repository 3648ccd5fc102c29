use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SwitchError;

pub const DEFAULT_LINK_NAME: &str = "current";
pub const GOROOT_ENV: &str = "GOROOT";

/// Inputs that decide where a switch happens.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    pub link_name: String,
    pub goroot: Option<PathBuf>,
    /// Upper bound for a whole run, prompt included.
    pub deadline: Option<Duration>,
}

impl SwitchConfig {
    #[must_use]
    pub fn new(link_name: impl Into<String>) -> Self {
        Self {
            link_name: link_name.into(),
            goroot: None,
            deadline: None,
        }
    }

    /// Read `GOROOT` from the process environment. An empty value counts as
    /// unset.
    #[must_use]
    pub fn from_env(link_name: impl Into<String>) -> Self {
        let goroot = std::env::var_os(GOROOT_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(link_name).with_goroot(goroot)
    }

    #[must_use]
    pub fn with_goroot(mut self, goroot: Option<PathBuf>) -> Self {
        self.goroot = goroot;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    fn goroot(&self) -> Result<&Path, SwitchError> {
        self.goroot.as_deref().ok_or_else(|| {
            SwitchError::Configuration(format!(
                "{GOROOT_ENV} is not set; point it at the active link, e.g. /usr/local/go/{}",
                self.link_name
            ))
        })
    }

    /// The directory holding every versioned installation: the parent of
    /// `GOROOT`.
    ///
    /// # Errors
    /// Returns [`SwitchError::Configuration`] when `GOROOT` is unset or has no
    /// parent.
    pub fn sdk_root(&self) -> Result<PathBuf, SwitchError> {
        let goroot = self.goroot()?;
        goroot
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                SwitchError::Configuration(format!(
                    "{GOROOT_ENV} ({}) has no parent directory",
                    goroot.display()
                ))
            })
    }

    /// `true` when `GOROOT` does not already end in the link name, so the
    /// user has not yet pointed it at a golink-managed root.
    #[must_use]
    pub fn needs_confirmation(&self) -> bool {
        self.goroot
            .as_deref()
            .and_then(Path::file_name)
            .is_none_or(|name| name != self.link_name.as_str())
    }
}
