use std::fmt;
use std::path::PathBuf;

use golink_backend::{AcquireError, CatalogError};
use thiserror::Error;

use crate::probe::AuthorizationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Remove,
    Create,
}

impl fmt::Display for LinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::Create => write!(f, "create"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot manage SDK links under {}: {source}", root.display())]
    Authorization {
        root: PathBuf,
        #[source]
        source: AuthorizationError,
    },

    #[error("version {version} is not available for download")]
    NotFound { version: String },

    #[error("{0:?} is not a usable version name")]
    InvalidRequest(String),

    #[error("failed to list releases: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to acquire {version}: {source}")]
    Acquisition {
        version: String,
        #[source]
        source: AcquireError,
    },

    #[error("failed to {action} active link {}: {source}", path.display())]
    Link {
        action: LinkAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled by user")]
    Cancelled,

    #[error("another golink run holds the lock on {}", path.display())]
    Locked { path: PathBuf },

    #[error("{operation} was interrupted")]
    Interrupted { operation: &'static str },

    #[error("{operation} timed out after {seconds}s")]
    TimedOut {
        operation: &'static str,
        seconds: u64,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl SwitchError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn link(action: LinkAction, path: PathBuf, source: std::io::Error) -> Self {
        Self::Link {
            action,
            path,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{LinkAction, SwitchError};

    #[test]
    fn not_found_names_version() {
        let error = SwitchError::NotFound {
            version: "9.9.9".to_string(),
        };

        assert_eq!(error.to_string(), "version 9.9.9 is not available for download");
    }

    #[test]
    fn link_error_names_action_and_path() {
        let error = SwitchError::link(
            LinkAction::Remove,
            PathBuf::from("/srv/sdk/current"),
            std::io::Error::other("busy"),
        );

        assert_eq!(
            error.to_string(),
            "failed to remove active link /srv/sdk/current: busy"
        );
    }

    #[test]
    fn timed_out_reports_seconds() {
        let error = SwitchError::TimedOut {
            operation: "catalog lookup",
            seconds: 30,
        };

        assert_eq!(error.to_string(), "catalog lookup timed out after 30s");
    }
}
