//! Version switching workflow for golink.
//!
//! This crate holds the logic that is independent of the CLI and of the
//! concrete HTTP collaborators:
//! - Authorization probing of the SDK root.
//! - Resolving or acquiring a versioned installation directory.
//! - Clearing and rebinding the active link under an advisory root lock.
//! - Cancellation and deadline handling for blocking steps.

mod config;
mod error;
mod guard;
mod link;
mod lock;
mod probe;
mod resolver;
mod switch;

pub use config::{DEFAULT_LINK_NAME, GOROOT_ENV, SwitchConfig};
pub use error::{LinkAction, SwitchError};
pub use guard::OperationGuard;
pub use link::{active_version, bind, clear};
pub use lock::{LOCK_FILE_NAME, RootLock};
pub use probe::{AuthorizationError, CleanupWarning, ProbeOutcome, ProbeStep, probe};
pub use resolver::{Resolver, installed_versions};
pub use switch::{InstallReport, SwitchReport, SwitchState, Switcher};
