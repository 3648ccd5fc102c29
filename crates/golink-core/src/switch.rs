use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use golink_backend::{Acquirer, Catalog, GoVersion, VersionRequest};
use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::config::SwitchConfig;
use crate::error::SwitchError;
use crate::guard::OperationGuard;
use crate::link::{active_version, bind, clear};
use crate::lock::RootLock;
use crate::probe::{CleanupWarning, probe};
use crate::resolver::{Resolver, validate_dir_name};

/// Progress of a single run. A run ends in `LinkBound` or `Failed`; the
/// step it failed after is kept by [`Switcher::failed_after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    RootResolved,
    Authorized,
    PathReady,
    LinkCleared,
    LinkBound,
    Failed,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::RootResolved => "root resolved",
            Self::Authorized => "authorized",
            Self::PathReady => "path ready",
            Self::LinkCleared => "link cleared",
            Self::LinkBound => "link bound",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
pub struct SwitchReport {
    pub root: PathBuf,
    pub link: PathBuf,
    pub installation: PathBuf,
    pub previous: Option<String>,
    pub current: String,
    pub warnings: Vec<CleanupWarning>,
}

#[derive(Debug)]
pub struct InstallReport {
    pub root: PathBuf,
    pub link: PathBuf,
    pub installation: PathBuf,
    pub version: GoVersion,
    pub warnings: Vec<CleanupWarning>,
}

struct Activation {
    link: PathBuf,
    installation: PathBuf,
    previous: Option<String>,
    warnings: Vec<CleanupWarning>,
}

/// Drives a run from request to bound link.
pub struct Switcher<'a> {
    config: &'a SwitchConfig,
    catalog: &'a dyn Catalog,
    acquirer: &'a dyn Acquirer,
    guard: OperationGuard,
    state: Cell<SwitchState>,
    failed_after: Cell<Option<SwitchState>>,
}

impl<'a> Switcher<'a> {
    /// The configured deadline starts counting here.
    #[must_use]
    pub fn new(
        config: &'a SwitchConfig,
        catalog: &'a dyn Catalog,
        acquirer: &'a dyn Acquirer,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            catalog,
            acquirer,
            guard: OperationGuard::new(cancel, config.deadline),
            state: Cell::new(SwitchState::Idle),
            failed_after: Cell::new(None),
        }
    }

    /// State reached by the most recent run.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        self.state.get()
    }

    /// The last state a failed run reached before failing.
    #[must_use]
    pub fn failed_after(&self) -> Option<SwitchState> {
        self.failed_after.get()
    }

    fn begin(&self, request: &str, state: SwitchState) {
        debug!("{request}: starting at {state}");
        self.state.set(state);
        self.failed_after.set(None);
    }

    fn advance(&self, request: &str, next: SwitchState) {
        debug!("{request}: {} -> {next}", self.state.get());
        self.state.set(next);
    }

    fn finish<T>(&self, request: &str, result: Result<T, SwitchError>) -> Result<T, SwitchError> {
        if let Err(error) = &result {
            let reached = self.state.get();
            debug!("{request}: {reached} -> failed: {error}");
            self.failed_after.set(Some(reached));
            self.state.set(SwitchState::Failed);
        }
        result
    }

    /// Make `request` the active version under the root derived from
    /// `GOROOT`.
    ///
    /// When `GOROOT` does not end in the link name the planned layout is
    /// written to `output` and the run continues only if the next line of
    /// `input` is exactly `Y`.
    ///
    /// # Errors
    /// Any failure stops the run at the state it reached; see
    /// [`SwitchError`] for the kinds.
    pub async fn switch<R, W>(
        &self,
        request: &VersionRequest,
        input: &mut R,
        output: &mut W,
    ) -> Result<SwitchReport, SwitchError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.begin(request.dir_name(), SwitchState::Idle);
        let result = self.run_switch(request, input, output).await;
        self.finish(request.dir_name(), result)
    }

    async fn run_switch<R, W>(
        &self,
        request: &VersionRequest,
        input: &mut R,
        output: &mut W,
    ) -> Result<SwitchReport, SwitchError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.check_request(request.dir_name())?;
        let root = self.config.sdk_root()?;
        if self.config.needs_confirmation() {
            self.confirm(&root, request, input, output).await?;
        }
        self.advance(request.dir_name(), SwitchState::RootResolved);

        let activation = self.activate(&root, request).await?;
        let current = request.dir_name().to_string();
        info!(
            "Switched {} from {} to {current}",
            activation.link.display(),
            activation.previous.as_deref().unwrap_or("nothing")
        );

        Ok(SwitchReport {
            root,
            link: activation.link,
            installation: activation.installation,
            previous: activation.previous,
            current,
            warnings: activation.warnings,
        })
    }

    /// Install `version` (or the newest final release) under `root`, creating
    /// `root` if needed, and point `{root}/{link_name}` at it. `GOROOT` is not
    /// consulted.
    ///
    /// # Errors
    /// Same kinds as [`Switcher::switch`], plus [`SwitchError::NotFound`]
    /// when no final release is listed.
    pub async fn install(
        &self,
        root: &Path,
        version: Option<GoVersion>,
    ) -> Result<InstallReport, SwitchError> {
        std::fs::create_dir_all(root)
            .map_err(|error| SwitchError::io("failed to create install directory", error))?;
        let root = std::path::absolute(root)
            .map_err(|error| SwitchError::io("failed to resolve install directory", error))?;

        let version = match version {
            Some(version) => version,
            None => self
                .guard
                .run("catalog lookup", async {
                    self.catalog.latest_final().await.map_err(SwitchError::from)
                })
                .await?
                .ok_or_else(|| SwitchError::NotFound {
                    version: "latest".to_string(),
                })?,
        };
        self.check_request(version.as_str())?;

        let request = VersionRequest::Release(version.clone());
        self.begin(version.as_str(), SwitchState::RootResolved);
        let activation = self.activate(&root, &request).await;
        let activation = self.finish(version.as_str(), activation)?;

        Ok(InstallReport {
            root,
            link: activation.link,
            installation: activation.installation,
            version,
            warnings: activation.warnings,
        })
    }

    fn check_request(&self, name: &str) -> Result<(), SwitchError> {
        validate_dir_name(name)?;
        if name == self.config.link_name {
            return Err(SwitchError::InvalidRequest(name.to_string()));
        }
        Ok(())
    }

    /// Probe, lock, resolve, then swap the link.
    async fn activate(
        &self,
        root: &Path,
        request: &VersionRequest,
    ) -> Result<Activation, SwitchError> {
        let name = request.dir_name();
        let outcome = probe(root);
        for warning in &outcome.cleanup {
            warn!("{warning}");
        }
        outcome
            .result
            .map_err(|source| SwitchError::Authorization {
                root: root.to_path_buf(),
                source,
            })?;
        self.advance(name, SwitchState::Authorized);

        let _lock = RootLock::acquire(root)?;
        let previous = active_version(root, &self.config.link_name);

        let resolver = Resolver::new(self.catalog, self.acquirer, &self.guard);
        let installation = resolver.resolve(root, request).await?;
        self.advance(name, SwitchState::PathReady);

        let link = clear(root, &self.config.link_name)?;
        self.advance(name, SwitchState::LinkCleared);

        bind(&link, &installation)?;
        self.advance(name, SwitchState::LinkBound);

        Ok(Activation {
            link,
            installation,
            previous,
            warnings: outcome.cleanup,
        })
    }

    async fn confirm<R, W>(
        &self,
        root: &Path,
        request: &VersionRequest,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), SwitchError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let goroot = self
            .config
            .goroot
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let link = root.join(&self.config.link_name);
        let target = root.join(request.dir_name());

        write!(
            output,
            "GOROOT ({goroot}) is not a golink-managed link.\n\
             golink will manage SDKs under {root}:\n  \
             versions:    {root}/<version>\n  \
             active link: {link} -> {target}\n\
             Set GOROOT to {link} afterwards.\n\
             Is it OK? [Y/n] ",
            root = root.display(),
            link = link.display(),
            target = target.display(),
        )
        .and_then(|()| output.flush())
        .map_err(|error| SwitchError::io("failed to write confirmation prompt", error))?;

        let mut answer = String::new();
        self.guard
            .run("confirmation", async {
                input
                    .read_line(&mut answer)
                    .await
                    .map_err(|error| SwitchError::io("failed to read confirmation", error))
            })
            .await?;

        if answer.trim_end_matches(['\r', '\n']) == "Y" {
            Ok(())
        } else {
            Err(SwitchError::Cancelled)
        }
    }
}
