mod dev;
mod install;
mod list;
mod progress;
mod switch;

use std::path::Path;
use std::time::Duration;

use golink_core::{OperationGuard, SwitchConfig, Switcher};
use golink_dl::{GoDevCatalog, HttpAcquirer};
use golink_platform::AppPaths;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::settings::Settings;

/// Collaborators and configuration shared by every command.
pub struct Context {
    pub config: SwitchConfig,
    pub catalog: GoDevCatalog,
    pub acquirer: HttpAcquirer,
    pub cancel: CancellationToken,
}

impl Context {
    fn new(link_name: String, paths: &AppPaths, settings: &Settings) -> Result<Self, CliError> {
        check_link_name(&link_name)?;

        let http_timeout = Duration::from_secs(settings.http_timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(http_timeout)
            .read_timeout(http_timeout)
            .user_agent(format!("golink/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CliError::Client)?;

        let deadline = Some(settings.operation_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            config: SwitchConfig::from_env(link_name).with_deadline(deadline),
            catalog: GoDevCatalog::new(client.clone(), settings.catalog_url.as_str()),
            acquirer: HttpAcquirer::new(
                client,
                settings.download_host.as_str(),
                settings.dev_archive_url.as_str(),
                paths.download_dir(),
            )
            .with_progress(progress::spawn_printer()),
            cancel: CancellationToken::new(),
        })
    }

    pub fn switcher(&self) -> Switcher<'_> {
        Switcher::new(&self.config, &self.catalog, &self.acquirer, self.cancel.clone())
    }

    pub fn guard(&self) -> OperationGuard {
        OperationGuard::new(self.cancel.clone(), self.config.deadline)
    }
}

fn check_link_name(name: &str) -> Result<(), CliError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(CliError::usage(format!(
            "link name {name:?} must be a single path component"
        ))),
    }
}

pub async fn run(cli: Cli, paths: &AppPaths, settings: &Settings) -> Result<(), CliError> {
    let link_name = cli.link_name.unwrap_or_else(|| settings.link_name.clone());
    let context = Context::new(link_name, paths, settings)?;

    let cancel = context.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            cancel.cancel();
        }
    });

    match cli.command {
        Command::List => list::run(&context).await,
        Command::Install { path, version } => install::run(&context, &path, version).await,
        Command::Dev => dev::run(&context).await,
        Command::Use { version } => switch::run(&context, &version).await,
        Command::Version(args) => match Command::shorthand_version(&args) {
            Some(version) => switch::run(&context, version).await,
            None => Err(CliError::usage(
                "expected exactly one version, e.g. `golink 1.21.6`",
            )),
        },
    }
}
