mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::future::Future;
use std::process::ExitCode;

use clap::Parser;
use golink_platform::AppPaths;
use log::warn;
use tokio::runtime::Runtime;

use crate::cli::Cli;
use crate::error::CliError;
use crate::settings::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = AppPaths::new();
    let (settings, settings_error) = match paths.as_ref().map(Settings::load) {
        Ok(Ok(settings)) => (settings, None),
        Ok(Err(error)) => (Settings::default(), Some(error)),
        Err(_) => (Settings::default(), None),
    };
    let log_file = paths
        .as_ref()
        .ok()
        .filter(|_| settings.debug_logging)
        .and_then(|paths| paths.ensure_dirs().ok().map(|()| paths.log_file()));
    logging::init_logging(cli.verbose, log_file, settings.max_log_size_bytes);
    if let Some(error) = settings_error {
        warn!("Ignoring {error}; using defaults");
    }

    match run(cli, paths, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::debug!("golink failed: {error:?}");
            eprintln!("Error:\n  {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    cli: Cli,
    paths: Result<AppPaths, golink_platform::AppPathsError>,
    settings: &Settings,
) -> Result<(), CliError> {
    let paths = paths?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    run_to_completion(runtime, commands::run(cli, &paths, settings))
}

/// Drive `future` on `runtime`, then shut the runtime down without joining
/// blocking tasks. A prompt abandoned by the deadline leaves a thread parked
/// in a stdin read that would otherwise hold up exit.
fn run_to_completion<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    output
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use golink_core::{OperationGuard, SwitchError};
    use tokio_util::sync::CancellationToken;

    use super::run_to_completion;

    #[test]
    fn timed_out_prompt_does_not_hold_up_exit() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime should be created");
        let guard = OperationGuard::new(CancellationToken::new(), Some(Duration::from_millis(50)));
        let started = Instant::now();

        let result = run_to_completion(runtime, async move {
            guard
                .run("confirmation", async {
                    let _ = tokio::task::spawn_blocking(|| {
                        std::thread::sleep(Duration::from_secs(5));
                    })
                    .await;
                    Ok(())
                })
                .await
        });

        assert!(matches!(
            result,
            Err(SwitchError::TimedOut {
                operation: "confirmation",
                ..
            })
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
