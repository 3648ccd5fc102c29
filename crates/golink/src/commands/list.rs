use std::io::Write;

use golink_backend::{Catalog, GoVersion};
use golink_core::{SwitchError, installed_versions};

use super::Context;
use crate::error::CliError;

const MARK_COLUMN: usize = 20;

pub async fn run(context: &Context) -> Result<(), CliError> {
    let mut versions = context
        .guard()
        .run("catalog lookup", async {
            context
                .catalog
                .list_versions()
                .await
                .map_err(SwitchError::from)
        })
        .await?;
    versions.sort();

    // Without a usable GOROOT nothing can be marked as installed.
    let installed: Vec<String> = context
        .config
        .sdk_root()
        .ok()
        .and_then(|root| installed_versions(&root, &context.config.link_name).ok())
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect();

    write_listing(&versions, &installed, &mut std::io::stdout())?;
    Ok(())
}

fn write_listing(
    versions: &[GoVersion],
    installed: &[String],
    out: &mut impl Write,
) -> std::io::Result<()> {
    for version in versions {
        let raw = version.as_str();
        if installed.iter().any(|name| name == raw) {
            writeln!(out, "{raw:<width$}*", width = MARK_COLUMN)?;
        } else {
            writeln!(out, "{raw}")?;
        }
    }
    Ok(())
}
