use std::io::Write;

use golink_backend::{GoVersion, VersionRequest};
use golink_core::SwitchReport;
use tokio::io::BufReader;

use super::Context;
use crate::error::CliError;

pub async fn run(context: &Context, version: &str) -> Result<(), CliError> {
    let request = VersionRequest::from(GoVersion::parse(version));
    let report = activate(context, &request).await?;
    print_report(&report, &mut std::io::stdout())?;
    Ok(())
}

pub(super) async fn activate(
    context: &Context,
    request: &VersionRequest,
) -> Result<SwitchReport, CliError> {
    let mut input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    let report = context
        .switcher()
        .switch(request, &mut input, &mut output)
        .await?;
    Ok(report)
}

fn print_report(report: &SwitchReport, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Before: {}", report.previous.as_deref().unwrap_or("(none)"))?;
    writeln!(out, "After : {}", report.current)
}
