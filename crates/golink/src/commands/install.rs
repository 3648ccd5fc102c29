use std::io::Write;
use std::path::Path;

use golink_backend::GoVersion;

use super::Context;
use crate::error::CliError;

pub async fn run(context: &Context, path: &Path, version: Option<String>) -> Result<(), CliError> {
    let version = version.as_deref().map(GoVersion::parse);
    let report = context.switcher().install(path, version).await?;

    let mut out = std::io::stdout();
    writeln!(
        out,
        "Installed go{} at {}",
        report.version,
        report.installation.display()
    )?;
    write_setup_hint(&report.link, &mut out)?;
    Ok(())
}

fn write_setup_hint(link: &Path, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Point GOROOT at the link and add its bin directory to PATH:")?;
    if cfg!(windows) {
        writeln!(out, "    setx GOROOT \"{}\"", link.display())?;
        writeln!(out, "    setx PATH \"%GOROOT%\\bin;%PATH%\"")
    } else {
        writeln!(out, "    export GOROOT={}", link.display())?;
        writeln!(out, "    export PATH=\"$GOROOT/bin:$PATH\"")
    }
}
