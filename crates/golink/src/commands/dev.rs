use std::io::Write;
use std::path::{Path, PathBuf};

use golink_backend::{DEVELOPMENT_DIR_NAME, VersionRequest};
use golink_core::SwitchReport;

use super::Context;
use super::switch::activate;
use crate::error::CliError;

pub async fn run(context: &Context) -> Result<(), CliError> {
    let report = activate(context, &VersionRequest::Development).await?;
    let bootstrap = bootstrap_root(&report);
    write_build_hint(&report.installation, bootstrap.as_deref(), &mut std::io::stdout())?;
    Ok(())
}

/// The installation the link pointed at before this run, usable as
/// `GOROOT_BOOTSTRAP` when it is a release that is still on disk.
fn bootstrap_root(report: &SwitchReport) -> Option<PathBuf> {
    let previous = report.previous.as_deref()?;
    if previous == DEVELOPMENT_DIR_NAME {
        return None;
    }
    let root = report.root.join(previous);
    root.is_dir().then_some(root)
}

/// The unpacked tree is source only; it needs a bootstrap Go to build.
fn write_build_hint(
    tree: &Path,
    bootstrap: Option<&Path>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let src = tree.join("src");
    writeln!(out, "Development sources unpacked to {}", tree.display())?;
    writeln!(out, "The active link now points at an unbuilt tree. Build it with:")?;
    match bootstrap {
        Some(bootstrap) if cfg!(windows) => writeln!(
            out,
            "    cd {} && set GOROOT_BOOTSTRAP={} && make.bat",
            src.display(),
            bootstrap.display()
        ),
        Some(bootstrap) => writeln!(
            out,
            "    cd {} && GOROOT_BOOTSTRAP={} ./make.bash",
            src.display(),
            bootstrap.display()
        ),
        None => {
            let script = if cfg!(windows) { "make.bat" } else { "./make.bash" };
            writeln!(out, "    cd {} && {script}", src.display())?;
            writeln!(
                out,
                "No previous Go installation is available as a bootstrap; \
                 set GOROOT_BOOTSTRAP to an installed Go first."
            )
        }
    }
}
