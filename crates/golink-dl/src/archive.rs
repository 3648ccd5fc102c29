use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use tar::EntryType;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use golink_backend::{AcquireError, AcquireProgress};
use golink_platform::ArchiveFormat;

/// Cancellation and progress hooks checked once per archive entry.
struct EntryTicker<'a> {
    cancel: &'a CancellationToken,
    progress: Option<&'a mpsc::Sender<AcquireProgress>>,
    extracted: u64,
    total: u64,
}

impl EntryTicker<'_> {
    fn check(&self) -> Result<(), AcquireError> {
        if self.cancel.is_cancelled() {
            Err(AcquireError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn tick(&mut self) {
        self.extracted += 1;
        if let Some(progress) = self.progress {
            // Dropped updates are fine; the next entry sends a newer count.
            let _ = progress.try_send(AcquireProgress::Extracting {
                extracted: self.extracted,
                total: self.total,
            });
        }
    }
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
///
/// When every entry lives under one top-level directory (the `go/` folder of
/// a release archive) that directory is dropped, so `go/bin/go` lands at
/// `{dest}/bin/go`. Entries with absolute paths or `..` components abort the
/// extraction.
///
/// This is blocking work. `cancel` is checked before every entry, so once it
/// fires at most the entry in flight is still written.
///
/// # Errors
/// Returns an error when the archive cannot be read, contains an unsafe
/// path, or a file cannot be written, and [`AcquireError::Cancelled`] when
/// `cancel` fires.
pub fn extract_archive(
    format: ArchiveFormat,
    archive: &Path,
    dest: &Path,
    cancel: &CancellationToken,
    progress: Option<&mpsc::Sender<AcquireProgress>>,
) -> Result<(), AcquireError> {
    let mut ticker = EntryTicker {
        cancel,
        progress,
        extracted: 0,
        total: 0,
    };
    ticker.check()?;
    std::fs::create_dir_all(dest).map_err(|error| {
        AcquireError::io_with_path("failed to create extraction directory", dest, &error)
    })?;

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest, &mut ticker)?,
        ArchiveFormat::TarGz => extract_tar_gz(archive, dest, &mut ticker)?,
    }

    debug!("Extraction complete to {}", dest.display());
    Ok(())
}

fn extract_zip(
    zip_path: &Path,
    dest: &Path,
    ticker: &mut EntryTicker<'_>,
) -> Result<(), AcquireError> {
    let file = File::open(zip_path).map_err(|error| {
        AcquireError::io_with_path("failed to open zip file", zip_path, &error)
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| AcquireError::archive_from("failed to read zip archive", error))?;

    let mut entry_paths = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|error| AcquireError::archive_from("failed to read zip entry", error))?;
        let path = entry.enclosed_name().ok_or_else(|| {
            AcquireError::archive_from("refusing to extract unsafe path", entry.name())
        })?;
        entry_paths.push(path);
    }
    let strip = common_root(&entry_paths);
    ticker.total = entry_paths.len() as u64;

    for (i, entry_path) in entry_paths.iter().enumerate() {
        ticker.check()?;
        ticker.tick();
        let Some(relative) = relative_path(entry_path, strip.as_deref()) else {
            continue;
        };
        let out_path = dest.join(relative);
        let mut entry = archive
            .by_index(i)
            .map_err(|error| AcquireError::archive_from("failed to read zip entry", error))?;

        if entry.is_dir() {
            create_dir(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            create_dir(parent)?;
        }
        let mut outfile = File::create(&out_path).map_err(|error| {
            AcquireError::io_with_path("failed to create extracted file", &out_path, &error)
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|error| {
            AcquireError::io_with_path("failed to extract archive entry", &out_path, &error)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(())
}

fn open_tar(path: &Path) -> Result<tar::Archive<GzDecoder<File>>, AcquireError> {
    let file = File::open(path)
        .map_err(|error| AcquireError::io_with_path("failed to open tar.gz file", path, &error))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

fn is_metadata_entry(entry_type: EntryType) -> bool {
    matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader)
}

fn extract_tar_gz(
    archive_path: &Path,
    dest: &Path,
    ticker: &mut EntryTicker<'_>,
) -> Result<(), AcquireError> {
    let mut entry_paths = Vec::new();
    let mut archive = open_tar(archive_path)?;
    for entry in archive
        .entries()
        .map_err(|error| AcquireError::archive_from("failed to read tar entries", error))?
    {
        let entry =
            entry.map_err(|error| AcquireError::archive_from("failed to read tar entry", error))?;
        if is_metadata_entry(entry.header().entry_type()) {
            continue;
        }
        let path = entry
            .path()
            .map_err(|error| AcquireError::archive_from("failed to read tar entry path", error))?
            .into_owned();
        if !is_safe_path(&path) {
            return Err(AcquireError::archive_from(
                "refusing to extract unsafe path",
                path.display(),
            ));
        }
        entry_paths.push(path);
    }
    let strip = common_root(&entry_paths);
    ticker.total = entry_paths.len() as u64;

    let mut archive = open_tar(archive_path)?;
    for entry in archive
        .entries()
        .map_err(|error| AcquireError::archive_from("failed to read tar entries", error))?
    {
        let mut entry =
            entry.map_err(|error| AcquireError::archive_from("failed to read tar entry", error))?;
        let entry_type = entry.header().entry_type();
        if is_metadata_entry(entry_type) {
            continue;
        }
        ticker.check()?;
        ticker.tick();
        let path = entry
            .path()
            .map_err(|error| AcquireError::archive_from("failed to read tar entry path", error))?
            .into_owned();
        let Some(relative) = relative_path(&path, strip.as_deref()) else {
            continue;
        };
        let out_path = dest.join(relative);

        if entry_type.is_dir() {
            create_dir(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            create_dir(parent)?;
        }
        entry.unpack(&out_path).map_err(|error| {
            AcquireError::io_with_path("failed to extract archive entry", &out_path, &error)
        })?;
    }

    Ok(())
}

fn create_dir(path: &Path) -> Result<(), AcquireError> {
    std::fs::create_dir_all(path).map_err(|error| {
        AcquireError::io_with_path("failed to create extraction directory", path, &error)
    })
}

fn is_safe_path(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// The single top-level directory shared by every entry, if there is one
/// and at least one entry is nested below it.
fn common_root(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut root: Option<&std::ffi::OsStr> = None;
    let mut has_nested = false;

    for path in paths {
        let mut components = path.components().filter(|c| !matches!(c, Component::CurDir));
        let first = components.next()?.as_os_str();
        if components.next().is_some() {
            has_nested = true;
        }
        match root {
            None => root = Some(first),
            Some(existing) if existing != first => return None,
            Some(_) => {}
        }
    }

    if has_nested { root.map(PathBuf::from) } else { None }
}

/// Path of an entry below the destination, or `None` for the stripped root
/// itself.
fn relative_path(path: &Path, strip: Option<&Path>) -> Option<PathBuf> {
    let path: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let relative = match strip {
        Some(prefix) => path.strip_prefix(prefix).map_or(path.clone(), Path::to_path_buf),
        None => path,
    };
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}
