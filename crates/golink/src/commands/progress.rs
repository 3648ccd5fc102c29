//! Acquisition progress printed to stderr.

use golink_backend::AcquireProgress;
use tokio::sync::mpsc;

const PROGRESS_BUFFER: usize = 64;
/// Step for downloads whose length the server did not send.
const UNSIZED_STEP: u64 = 8 * 1024 * 1024;

/// Spawn the stderr printer and hand back the sender for the acquirer.
pub(super) fn spawn_printer() -> mpsc::Sender<AcquireProgress> {
    let (sender, mut receiver) = mpsc::channel(PROGRESS_BUFFER);
    tokio::spawn(async move {
        let mut printer = ProgressPrinter::default();
        while let Some(progress) = receiver.recv().await {
            if let Some(line) = printer.line(progress) {
                eprintln!("{line}");
            }
        }
    });
    sender
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Download,
    Verify,
    Extract,
}

/// Turns progress events into lines, one per tenth of each phase.
#[derive(Debug, Default)]
struct ProgressPrinter {
    last: Option<(Phase, u64)>,
}

impl ProgressPrinter {
    fn line(&mut self, progress: AcquireProgress) -> Option<String> {
        let (key, line) = match progress {
            AcquireProgress::Downloading { downloaded, total: 0 } => (
                (Phase::Download, downloaded / UNSIZED_STEP),
                format!("Downloading: {}", format_bytes(downloaded)),
            ),
            AcquireProgress::Downloading { downloaded, total } => {
                let percent = percent(downloaded, total);
                (
                    (Phase::Download, percent / 10),
                    format!(
                        "Downloading: {} / {} ({percent}%)",
                        format_bytes(downloaded),
                        format_bytes(total)
                    ),
                )
            }
            AcquireProgress::Verifying => ((Phase::Verify, 0), "Verifying checksum".to_string()),
            AcquireProgress::Extracting { extracted, total } => (
                (Phase::Extract, percent(extracted, total) / 10),
                format!("Extracting: {extracted}/{total} entries"),
            ),
        };
        if self.last == Some(key) {
            return None;
        }
        self.last = Some(key);
        Some(line)
    }
}

fn percent(done: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    u64::try_from(u128::from(done.min(total)) * 100 / u128::from(total)).unwrap_or(100)
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format_tenths(bytes, MB, "MB")
    } else if bytes >= KB {
        format_tenths(bytes, KB, "KB")
    } else {
        format!("{bytes} B")
    }
}

fn format_tenths(value: u64, unit: u64, suffix: &str) -> String {
    let scaled = (u128::from(value) * 10 + u128::from(unit) / 2) / u128::from(unit);
    let whole = scaled / 10;
    let tenth = scaled % 10;
    format!("{whole}.{tenth} {suffix}")
}

#[cfg(test)]
mod tests {
    use golink_backend::AcquireProgress;

    use super::{ProgressPrinter, format_bytes};

    const MB: u64 = 1024 * 1024;

    #[test]
    fn download_prints_once_per_tenth() {
        let mut printer = ProgressPrinter::default();
        let total = 100 * MB;

        let lines: Vec<String> = [1, 5, 12, 19, 100]
            .into_iter()
            .filter_map(|mb| {
                printer.line(AcquireProgress::Downloading {
                    downloaded: mb * MB,
                    total,
                })
            })
            .collect();

        assert_eq!(
            lines,
            [
                "Downloading: 1.0 MB / 100.0 MB (1%)",
                "Downloading: 12.0 MB / 100.0 MB (12%)",
                "Downloading: 100.0 MB / 100.0 MB (100%)",
            ]
        );
    }

    #[test]
    fn phases_each_get_a_line() {
        let mut printer = ProgressPrinter::default();

        let verify = printer.line(AcquireProgress::Verifying);
        let repeat = printer.line(AcquireProgress::Verifying);
        let extract = printer.line(AcquireProgress::Extracting {
            extracted: 1,
            total: 4,
        });
        let done = printer.line(AcquireProgress::Extracting {
            extracted: 4,
            total: 4,
        });

        assert_eq!(verify.as_deref(), Some("Verifying checksum"));
        assert_eq!(repeat, None);
        assert_eq!(extract.as_deref(), Some("Extracting: 1/4 entries"));
        assert_eq!(done.as_deref(), Some("Extracting: 4/4 entries"));
    }

    #[test]
    fn unsized_download_reports_bytes_only() {
        let mut printer = ProgressPrinter::default();

        let line = printer.line(AcquireProgress::Downloading {
            downloaded: 512,
            total: 0,
        });

        assert_eq!(line.as_deref(), Some("Downloading: 512 B"));
        assert_eq!(format_bytes(1536), "1.5 KB");
    }
}
