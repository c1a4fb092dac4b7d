//! Append-only log of per-image failures.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

/// The shared `_erros.log` file in the output directory.
///
/// Each failure appends one `[HH:MM:SS] <filename>: <message>` line. The file is
/// never truncated or rotated.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry stamped with the current local time.
    pub fn append(&self, filename: &str, message: &str) -> io::Result<()> {
        self.append_at(now_local(), filename, message)
    }

    /// Appends an entry stamped with `at`.
    pub fn append_at(&self, at: OffsetDateTime, filename: &str, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_entry(at, filename, message))
    }
}

/// Formats one log line without the trailing newline.
pub fn format_entry(at: OffsetDateTime, filename: &str, message: &str) -> String {
    let clock = format_description!("[hour]:[minute]:[second]");
    // The description only uses components every OffsetDateTime has.
    let stamp = at.format(clock).unwrap_or_default();
    // Keep one entry per line even if the message spans several.
    let message = message.replace(['\r', '\n'], " ");
    format!("[{stamp}] {filename}: {message}")
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
