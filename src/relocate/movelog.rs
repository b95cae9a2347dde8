use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::io::Error;

/// A single failed relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveLogEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
    pub timestamp: OffsetDateTime,
}

impl MoveLogEntry {
    /// `timestamp\tsource\tdestination\tmessage`, without a trailing newline.
    pub fn to_line(&self) -> String {
        let timestamp = self
            .timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.timestamp.unix_timestamp().to_string());
        format!(
            "{}\t{}\t{}\t{}",
            timestamp,
            single_line(&self.source.to_string_lossy()),
            single_line(&self.destination.to_string_lossy()),
            single_line(&self.message),
        )
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

/// Failed relocations collected during one batching pass.
///
/// Entries are only ever appended; the log is written out with
/// [`MoveLog::append_to_file`], which never truncates an existing file.
#[derive(Debug, Clone, Default)]
pub struct MoveLog {
    entries: Vec<MoveLogEntry>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        message: impl Into<String>,
    ) {
        self.entries.push(MoveLogEntry {
            source: source.into(),
            destination: destination.into(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        });
    }

    #[inline]
    pub fn entries(&self) -> &[MoveLogEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one line per entry to `path`, creating the file if needed.
    pub fn append_to_file(&self, path: &Path) -> Result<(), Error> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut out = BufWriter::new(file);
        for entry in &self.entries {
            writeln!(out, "{}", entry.to_line())?;
        }
        out.flush()?;
        Ok(())
    }
}
