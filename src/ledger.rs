//! Which batch every record was assigned to.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::io::{Error, table};
use crate::model::batch::Batch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEntry {
    pub filename: String,
    pub source_directory: PathBuf,
    pub batch_id: String,
    pub seq_bin: String,
    pub sub_batch: String,
    pub destination: PathBuf,
}

impl From<&AssignmentEntry> for table::AssignmentRow {
    fn from(entry: &AssignmentEntry) -> Self {
        Self {
            seq_bin: entry.seq_bin.clone(),
            sub_batch: entry.sub_batch.clone(),
            file: entry.filename.clone(),
            source_pdb_folder: entry.source_directory.to_string_lossy().into_owned(),
        }
    }
}

/// Record-to-batch assignments derived from a partition, in batch order.
///
/// Built before any file is relocated, so it reflects the intended layout
/// even if some relocations later fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentLedger {
    entries: Vec<AssignmentEntry>,
}

impl AssignmentLedger {
    pub fn from_batches(batches: &[Batch]) -> Self {
        let entries = batches
            .iter()
            .flat_map(|batch| {
                batch.members().iter().map(move |record| AssignmentEntry {
                    filename: record.filename.clone(),
                    source_directory: record.source_directory.to_path_buf(),
                    batch_id: batch.batch_id().to_string(),
                    seq_bin: batch.seq_bin(),
                    sub_batch: batch.sub_batch(),
                    destination: batch.destination().join(&record.filename),
                })
            })
            .collect();
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[AssignmentEntry] {
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

    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let rows: Vec<table::AssignmentRow> = self.entries.iter().map(Into::into).collect();
        table::write_table(writer, &rows)
    }

    pub fn write_tsv_file(&self, path: &Path) -> Result<(), Error> {
        let rows: Vec<table::AssignmentRow> = self.entries.iter().map(Into::into).collect();
        table::write_table_file(path, &rows)
    }
}
