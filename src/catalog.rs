//! Characterizing every structure file in a directory.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::io::{self, pdb, table};
use crate::model::record::EnsembleRecord;

/// A file that matched the extension but could not be characterized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Result of scanning a directory: the records that were extracted and the
/// files that were not.
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: EnsembleCatalog,
    pub skipped: Vec<SkippedFile>,
}

/// The characterized structure files of one source directory, in directory
/// listing order.
#[derive(Debug, Clone)]
pub struct EnsembleCatalog {
    source_directory: Arc<Path>,
    records: Vec<EnsembleRecord>,
}

impl EnsembleCatalog {
    /// Scans `dir` for regular files whose extension matches `extension`
    /// (case-insensitive, leading dot optional).
    ///
    /// Files that cannot be read or parsed are reported in
    /// [`CatalogBuild::skipped`]; only failing to list the directory itself
    /// is an error. Nothing in `dir` is modified.
    pub fn build(dir: &Path, extension: &str) -> Result<CatalogBuild, io::Error> {
        let source_directory: Arc<Path> = Arc::from(dir);
        let extension = extension.trim_start_matches('.');

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !has_extension(&path, extension) {
                continue;
            }

            let Some(filename) = path.file_name().and_then(OsStr::to_str).map(str::to_owned)
            else {
                let reason = "file name is not valid UTF-8".to_string();
                warn!(path = %path.display(), "skipping structure file: {reason}");
                skipped.push(SkippedFile {
                    filename: path.to_string_lossy().into_owned(),
                    reason,
                });
                continue;
            };

            match pdb::extract_record(&path) {
                Ok(summary) => {
                    debug!(
                        file = %filename,
                        residues = summary.residue_count,
                        scope = ?summary.scope,
                        "characterized structure file"
                    );
                    records.push(EnsembleRecord::new(
                        filename,
                        summary.size_bytes,
                        summary.residue_count,
                        Arc::clone(&source_directory),
                    ));
                }
                Err(e) => {
                    warn!(file = %filename, "skipping structure file: {e}");
                    skipped.push(SkippedFile {
                        filename,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(CatalogBuild {
            catalog: Self {
                source_directory,
                records,
            },
            skipped,
        })
    }

    pub fn from_records(source_directory: Arc<Path>, records: Vec<EnsembleRecord>) -> Self {
        Self {
            source_directory,
            records,
        }
    }

    /// Loads a previously written catalog table. Records refer to
    /// `source_directory`, not to wherever the table was written from.
    pub fn load_tsv(path: &Path, source_directory: &Path) -> Result<Self, io::Error> {
        let source_directory: Arc<Path> = Arc::from(source_directory);
        let records = table::read_catalog_file(path, &source_directory)?;
        Ok(Self {
            source_directory,
            records,
        })
    }

    pub fn write_tsv(&self, path: &Path) -> Result<(), io::Error> {
        let rows: Vec<table::CatalogRow> =
            self.records.iter().map(table::CatalogRow::from).collect();
        table::write_table_file(path, &rows)
    }

    #[inline]
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    #[inline]
    pub fn records(&self) -> &[EnsembleRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
