//! Tab-separated tables written to the results directory.
//!
//! Every table is written with an explicit header row, so an empty table is
//! still a valid, self-describing file.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Format, error::Error};
use crate::model::batch::Batch;
use crate::model::record::{EnsembleRecord, mb_to_bytes};

/// A serializable row of one of the pipeline's tables.
pub trait TableRow: Serialize {
    /// Name used in error messages.
    const TABLE: &'static str;
    const HEADER: &'static [&'static str];
}

/// One row of `<project>_ensemble_analysis.tsv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub file: String,
    #[serde(rename = "size_MB")]
    pub size_mb: f64,
    pub avg_length: usize,
}

impl TableRow for CatalogRow {
    const TABLE: &'static str = "catalog";
    const HEADER: &'static [&'static str] = &["file", "size_MB", "avg_length"];
}

impl From<&EnsembleRecord> for CatalogRow {
    fn from(record: &EnsembleRecord) -> Self {
        Self {
            file: record.filename.clone(),
            size_mb: record.size_mb(),
            avg_length: record.residue_count,
        }
    }
}

/// One row of `batch_assignment_by_length.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub seq_bin: String,
    pub sub_batch: String,
    pub file: String,
    pub source_pdb_folder: String,
}

impl TableRow for AssignmentRow {
    const TABLE: &'static str = "assignment";
    const HEADER: &'static [&'static str] = &["seq_bin", "sub_batch", "file", "source_pdb_folder"];
}

/// One row of `batch_summary_by_length.tsv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub seq_bin: String,
    pub sub_batch: String,
    pub n_files: usize,
    #[serde(rename = "total_size_MB")]
    pub total_size_mb: f64,
    pub avg_length: f64,
    pub batch_folder: String,
}

impl TableRow for SummaryRow {
    const TABLE: &'static str = "batch summary";
    const HEADER: &'static [&'static str] = &[
        "seq_bin",
        "sub_batch",
        "n_files",
        "total_size_MB",
        "avg_length",
        "batch_folder",
    ];
}

impl SummaryRow {
    /// `batch_folder` is written relative to `project_root` when the batch
    /// lives under it.
    pub fn from_batch(batch: &Batch, project_root: &Path) -> Self {
        let destination = batch.destination();
        let folder = destination.strip_prefix(project_root).unwrap_or(destination);
        let stats = batch.stats();
        Self {
            seq_bin: batch.seq_bin(),
            sub_batch: batch.sub_batch(),
            n_files: stats.n_files,
            total_size_mb: stats.total_size_mb(),
            avg_length: stats.mean_residue_count,
            batch_folder: folder.to_string_lossy().into_owned(),
        }
    }
}

/// The single row of `<project>_ensemble_summary_stats.tsv`.
///
/// Statistics are blank when the catalog is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatsRow {
    #[serde(rename = "Total ensembles")]
    pub total: usize,
    #[serde(rename = "Min size (MB)")]
    pub min_size_mb: Option<f64>,
    #[serde(rename = "25th percentile size (MB)")]
    pub q25_size_mb: Option<f64>,
    #[serde(rename = "Median size (MB)")]
    pub median_size_mb: Option<f64>,
    #[serde(rename = "75th percentile size (MB)")]
    pub q75_size_mb: Option<f64>,
    #[serde(rename = "Max size (MB)")]
    pub max_size_mb: Option<f64>,
    #[serde(rename = "Mean size (MB)")]
    pub mean_size_mb: Option<f64>,
    #[serde(rename = "Min protein length")]
    pub min_length: Option<f64>,
    #[serde(rename = "25th percentile length")]
    pub q25_length: Option<f64>,
    #[serde(rename = "Median protein length")]
    pub median_length: Option<f64>,
    #[serde(rename = "75th percentile length")]
    pub q75_length: Option<f64>,
    #[serde(rename = "Max protein length")]
    pub max_length: Option<f64>,
    #[serde(rename = "Mean protein length")]
    pub mean_length: Option<f64>,
}

impl TableRow for SummaryStatsRow {
    const TABLE: &'static str = "summary statistics";
    const HEADER: &'static [&'static str] = &[
        "Total ensembles",
        "Min size (MB)",
        "25th percentile size (MB)",
        "Median size (MB)",
        "75th percentile size (MB)",
        "Max size (MB)",
        "Mean size (MB)",
        "Min protein length",
        "25th percentile length",
        "Median protein length",
        "75th percentile length",
        "Max protein length",
        "Mean protein length",
    ];
}

pub fn write_table<W, T>(writer: W, rows: &[T]) -> Result<(), Error>
where
    W: Write,
    T: TableRow,
{
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    out.write_record(T::HEADER)
        .map_err(|e| Error::table(T::TABLE, e))?;
    for row in rows {
        out.serialize(row).map_err(|e| Error::table(T::TABLE, e))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_table_file<T: TableRow>(path: &Path, rows: &[T]) -> Result<(), Error> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), rows)
}

#[derive(Debug, Deserialize)]
struct CatalogInputRow {
    file: String,
    #[serde(rename = "size_MB", default)]
    size_mb: Option<f64>,
    #[serde(default)]
    size_bytes: Option<u64>,
    #[serde(alias = "residue_count")]
    avg_length: f64,
}

/// Loads a catalog table, attaching every record to `source_directory`.
///
/// Sizes may be given either as `size_MB` or `size_bytes`, and lengths as
/// `avg_length` or `residue_count`.
pub fn read_catalog<R: Read>(
    reader: R,
    source_directory: &Arc<Path>,
) -> Result<Vec<EnsembleRecord>, Error> {
    const TABLE: &str = "catalog";

    let mut input = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let headers = input
        .headers()
        .map_err(|e| Error::table(TABLE, e))?
        .clone();
    let has = |name: &str| headers.iter().any(|h| h == name);
    if !has("file") {
        return Err(Error::MissingColumn {
            table: TABLE,
            column: "file",
        });
    }
    if !has("size_MB") && !has("size_bytes") {
        return Err(Error::MissingColumn {
            table: TABLE,
            column: "size_MB",
        });
    }
    if !has("avg_length") && !has("residue_count") {
        return Err(Error::MissingColumn {
            table: TABLE,
            column: "avg_length",
        });
    }

    let mut records = Vec::new();
    for result in input.records() {
        let raw = result.map_err(|e| Error::table(TABLE, e))?;
        let line = raw.position().map_or(0, |p| p.line() as usize);
        let row: CatalogInputRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| Error::table(TABLE, e))?;

        let size_bytes = match (row.size_bytes, row.size_mb) {
            (Some(bytes), _) => bytes,
            (None, Some(mb)) if mb.is_finite() && mb >= 0.0 => mb_to_bytes(mb),
            (None, Some(mb)) => {
                return Err(Error::parse(
                    Format::Tsv,
                    line,
                    format!("invalid size {mb} MB for '{}'", row.file),
                ));
            }
            (None, None) => {
                return Err(Error::parse(
                    Format::Tsv,
                    line,
                    format!("missing size for '{}'", row.file),
                ));
            }
        };

        if !row.avg_length.is_finite() || row.avg_length < 0.0 {
            return Err(Error::parse(
                Format::Tsv,
                line,
                format!("invalid residue count {} for '{}'", row.avg_length, row.file),
            ));
        }

        records.push(EnsembleRecord::new(
            row.file,
            size_bytes,
            row.avg_length.round() as usize,
            Arc::clone(source_directory),
        ));
    }

    Ok(records)
}

pub fn read_catalog_file(
    path: &Path,
    source_directory: &Arc<Path>,
) -> Result<Vec<EnsembleRecord>, Error> {
    read_catalog(File::open(path)?, source_directory)
}
