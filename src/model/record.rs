use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bytes per megabyte used for every size reported by the crate.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A single characterized structure file.
///
/// `residue_count` is measured on the first model only. The source directory
/// is shared between all records of one catalog and is never written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsembleRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub residue_count: usize,
    pub source_directory: Arc<Path>,
}

impl EnsembleRecord {
    pub fn new(
        filename: impl Into<String>,
        size_bytes: u64,
        residue_count: usize,
        source_directory: Arc<Path>,
    ) -> Self {
        Self {
            filename: filename.into(),
            size_bytes,
            residue_count,
            source_directory,
        }
    }

    #[inline]
    pub fn source_path(&self) -> PathBuf {
        self.source_directory.join(&self.filename)
    }

    #[inline]
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.size_bytes)
    }
}

#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Inverse of [`bytes_to_mb`]; exact for values written with full precision.
#[inline]
pub fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB).round().max(0.0) as u64
}
