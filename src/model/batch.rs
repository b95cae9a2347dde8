use std::path::{Path, PathBuf};

use super::bin::SequenceBin;
use super::record::{EnsembleRecord, bytes_to_mb};

/// Which partitioning strategy produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// `residue_count ≤ threshold`: a fixed number of balanced groups.
    Short,
    /// `residue_count > threshold`: length bins chunked by a size cap.
    Long,
}

/// Ordinal of a batch within its bin, zero-padded to `width` digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubIndex {
    pub index: usize,
    pub width: usize,
}

impl SubIndex {
    /// Width is at least two digits and wide enough for `count`.
    pub fn new(index: usize, count: usize) -> Self {
        let digits = count.max(1).ilog10() as usize + 1;
        Self {
            index,
            width: digits.max(2),
        }
    }

    pub fn padded(&self) -> String {
        format!("{:0width$}", self.index, width = self.width)
    }
}

/// Aggregates computed once when a batch is sealed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub n_files: usize,
    pub total_size_bytes: u64,
    pub mean_residue_count: f64,
}

impl BatchStats {
    fn from_members(members: &[EnsembleRecord]) -> Self {
        let n_files = members.len();
        let total_size_bytes = members.iter().map(|r| r.size_bytes).sum();
        let total_residues: usize = members.iter().map(|r| r.residue_count).sum();
        let mean_residue_count = if n_files == 0 {
            0.0
        } else {
            total_residues as f64 / n_files as f64
        };
        Self {
            n_files,
            total_size_bytes,
            mean_residue_count,
        }
    }

    #[inline]
    pub fn total_size_mb(&self) -> f64 {
        bytes_to_mb(self.total_size_bytes)
    }
}

/// A sealed group of records bound for one destination directory.
///
/// Member order is assignment order. There is no API to add or remove
/// members after construction.
#[derive(Debug, Clone)]
pub struct Batch {
    batch_id: String,
    bin: SequenceBin,
    sub_index: Option<SubIndex>,
    regime: Regime,
    members: Vec<EnsembleRecord>,
    destination: PathBuf,
    stats: BatchStats,
}

impl Batch {
    pub fn seal(
        bin: SequenceBin,
        sub_index: Option<SubIndex>,
        regime: Regime,
        members: Vec<EnsembleRecord>,
        batches_root: &Path,
    ) -> Self {
        let (batch_id, folder) = match sub_index {
            Some(sub) => (
                format!("{}_{}", bin.label(), sub.padded()),
                format!("batch_{}_{}", bin.safe_label(), sub.padded()),
            ),
            None => (bin.label(), format!("batch_{}", bin.safe_label())),
        };
        let stats = BatchStats::from_members(&members);

        Self {
            batch_id,
            bin,
            sub_index,
            regime,
            members,
            destination: batches_root.join(folder),
            stats,
        }
    }

    #[inline]
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    #[inline]
    pub fn bin(&self) -> SequenceBin {
        self.bin
    }

    #[inline]
    pub fn seq_bin(&self) -> String {
        self.bin.label()
    }

    /// Zero-padded sub-index, or an empty string for single-chunk bins.
    pub fn sub_batch(&self) -> String {
        self.sub_index.map(|s| s.padded()).unwrap_or_default()
    }

    #[inline]
    pub fn sub_index(&self) -> Option<SubIndex> {
        self.sub_index
    }

    #[inline]
    pub fn regime(&self) -> Regime {
        self.regime
    }

    #[inline]
    pub fn members(&self) -> &[EnsembleRecord] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[inline]
    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }
}
