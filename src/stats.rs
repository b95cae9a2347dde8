//! Descriptive statistics over a catalog.

use crate::batch::BinScheme;
use crate::io::table::SummaryStatsRow;
use crate::model::bin::SequenceBin;
use crate::model::record::EnsembleRecord;

/// Five-number summary plus mean of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean,
        })
    }
}

/// Linear interpolation between the closest order statistics.
///
/// `sorted` must be non-empty and ascending; `q` is in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub count: usize,
    pub size_mb: Summary,
    pub residue_count: Summary,
}

impl CatalogStats {
    /// `None` when there are no records.
    pub fn from_records(records: &[EnsembleRecord]) -> Option<Self> {
        Some(Self {
            count: records.len(),
            size_mb: Summary::of(records.iter().map(EnsembleRecord::size_mb))?,
            residue_count: Summary::of(records.iter().map(|r| r.residue_count as f64))?,
        })
    }
}

/// The single-row summary table; statistics are blank without records.
pub fn summary_row(total: usize, stats: Option<&CatalogStats>) -> SummaryStatsRow {
    let size = stats.map(|s| s.size_mb);
    let length = stats.map(|s| s.residue_count);
    SummaryStatsRow {
        total,
        min_size_mb: size.map(|s| s.min),
        q25_size_mb: size.map(|s| s.q25),
        median_size_mb: size.map(|s| s.median),
        q75_size_mb: size.map(|s| s.q75),
        max_size_mb: size.map(|s| s.max),
        mean_size_mb: size.map(|s| s.mean),
        min_length: length.map(|s| s.min),
        q25_length: length.map(|s| s.q25),
        median_length: length.map(|s| s.median),
        q75_length: length.map(|s| s.q75),
        max_length: length.map(|s| s.max),
        mean_length: length.map(|s| s.mean),
    }
}

/// Record count for every bin of a scheme, empty bins included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDistribution {
    counts: Vec<(SequenceBin, usize)>,
}

impl LengthDistribution {
    pub fn from_records(records: &[EnsembleRecord], scheme: &BinScheme) -> Self {
        let bins = scheme.bins();
        let mut counts: Vec<(SequenceBin, usize)> = bins.into_iter().map(|b| (b, 0)).collect();
        for record in records {
            let bin = scheme.bin_for(record.residue_count);
            if let Ok(i) = counts.binary_search_by(|(b, _)| b.cmp(&bin)) {
                counts[i].1 += 1;
            }
        }
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SequenceBin, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}
