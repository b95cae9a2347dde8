//! Plain-text reports written alongside the tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::error::Error;
use crate::batch::PartitionConfig;
use crate::catalog::SkippedFile;
use crate::model::batch::{Batch, Regime};
use crate::relocate::{MoveLogEntry, RelocationOutcome};
use crate::stats::{CatalogStats, LengthDistribution, Summary};

/// Everything the analysis report shows for one project.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisSummary<'a> {
    pub project: &'a str,
    pub source_directory: &'a Path,
    pub record_count: usize,
    pub stats: Option<&'a CatalogStats>,
    pub distribution: &'a LengthDistribution,
    pub bin_width: usize,
    pub skipped: &'a [SkippedFile],
}

pub fn write_analysis_report<W: Write>(mut out: W, summary: &AnalysisSummary<'_>) -> Result<(), Error> {
    writeln!(out, "=== Ensemble Analysis Report: {} ===", summary.project)?;
    writeln!(out)?;
    writeln!(out, "Source: {}", summary.source_directory.display())?;
    writeln!(out, "Total ensembles analyzed: {}", summary.record_count)?;
    write_skipped(&mut out, summary.skipped)?;
    writeln!(out)?;

    match summary.stats {
        Some(stats) => {
            writeln!(out, "File size statistics (MB):")?;
            write_summary(&mut out, &stats.size_mb, |v| format!("{v:.2}"))?;
            writeln!(out)?;
            writeln!(out, "Protein length statistics (residues):")?;
            write_summary(&mut out, &stats.residue_count, |v| format!("{v:.1}"))?;
        }
        None => writeln!(out, "No ensembles were characterized; statistics are unavailable.")?,
    }
    writeln!(out)?;

    writeln!(
        out,
        "Sequence length distribution ({}-residue bins):",
        summary.bin_width
    )?;
    for (bin, count) in summary.distribution.iter() {
        writeln!(out, "  {bin}: {count}")?;
    }
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(
    out: &mut W,
    summary: &Summary,
    fmt: impl Fn(f64) -> String,
) -> Result<(), Error> {
    let rows = [
        ("Min", summary.min),
        ("25th percentile", summary.q25),
        ("Median", summary.median),
        ("75th percentile", summary.q75),
        ("Max", summary.max),
        ("Mean", summary.mean),
    ];
    for (name, value) in rows {
        writeln!(out, "  {name}: {}", fmt(value))?;
    }
    Ok(())
}

fn write_skipped<W: Write>(out: &mut W, skipped: &[SkippedFile]) -> Result<(), Error> {
    if skipped.is_empty() {
        return Ok(());
    }
    writeln!(out, "Skipped files ({}):", skipped.len())?;
    for file in skipped {
        writeln!(out, "  - {}: {}", file.filename, file.reason)?;
    }
    Ok(())
}

/// Everything the batch report shows for one project.
#[derive(Debug, Clone, Copy)]
pub struct BatchSummary<'a> {
    pub output_base: &'a Path,
    pub project_root: &'a Path,
    pub config: &'a PartitionConfig,
    pub batches: &'a [Batch],
    /// One entry per relocated batch, in batch order; shorter than
    /// `batches` when the run was cancelled.
    pub outcomes: &'a [RelocationOutcome],
    pub skipped: &'a [SkippedFile],
    pub failures: &'a [MoveLogEntry],
}

pub fn write_batch_report<W: Write>(mut out: W, summary: &BatchSummary<'_>) -> Result<(), Error> {
    writeln!(
        out,
        "Batches by sequence length ({}-residue bins, short regime up to {} residues in {} groups, at most {} files per long batch)",
        summary.config.bins.width,
        summary.config.length_threshold,
        summary.config.short_batch_count,
        summary.config.max_batch_size,
    )?;
    writeln!(out, "Output base: {}", summary.output_base.display())?;
    writeln!(out)?;
    writeln!(out, "Summary by batch:")?;

    for (i, batch) in summary.batches.iter().enumerate() {
        let stats = batch.stats();
        let destination = batch.destination();
        let folder = destination
            .strip_prefix(summary.project_root)
            .unwrap_or(destination);
        let regime = match batch.regime() {
            Regime::Short => "short",
            Regime::Long => "long",
        };
        let relocated = match summary.outcomes.get(i) {
            Some(o) if o.cancelled => format!("{}/{} relocated, cancelled", o.succeeded, stats.n_files),
            Some(o) => format!("{}/{} relocated", o.succeeded, stats.n_files),
            None => "not relocated".to_string(),
        };
        writeln!(
            out,
            "  Batch {} ({regime}): {} files, total {:.2} MB, avg length {:.1} -> {} [{relocated}]",
            batch.batch_id(),
            stats.n_files,
            stats.total_size_mb(),
            stats.mean_residue_count,
            folder.display(),
        )?;
    }
    if summary.batches.is_empty() {
        writeln!(out, "  (no batches)")?;
    }

    if !summary.skipped.is_empty() || !summary.failures.is_empty() {
        writeln!(out)?;
    }
    write_skipped(&mut out, summary.skipped)?;
    if !summary.failures.is_empty() {
        writeln!(out, "Failed relocations ({}):", summary.failures.len())?;
        for entry in summary.failures {
            writeln!(
                out,
                "  - {} -> {}: {}",
                entry.source.display(),
                entry.destination.display(),
                entry.message
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_report_file<F>(path: &Path, render: F) -> Result<(), Error>
where
    F: FnOnce(BufWriter<File>) -> Result<(), Error>,
{
    render(BufWriter::new(File::create(path)?))
}
