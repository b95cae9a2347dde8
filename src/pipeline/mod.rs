//! Per-project driver: characterize, then partition and relocate.
//!
//! Each configured path is processed independently. A failure in one
//! directory is recorded in the returned [`RunSummary`] and the run moves on
//! to the next path.

mod config;
mod error;
mod layout;

pub use config::{DEFAULT_EXTENSION, DEFAULT_SOURCE_PREFIX, PipelineConfig};
pub use error::Error;
pub use layout::SourceLayout;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::batch::partition;
use crate::cancel::CancelFlag;
use crate::catalog::{EnsembleCatalog, SkippedFile};
use crate::io::report::{self, AnalysisSummary, BatchSummary};
use crate::io::table::{self, SummaryRow};
use crate::ledger::AssignmentLedger;
use crate::model::batch::Batch;
use crate::relocate::{MoveLog, MoveLogEntry, RelocationOutcome, Relocator};
use crate::stats::{self, CatalogStats, LengthDistribution};

/// Which steps [`run`] performs for each path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Analyze,
    Batch,
    /// Analyze, then batch from the fresh catalog.
    Full,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub catalog: EnsembleCatalog,
    pub skipped: Vec<SkippedFile>,
    pub stats: Option<CatalogStats>,
    pub distribution: LengthDistribution,
    pub catalog_table: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batches: Vec<Batch>,
    pub outcomes: Vec<RelocationOutcome>,
    pub failures: Vec<MoveLogEntry>,
    pub skipped: Vec<SkippedFile>,
    pub batches_root: PathBuf,
    /// Set when cancellation stopped relocation early.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }

    pub fn relocated(&self) -> usize {
        self.outcomes.iter().map(|o| o.succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().map(|o| o.failed).sum()
    }
}

/// Characterizes the source directory and writes the catalog table, the
/// summary statistics table and the analysis report.
pub fn analyze_directory(
    layout: &SourceLayout,
    config: &PipelineConfig,
) -> Result<AnalysisReport, Error> {
    info!(
        project = layout.project_name(),
        source = %layout.source_directory().display(),
        "analyzing ensembles"
    );
    let build = EnsembleCatalog::build(layout.source_directory(), &config.extension)?;
    let catalog = build.catalog;

    fs::create_dir_all(layout.results_dir())?;
    let catalog_table = layout.catalog_table();
    catalog.write_tsv(&catalog_table)?;

    let stats = CatalogStats::from_records(catalog.records());
    let distribution = LengthDistribution::from_records(catalog.records(), &config.partition.bins);

    table::write_table_file(
        &layout.stats_table(),
        &[stats::summary_row(catalog.len(), stats.as_ref())],
    )?;
    let summary = AnalysisSummary {
        project: layout.project_name(),
        source_directory: layout.source_directory(),
        record_count: catalog.len(),
        stats: stats.as_ref(),
        distribution: &distribution,
        bin_width: config.partition.bins.width,
        skipped: &build.skipped,
    };
    report::write_report_file(&layout.analysis_report(), |out| {
        report::write_analysis_report(out, &summary)
    })?;

    info!(
        project = layout.project_name(),
        records = catalog.len(),
        skipped = build.skipped.len(),
        "analysis complete"
    );
    Ok(AnalysisReport {
        catalog,
        skipped: build.skipped,
        stats,
        distribution,
        catalog_table,
    })
}

/// Partitions and relocates a project's ensembles.
///
/// The catalog table written by [`analyze_directory`] is loaded unless
/// `config.rescan` is set, in which case the source directory is scanned
/// again.
pub fn batch_directory(
    layout: &SourceLayout,
    config: &PipelineConfig,
    cancel: &CancelFlag,
) -> Result<BatchReport, Error> {
    let (catalog, skipped) = if config.rescan {
        let build = EnsembleCatalog::build(layout.source_directory(), &config.extension)?;
        (build.catalog, build.skipped)
    } else {
        let table = layout.catalog_table();
        if !table.is_file() {
            return Err(Error::missing_input("catalog table", table));
        }
        (
            EnsembleCatalog::load_tsv(&table, layout.source_directory())?,
            Vec::new(),
        )
    };
    batch_catalog(layout, &catalog, skipped, config, cancel)
}

/// Partitions `catalog`, writes the assignment table, relocates every batch
/// and writes the error log, the summary table and the batch report.
pub fn batch_catalog(
    layout: &SourceLayout,
    catalog: &EnsembleCatalog,
    skipped: Vec<SkippedFile>,
    config: &PipelineConfig,
    cancel: &CancelFlag,
) -> Result<BatchReport, Error> {
    let batches_root = layout.batches_root();
    fs::create_dir_all(&batches_root)?;

    let batches = partition(catalog.records(), &config.partition, &batches_root);
    AssignmentLedger::from_batches(&batches).write_tsv_file(&layout.assignment_table())?;
    info!(
        project = layout.project_name(),
        records = catalog.len(),
        batches = batches.len(),
        "partitioned ensembles"
    );

    let relocator = Relocator::new(config.relocation);
    let mut log = MoveLog::new();
    let mut outcomes = Vec::with_capacity(batches.len());
    let mut cancelled = false;
    for batch in &batches {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let outcome = relocator.relocate(batch, &mut log, cancel);
        cancelled = outcome.cancelled;
        outcomes.push(outcome);
        if cancelled {
            break;
        }
    }
    if cancelled {
        warn!(project = layout.project_name(), "relocation cancelled");
    }
    // Failures are persisted before anything else can abort the directory.
    log.append_to_file(&layout.error_log())?;

    let rows: Vec<SummaryRow> = batches
        .iter()
        .map(|b| SummaryRow::from_batch(b, layout.project_root()))
        .collect();
    table::write_table_file(&layout.batch_summary_table(), &rows)?;

    let summary = BatchSummary {
        output_base: &batches_root,
        project_root: layout.project_root(),
        config: &config.partition,
        batches: &batches,
        outcomes: &outcomes,
        skipped: &skipped,
        failures: log.entries(),
    };
    report::write_report_file(&layout.batch_report(), |out| {
        report::write_batch_report(out, &summary)
    })?;

    Ok(BatchReport {
        batches,
        outcomes,
        failures: log.entries().to_vec(),
        skipped,
        batches_root,
        cancelled,
    })
}

#[derive(Debug)]
pub enum DirectoryOutcome {
    Completed {
        layout: SourceLayout,
        analysis: Option<AnalysisReport>,
        batch: Option<BatchReport>,
    },
    Failed(Error),
    /// Not started because the run was cancelled.
    Cancelled,
}

#[derive(Debug)]
pub struct DirectoryResult {
    pub path: PathBuf,
    pub outcome: DirectoryOutcome,
}

/// Per-directory results of a run, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub directories: Vec<DirectoryResult>,
}

impl RunSummary {
    pub fn push(&mut self, result: DirectoryResult) {
        self.directories.push(result);
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::Completed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::Cancelled))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&DirectoryOutcome) -> bool) -> usize {
        self.directories.iter().filter(|d| pred(&d.outcome)).count()
    }
}

/// Runs `mode` on a single path; errors end up in the outcome.
pub fn run_directory(
    path: &Path,
    config: &PipelineConfig,
    mode: RunMode,
    cancel: &CancelFlag,
) -> DirectoryResult {
    let outcome = if cancel.is_cancelled() {
        DirectoryOutcome::Cancelled
    } else {
        match process(path, config, mode, cancel) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(path = %path.display(), "directory failed: {e}");
                DirectoryOutcome::Failed(e)
            }
        }
    };
    DirectoryResult {
        path: path.to_path_buf(),
        outcome,
    }
}

fn process(
    path: &Path,
    config: &PipelineConfig,
    mode: RunMode,
    cancel: &CancelFlag,
) -> Result<DirectoryOutcome, Error> {
    let layout = SourceLayout::resolve(path, &config.source_prefix)?;
    debug!(
        project = layout.project_name(),
        source = %layout.source_directory().display(),
        "resolved source layout"
    );

    let (analysis, batch) = match mode {
        RunMode::Analyze => (Some(analyze_directory(&layout, config)?), None),
        RunMode::Batch => (None, Some(batch_directory(&layout, config, cancel)?)),
        RunMode::Full => {
            let analysis = analyze_directory(&layout, config)?;
            let batch = batch_catalog(
                &layout,
                &analysis.catalog,
                analysis.skipped.clone(),
                config,
                cancel,
            )?;
            (Some(analysis), Some(batch))
        }
    };

    Ok(DirectoryOutcome::Completed {
        layout,
        analysis,
        batch,
    })
}

/// Processes every configured source in order.
///
/// Configuration errors abort before any directory is touched; anything
/// that goes wrong afterwards is confined to its directory.
pub fn run(config: &PipelineConfig, mode: RunMode, cancel: &CancelFlag) -> Result<RunSummary, Error> {
    config.validate()?;

    let mut summary = RunSummary::default();
    for path in &config.sources {
        summary.push(run_directory(path, config, mode, cancel));
    }
    Ok(summary)
}
