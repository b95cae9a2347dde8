use anyhow::{Result, bail};

use ped_batch::pipeline::{
    AnalysisReport, BatchReport, DirectoryOutcome, DirectoryResult, run_directory,
};
use ped_batch::{CancelFlag, PipelineConfig, RelocationMode, RunMode, RunSummary};

use crate::display::{
    Context, Progress, print_analysis, print_batches, print_error, print_run_summary,
};
use crate::util::text::plural;

pub fn execute(config: &PipelineConfig, mode: RunMode, ctx: Context) -> Result<()> {
    let cancel = CancelFlag::new();
    let mut progress = Progress::new(ctx.interactive, config.sources.len());
    let mut summary = RunSummary::default();

    for path in &config.sources {
        let description = format!("{} {}", verb(mode), path.display());
        progress.step(&description);

        let result = run_directory(path, config, mode, &cancel);
        match &result.outcome {
            DirectoryOutcome::Completed {
                layout,
                analysis,
                batch,
            } => {
                progress.complete_step(&description, &substeps(config, analysis, batch));
                if ctx.interactive {
                    if let Some(analysis) = analysis {
                        print_analysis(layout, analysis);
                    }
                    if let Some(batch) = batch {
                        print_batches(batch);
                    }
                }
            }
            DirectoryOutcome::Failed(e) => {
                progress.fail_step(&description, &e.to_string());
            }
            DirectoryOutcome::Cancelled => {
                progress.fail_step(&description, "not started: run cancelled");
            }
        }
        summary.push(result);
    }

    if ctx.interactive {
        print_run_summary(&summary);
    }
    progress.finish(summary.failed());

    report_failures(summary)
}

fn verb(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Analyze => "Analyzing",
        RunMode::Batch => "Batching",
        RunMode::Full => "Processing",
    }
}

fn substeps(
    config: &PipelineConfig,
    analysis: &Option<AnalysisReport>,
    batch: &Option<BatchReport>,
) -> Vec<String> {
    let mut steps = Vec::new();

    if let Some(analysis) = analysis {
        let mut line = format!(
            "Characterized {}",
            plural(analysis.catalog.len(), "ensemble", "ensembles")
        );
        if !analysis.skipped.is_empty() {
            line.push_str(&format!(", skipped {}", analysis.skipped.len()));
        }
        steps.push(line);
        steps.push(format!("Wrote {}", analysis.catalog_table.display()));
    }

    if let Some(batch) = batch {
        steps.push(format!(
            "Partitioned {} into {}",
            plural(batch.record_count(), "file", "files"),
            plural(batch.batches.len(), "batch", "batches")
        ));
        let action = match config.relocation {
            RelocationMode::Move => "Moved",
            RelocationMode::Copy => "Copied",
        };
        let mut line = format!("{action} {}", plural(batch.relocated(), "file", "files"));
        if batch.failed() > 0 {
            line.push_str(&format!(", {} failed (see relocation_errors.log)", batch.failed()));
        }
        if batch.cancelled {
            line.push_str(", cancelled");
        }
        steps.push(line);
    }

    steps
}

/// Prints every per-directory error and fails if there was any.
fn report_failures(summary: RunSummary) -> Result<()> {
    let total = summary.directories.len();
    let mut failed = 0;

    for DirectoryResult { path, outcome } in summary.directories {
        if let DirectoryOutcome::Failed(e) = outcome {
            failed += 1;
            print_error(&anyhow::Error::new(e).context(format!("Failed to process {}", path.display())));
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} source directories failed");
    }
    Ok(())
}
