use std::io::{self, Write};

use ped_batch::pipeline::{AnalysisReport, BatchReport, DirectoryOutcome};
use ped_batch::{Regime, RunSummary, SourceLayout};

use crate::util::text::{format_mb, truncate, truncate_left};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

const MAX_BATCH_ROWS: usize = 15;

pub fn print_analysis(layout: &SourceLayout, analysis: &AnalysisReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let total_bytes: u64 = analysis.catalog.records().iter().map(|r| r.size_bytes).sum();
    let mut rows = vec![
        (
            "Source",
            layout.source_directory().display().to_string(),
        ),
        ("Ensembles", analysis.catalog.len().to_string()),
        ("Skipped", analysis.skipped.len().to_string()),
        ("Total Size", format_mb(total_bytes)),
    ];
    if let Some(stats) = &analysis.stats {
        rows.push(("Median Size", format!("{:.2} MB", stats.size_mb.median)));
        rows.push((
            "Length Range",
            format!(
                "{:.0} – {:.0}",
                stats.residue_count.min, stats.residue_count.max
            ),
        ));
        rows.push(("Median Length", format!("{:.1}", stats.residue_count.median)));
    }

    print_kv_table(
        &mut out,
        &format!("Catalog · {}", layout.project_name()),
        &rows,
    );
}

pub fn print_batches(report: &BatchReport) {
    if report.batches.is_empty() {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let id_w = 16usize;
    let files_w = 6usize;
    let size_w = 11usize;
    let sep_overhead = 12;
    let len_w = SAFE_TABLE_WIDTH.saturating_sub(id_w + files_w + size_w + sep_overhead);

    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{INDENT}{l}{}{m}{}{m}{}{m}{}{r}",
            "─".repeat(id_w + 2),
            "─".repeat(files_w + 2),
            "─".repeat(size_w + 2),
            "─".repeat(len_w + 2),
        )
    };

    let _ = writeln!(out, "{INDENT}┌─ Batches ─┐");
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{INDENT}│ {:<id_w$} │ {:>files_w$} │ {:>size_w$} │ {:>len_w$} │",
        "Batch", "Files", "Size", "Avg len",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for batch in report.batches.iter().take(MAX_BATCH_ROWS) {
        let stats = batch.stats();
        let marker = match batch.regime() {
            Regime::Short => "·",
            Regime::Long => " ",
        };
        let id = format!("{marker}{}", batch.batch_id());
        let _ = writeln!(
            out,
            "{INDENT}│ {:<id_w$} │ {:>files_w$} │ {:>size_w$} │ {:>len_w$.1} │",
            truncate(&id, id_w),
            stats.n_files,
            format_mb(stats.total_size_bytes),
            stats.mean_residue_count,
        );
    }

    if report.batches.len() > MAX_BATCH_ROWS {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<id_w$} │ {:>files_w$} │ {:>size_w$} │ {:>len_w$} │",
            "...",
            "...",
            format!("({} more)", report.batches.len() - MAX_BATCH_ROWS),
            "",
        );
    }
    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));

    let mut rows = vec![
        ("Batches", report.batches.len().to_string()),
        ("Relocated", report.relocated().to_string()),
        ("Failed", report.failed().to_string()),
        (
            "Output",
            truncate_left(&report.batches_root.display().to_string(), 40),
        ),
    ];
    if report.cancelled {
        rows.push(("Status", "cancelled".to_string()));
    }
    print_kv_table(&mut out, "Relocation", &rows);
}

pub fn print_run_summary(summary: &RunSummary) {
    if summary.directories.len() < 2 {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Directories", summary.directories.len().to_string()),
        ("Completed", summary.completed().to_string()),
        ("Failed", summary.failed().to_string()),
    ];
    if summary.cancelled() > 0 {
        rows.push(("Not Started", summary.cancelled().to_string()));
    }
    for dir in &summary.directories {
        if let DirectoryOutcome::Failed(_) = dir.outcome {
            rows.push(("  ✗", truncate_left(&dir.path.display().to_string(), 40)));
        }
    }

    print_kv_table(&mut out, "Run Summary", &rows);
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate_left(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}
