use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_pipeline_hints(err);
        collector.collect_io_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_pipeline_hints(&mut self, err: &Error) {
        use ped_batch::pipeline::Error as PipelineError;

        let Some(pipeline_err) = err.downcast_ref::<PipelineError>() else {
            return;
        };

        self.mark_typed();

        match pipeline_err {
            PipelineError::MissingInputArtifact { what, .. } => {
                self.add(format!("The {what} is written by the analysis step"));
                self.add("Run `pbatch analyze` on this directory first");
                self.add("Or pass --rescan to characterize the files again");
            }

            PipelineError::SourceNotFound { .. } => {
                self.add("Check the path spelling and that the directory exists");
                self.add(
                    "Pass either the project directory or the completed_* directory inside it",
                );
            }

            PipelineError::Config(_) => {
                self.add("The configuration file has invalid TOML or an unknown key");
                self.add("Known keys: sources, extension, source_prefix, relocation, rescan, [partition], [partition.bins]");
            }

            PipelineError::InvalidConfig(_) => {
                self.add("Bin width, ceiling, threshold, batch counts and sizes must all be at least 1");
                self.add(format!("The bin ceiling may not exceed {}", ped_batch::batch::MAX_BIN_CEILING));
                self.add("Check the values given on the command line and in --config");
            }

            PipelineError::Io(io_err) => {
                self.collect_io_error_hints(io_err);
            }
        }
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use ped_batch::io::Error as IoError;

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();
        self.collect_io_error_hints(io_err);
    }

    fn collect_io_error_hints(&mut self, io_err: &ped_batch::io::Error) {
        use ped_batch::io::{Error as IoError, Format};

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, line, .. } => {
                self.add(format!("{format} parser stopped near line {line}"));
                match format {
                    Format::Pdb => {
                        self.add("PDB: ATOM records need the chain (col 22) and residue number (cols 23-26)");
                        self.add("PDB: Files must be plain UTF-8 or ASCII text");
                    }
                    Format::Tsv => {
                        self.add("TSV: Check for negative or non-numeric size and length values");
                        self.add("Re-run `pbatch analyze` to regenerate the catalog table");
                    }
                }
            }

            IoError::Table { table, .. } => {
                self.add(format!("The {table} table could not be read or written"));
                self.add("Tables must be tab-separated with a header row");
            }

            IoError::MissingColumn { column, .. } => {
                self.add(format!("Add a '{column}' column or regenerate the table"));
                self.add("Catalog tables need file, size_MB (or size_bytes) and avg_length (or residue_count)");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check that the path is correct and still exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied");
                self.add("Check write access to the results directory with `ls -la`");
            }

            ErrorKind::AlreadyExists => {
                self.add("A batch directory already holds a file with this name");
                self.add("Remove earlier batch output before re-running");
            }

            ErrorKind::StorageFull | ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space; --copy needs room for a second copy");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check paths, permissions and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("directories failed") {
            self.add("Each failed directory is reported above");
            self.add("Completed directories keep their results; re-run only the failed ones");
            return;
        }

        if msg.contains("no source directories") {
            self.add("Example: pbatch run /data/AlphaFlex-IDPCG_cat2");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the path is correct");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = err.to_string();

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
