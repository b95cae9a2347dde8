use std::fs;
use std::path::{Path, PathBuf};

use super::error::Error;

const RESULTS_DIR: &str = "results";
const BATCHES_DIR: &str = "batches_by_length";

/// Where a project's inputs are and where its artifacts go.
///
/// A project directory holds its structure files in a sub-directory whose
/// name starts with the source prefix (`completed_...`) and receives its
/// artifacts under `results/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    project_root: PathBuf,
    source_directory: PathBuf,
    project_name: String,
}

impl SourceLayout {
    /// If `path` has a sub-directory starting with `source_prefix`, the first
    /// one in name order holds the structure files and `path` is the project.
    /// Otherwise `path` itself holds them and its parent is the project.
    pub fn resolve(path: &Path, source_prefix: &str) -> Result<Self, Error> {
        let path = fs::canonicalize(path).map_err(|_| Error::SourceNotFound {
            path: path.to_path_buf(),
        })?;
        if !path.is_dir() {
            return Err(Error::SourceNotFound { path });
        }

        let source = if source_prefix.is_empty() {
            None
        } else {
            find_source_dir(&path, source_prefix)?
        };

        let (project_root, source_directory) = match source {
            Some(source) => (path, source),
            None => {
                let parent = path.parent().unwrap_or(&path).to_path_buf();
                (parent, path)
            }
        };

        let project_name = project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());

        Ok(Self {
            project_root,
            source_directory,
            project_name,
        })
    }

    #[inline]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    #[inline]
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    #[inline]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn results_dir(&self) -> PathBuf {
        self.project_root.join(RESULTS_DIR)
    }

    pub fn batches_root(&self) -> PathBuf {
        self.results_dir().join(BATCHES_DIR)
    }

    pub fn catalog_table(&self) -> PathBuf {
        self.results_file("ensemble_analysis.tsv")
    }

    pub fn stats_table(&self) -> PathBuf {
        self.results_file("ensemble_summary_stats.tsv")
    }

    pub fn analysis_report(&self) -> PathBuf {
        self.results_file("summary_report.txt")
    }

    pub fn assignment_table(&self) -> PathBuf {
        self.batches_root().join("batch_assignment_by_length.tsv")
    }

    pub fn batch_summary_table(&self) -> PathBuf {
        self.batches_root().join("batch_summary_by_length.tsv")
    }

    pub fn batch_report(&self) -> PathBuf {
        self.batches_root().join("batch_report_by_length.txt")
    }

    pub fn error_log(&self) -> PathBuf {
        self.batches_root().join("relocation_errors.log")
    }

    fn results_file(&self, suffix: &str) -> PathBuf {
        self.results_dir()
            .join(format!("{}_{suffix}", self.project_name))
    }
}

fn find_source_dir(path: &Path, prefix: &str) -> Result<Option<PathBuf>, Error> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(prefix) && entry.path().is_dir() {
            candidates.push(entry.path());
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}
