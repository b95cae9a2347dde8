//! Moving or copying batch members into their destination directories.
//!
//! A failure to relocate one file never aborts the batch: it is recorded in
//! the [`MoveLog`] and the next member is processed.

mod movelog;

pub use movelog::{MoveLog, MoveLogEntry};

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::model::batch::Batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelocationMode {
    /// Rename into place, copying and removing across filesystems. The
    /// source directory loses the file; a second run cannot redo the move.
    #[default]
    Move,
    /// Copy, leaving the source intact.
    Copy,
}

/// Tally for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationOutcome {
    pub batch_id: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Set when cancellation stopped the batch before its last member.
    pub cancelled: bool,
}

impl RelocationOutcome {
    fn new(batch_id: &str) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            cancelled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relocator {
    mode: RelocationMode,
}

impl Relocator {
    pub fn new(mode: RelocationMode) -> Self {
        Self { mode }
    }

    #[inline]
    pub fn mode(&self) -> RelocationMode {
        self.mode
    }

    /// Relocates every member of `batch` into its destination directory.
    ///
    /// An existing file at the destination is never overwritten; it is
    /// logged as a collision. If the destination directory cannot be
    /// created, every member is logged as failed.
    pub fn relocate(&self, batch: &Batch, log: &mut MoveLog, cancel: &CancelFlag) -> RelocationOutcome {
        let mut outcome = RelocationOutcome::new(batch.batch_id());
        let destination = batch.destination();

        let dir_error = fs::create_dir_all(destination).err();
        if let Some(e) = &dir_error {
            warn!(
                batch = batch.batch_id(),
                path = %destination.display(),
                "cannot create batch directory: {e}"
            );
        }

        for member in batch.members() {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            outcome.attempted += 1;

            let source = member.source_path();
            let target = destination.join(&member.filename);
            let result = match &dir_error {
                Some(e) => Err(io::Error::new(
                    e.kind(),
                    format!("cannot create batch directory: {e}"),
                )),
                None => self.relocate_file(&source, &target),
            };

            match result {
                Ok(()) => outcome.succeeded += 1,
                Err(e) => {
                    outcome.failed += 1;
                    if dir_error.is_none() {
                        warn!(
                            source = %source.display(),
                            destination = %target.display(),
                            "relocation failed: {e}"
                        );
                    }
                    log.record(source, target, e.to_string());
                }
            }
        }

        debug!(
            batch = batch.batch_id(),
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "relocated batch"
        );
        outcome
    }

    fn relocate_file(&self, source: &Path, target: &Path) -> io::Result<()> {
        if fs::symlink_metadata(target).is_ok() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                "destination file already exists",
            ));
        }

        match self.mode {
            RelocationMode::Copy => copy_new(source, target),
            RelocationMode::Move => match fs::rename(source, target) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                    copy_new(source, target)?;
                    fs::remove_file(source).map_err(source_not_removed)
                }
                Err(e) => Err(e),
            },
        }
    }
}

/// Copies `source` to a file that must not exist yet, keeping permissions.
fn copy_new(source: &Path, target: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let permissions = input.metadata()?.permissions();
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;

    let written = io::copy(&mut input, &mut output).and_then(|_| output.set_permissions(permissions));
    if let Err(e) = written {
        drop(output);
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

/// The copy is complete at the destination but the source still exists.
fn source_not_removed(e: io::Error) -> io::Error {
    io::Error::new(
        e.kind(),
        format!("copied to destination but source not removed: {e}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::batch::Regime;
    use crate::model::bin::SequenceBin;
    use crate::model::record::EnsembleRecord;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Fixture {
        _tmp: tempfile::TempDir,
        source: PathBuf,
        root: PathBuf,
    }

    fn fixture(names: &[&str]) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("completed_x");
        let root = tmp.path().join("results").join("batches_by_length");
        fs::create_dir_all(&source).unwrap();
        for name in names {
            fs::write(source.join(name), format!("content of {name}")).unwrap();
        }
        Fixture {
            _tmp: tmp,
            source,
            root,
        }
    }

    fn batch(fx: &Fixture, names: &[&str]) -> Batch {
        let dir: Arc<Path> = Arc::from(fx.source.as_path());
        let members = names
            .iter()
            .map(|n| EnsembleRecord::new(*n, 10, 700, dir.clone()))
            .collect();
        Batch::seal(
            SequenceBin::closed(651, 700),
            None,
            Regime::Long,
            members,
            &fx.root,
        )
    }

    #[test]
    fn move_relocates_and_empties_source() {
        let fx = fixture(&["a.pdb", "b.pdb"]);
        let batch = batch(&fx, &["a.pdb", "b.pdb"]);
        let mut log = MoveLog::new();

        let outcome = Relocator::new(RelocationMode::Move).relocate(&batch, &mut log, &CancelFlag::new());

        assert_eq!(outcome.succeeded, 2);
        assert!(log.is_empty());
        assert!(!fx.source.join("a.pdb").exists());
        assert_eq!(
            fs::read_to_string(fx.root.join("batch_651-700").join("a.pdb")).unwrap(),
            "content of a.pdb"
        );
    }

    #[test]
    fn copy_leaves_source_intact() {
        let fx = fixture(&["a.pdb"]);
        let batch = batch(&fx, &["a.pdb"]);
        let mut log = MoveLog::new();

        let outcome = Relocator::new(RelocationMode::Copy).relocate(&batch, &mut log, &CancelFlag::new());

        assert_eq!(outcome.succeeded, 1);
        assert!(fx.source.join("a.pdb").exists());
        assert!(batch.destination().join("a.pdb").exists());
    }

    #[test]
    fn one_missing_file_among_ten_is_isolated() {
        let names: Vec<String> = (0..10).map(|i| format!("f{i}.pdb")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let fx = fixture(&refs);
        fs::remove_file(fx.source.join("f4.pdb")).unwrap();
        let batch = batch(&fx, &refs);
        let mut log = MoveLog::new();

        let outcome = Relocator::default().relocate(&batch, &mut log, &CancelFlag::new());

        assert_eq!(outcome.attempted, 10);
        assert_eq!(outcome.succeeded, 9);
        assert_eq!(outcome.failed, 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].source, fx.source.join("f4.pdb"));
        assert!(batch.destination().join("f9.pdb").exists());
    }

    #[test]
    fn existing_destination_is_a_collision() {
        for mode in [RelocationMode::Move, RelocationMode::Copy] {
            let fx = fixture(&["a.pdb"]);
            let batch = batch(&fx, &["a.pdb"]);
            fs::create_dir_all(batch.destination()).unwrap();
            fs::write(batch.destination().join("a.pdb"), "already here").unwrap();
            let mut log = MoveLog::new();

            let outcome = Relocator::new(mode).relocate(&batch, &mut log, &CancelFlag::new());

            assert_eq!(outcome.failed, 1, "{mode:?}");
            assert!(log.entries()[0].message.contains("already exists"));
            assert_eq!(
                fs::read_to_string(batch.destination().join("a.pdb")).unwrap(),
                "already here"
            );
            assert!(fx.source.join("a.pdb").exists());
        }
    }

    #[test]
    fn unusable_destination_fails_each_member() {
        let fx = fixture(&["a.pdb", "b.pdb"]);
        fs::create_dir_all(fx.root.parent().unwrap()).unwrap();
        fs::write(&fx.root, "not a directory").unwrap();
        let batch = batch(&fx, &["a.pdb", "b.pdb"]);
        let mut log = MoveLog::new();

        let outcome = Relocator::default().relocate(&batch, &mut log, &CancelFlag::new());

        assert_eq!(outcome.failed, 2);
        assert_eq!(log.len(), 2);
        assert!(fx.source.join("a.pdb").exists());
    }

    #[test]
    fn copy_new_refuses_existing_target_and_keeps_it() {
        let fx = fixture(&["a.pdb"]);
        fs::create_dir_all(&fx.root).unwrap();
        let target = fx.root.join("a.pdb");
        fs::write(&target, "kept").unwrap();

        let err = copy_new(&fx.source.join("a.pdb"), &target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&target).unwrap(), "kept");
    }

    #[test]
    fn failed_copy_leaves_no_partial_target() {
        let fx = fixture(&[]);
        fs::create_dir_all(&fx.root).unwrap();
        let target = fx.root.join("a.pdb");

        assert!(copy_new(&fx.source, &target).is_err());
        assert!(!target.exists());
    }

    #[test]
    fn unremoved_source_is_named_in_the_message() {
        let e = source_not_removed(io::Error::new(ErrorKind::PermissionDenied, "read-only"));
        assert_eq!(e.kind(), ErrorKind::PermissionDenied);
        assert_eq!(
            e.to_string(),
            "copied to destination but source not removed: read-only"
        );
    }

    #[test]
    fn cancelled_flag_stops_before_first_member() {
        let fx = fixture(&["a.pdb"]);
        let batch = batch(&fx, &["a.pdb"]);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut log = MoveLog::new();

        let outcome = Relocator::default().relocate(&batch, &mut log, &cancel);

        assert!(outcome.cancelled);
        assert_eq!(outcome.attempted, 0);
        assert!(fx.source.join("a.pdb").exists());
    }
}
