//! Characterization and length-based batching of protein structure ensembles.
//!
//! An ensemble is a multi-model PDB file. For every file in a source directory
//! the crate records its size on disk and the number of residues in its first
//! model, then partitions the collection into size-bounded batches by sequence
//! length and moves (or copies) each batch into its own directory. Every step
//! leaves a tab-separated table or a text report behind, so a project can be
//! analyzed once and batched later.
//!
//! # Features
//!
//! - **First-model extraction**: residue counts come from the atoms between
//!   the first `MODEL`/`ENDMDL` pair, or from the whole file when it has no
//!   model records
//! - **Two-regime partitioning**: short chains are split into a fixed number of
//!   balanced groups, long chains are binned by length and chunked
//! - **Isolated failures**: an unreadable file or a failed move is logged and
//!   skipped, never fatal to the batch or the run
//! - **Persistent artifacts**: catalog, statistics, assignment and summary
//!   tables plus human-readable reports
//!
//! # Quick Start
//!
//! Partitioning works on records alone, so it can be tried without touching
//! the filesystem:
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use ped_batch::{EnsembleRecord, PartitionConfig, partition};
//!
//! let source: Arc<Path> = Arc::from(Path::new("/data/completed_set"));
//! let records: Vec<EnsembleRecord> = [50, 150, 610, 620, 700]
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, len)| EnsembleRecord::new(format!("ens{i}.pdb"), 1 << 20, len, source.clone()))
//!     .collect();
//!
//! let config = PartitionConfig {
//!     max_batch_size: 2,
//!     ..PartitionConfig::default()
//! };
//! let batches = partition(&records, &config, Path::new("/data/results/batches_by_length"));
//!
//! let ids: Vec<&str> = batches.iter().map(|b| b.batch_id()).collect();
//! assert_eq!(ids, ["1-600_01", "1-600_02", "601-650", "651-700"]);
//! assert_eq!(batches[2].len(), 2);
//! assert_eq!(
//!     batches[3].destination(),
//!     Path::new("/data/results/batches_by_length/batch_651-700")
//! );
//! ```
//!
//! Whole projects are processed with [`pipeline::run`], or step by step with
//! [`pipeline::analyze_directory`] and [`pipeline::batch_directory`].
//!
//! # Module Organization
//!
//! - [`io`]: PDB extraction, tables and reports
//! - [`catalog`]: per-directory characterization
//! - [`batch`]: binning and partitioning
//! - [`relocate`]: moving batch members and logging failures
//! - [`pipeline`]: project layout, configuration and the run driver

mod cancel;
mod ledger;
mod model;
mod stats;

pub mod batch;
pub mod catalog;
pub mod io;
pub mod pipeline;
pub mod relocate;

pub use cancel::CancelFlag;
pub use ledger::{AssignmentEntry, AssignmentLedger};
pub use model::batch::{Batch, BatchStats, Regime, SubIndex};
pub use model::bin::{ParseBinLabelError, SequenceBin};
pub use model::record::{BYTES_PER_MB, EnsembleRecord, bytes_to_mb, mb_to_bytes};
pub use stats::{CatalogStats, LengthDistribution, Summary};

pub use batch::{BinScheme, ConfigError, PartitionConfig, partition};
pub use catalog::{CatalogBuild, EnsembleCatalog, SkippedFile};
pub use pipeline::{PipelineConfig, RunMode, RunSummary, SourceLayout};
pub use relocate::{MoveLog, MoveLogEntry, RelocationMode, RelocationOutcome, Relocator};
