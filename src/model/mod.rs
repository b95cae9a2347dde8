//! Core data structures flowing through the batching pipeline.
//!
//! - [`record`] – One characterized structure file ([`EnsembleRecord`]).
//! - [`bin`] – Residue-count intervals ([`SequenceBin`]) used to group records.
//! - [`batch`] – Sealed groups of records bound for one output directory.
//!
//! Records are created once by the extractor and never mutated; batches are
//! assembled by [`crate::batch::partition`] and sealed with their aggregate
//! statistics at construction time.
//!
//! [`EnsembleRecord`]: record::EnsembleRecord
//! [`SequenceBin`]: bin::SequenceBin

pub mod batch;
pub mod bin;
pub mod record;
