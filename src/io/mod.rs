//! Reading structure files and reading/writing the pipeline's artifacts.
//!
//! - [`pdb`] extracts the per-file facts the catalog needs.
//! - [`table`] holds the tab-separated row types and their (de)serializers.
//! - [`report`] renders the plain-text reports written next to the tables.

use std::fmt;

pub mod error;
pub mod pdb;
pub mod report;
pub mod table;

pub use error::Error;

/// File formats the crate reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdb,
    Tsv,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Pdb => write!(f, "PDB"),
            Format::Tsv => write!(f, "TSV"),
        }
    }
}
