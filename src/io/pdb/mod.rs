//! PDB coordinate files.
//!
//! Only what the catalog needs is read: the on-disk size of a file and the
//! set of residues present in its first model.

mod reader;

pub use reader::{
    ModelScope, ResidueId, ResidueScan, StructureSummary, extract_record, scan_residues,
};
