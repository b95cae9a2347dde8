//! Length-based batch partitioning.
//!
//! Records at or below the length threshold are split into a fixed number of
//! balanced groups; longer records are binned by residue count and each bin
//! is chunked so that no batch exceeds the configured size.

mod binner;
mod config;
mod partitioner;

pub use binner::{BinScheme, MAX_BIN_CEILING};
pub use config::{ConfigError, PartitionConfig};
pub use partitioner::partition;
