use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::batch::PartitionConfig;
use crate::relocate::RelocationMode;

pub const DEFAULT_EXTENSION: &str = "pdb";
pub const DEFAULT_SOURCE_PREFIX: &str = "completed_";

/// Settings for a whole run, usually read from a TOML file.
///
/// ```toml
/// sources = ["/data/AlphaFlex-IDPCG_cat2"]
/// relocation = "copy"
///
/// [partition]
/// max_batch_size = 60
///
/// [partition.bins]
/// width = 50
/// ceiling = 2500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Prefix of the sub-directory holding the structure files. Empty
    /// disables the lookup.
    #[serde(default = "default_source_prefix")]
    pub source_prefix: String,
    #[serde(default)]
    pub relocation: RelocationMode,
    /// Re-extract records instead of loading the catalog table when batching.
    #[serde(default)]
    pub rescan: bool,
    #[serde(default)]
    pub partition: PartitionConfig,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_source_prefix() -> String {
    DEFAULT_SOURCE_PREFIX.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            extension: default_extension(),
            source_prefix: default_source_prefix(),
            relocation: RelocationMode::default(),
            rescan: false,
            partition: PartitionConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(Error::InvalidConfig(
                "file extension must not be empty".to_string(),
            ));
        }
        self.partition.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.relocation, RelocationMode::Move);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_tables_override_selected_fields() {
        let config = PipelineConfig::from_toml_str(
            r#"
            sources = ["/data/a", "/data/b"]
            relocation = "copy"

            [partition]
            length_threshold = 400

            [partition.bins]
            ceiling = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.relocation, RelocationMode::Copy);
        assert_eq!(config.partition.length_threshold, 400);
        assert_eq!(config.partition.max_batch_size, 90);
        assert_eq!(config.partition.bins.width, 50);
        assert_eq!(config.partition.bins.ceiling, 3000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_toml_str("extention = \"pdb\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_partition_is_reported() {
        let config = PipelineConfig::from_toml_str("[partition]\nshort_batch_count = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
