use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::binner::{BinScheme, MAX_BIN_CEILING};

/// A partition setting that cannot produce a valid batch layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bin width must be at least 1")]
    ZeroBinWidth,

    #[error("bin ceiling must be at least 1")]
    ZeroBinCeiling,

    #[error("bin ceiling {ceiling} exceeds the supported maximum of {max}")]
    BinCeilingTooLarge { ceiling: usize, max: usize },

    #[error("length threshold must be at least 1")]
    ZeroLengthThreshold,

    #[error("short-regime batch count must be at least 1")]
    ZeroShortBatchCount,

    #[error("maximum batch size must be at least 1")]
    ZeroMaxBatchSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Records with `residue_count <= length_threshold` use the short regime.
    #[serde(default = "default_length_threshold")]
    pub length_threshold: usize,
    #[serde(default = "default_short_batch_count")]
    pub short_batch_count: usize,
    /// Upper bound on the size of a long-regime batch.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default)]
    pub bins: BinScheme,
    /// Sort long-regime records by length before binning.
    #[serde(default = "default_sort_long_by_length")]
    pub sort_long_by_length: bool,
}

fn default_length_threshold() -> usize {
    600
}
fn default_short_batch_count() -> usize {
    4
}
fn default_max_batch_size() -> usize {
    90
}
fn default_sort_long_by_length() -> bool {
    true
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            length_threshold: default_length_threshold(),
            short_batch_count: default_short_batch_count(),
            max_batch_size: default_max_batch_size(),
            bins: BinScheme::default(),
            sort_long_by_length: default_sort_long_by_length(),
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bins.width == 0 {
            return Err(ConfigError::ZeroBinWidth);
        }
        if self.bins.ceiling == 0 {
            return Err(ConfigError::ZeroBinCeiling);
        }
        if self.bins.ceiling > MAX_BIN_CEILING {
            return Err(ConfigError::BinCeilingTooLarge {
                ceiling: self.bins.ceiling,
                max: MAX_BIN_CEILING,
            });
        }
        if self.length_threshold == 0 {
            return Err(ConfigError::ZeroLengthThreshold);
        }
        if self.short_batch_count == 0 {
            return Err(ConfigError::ZeroShortBatchCount);
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroMaxBatchSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PartitionConfig::default();
        assert_eq!(config.length_threshold, 600);
        assert_eq!(config.short_batch_count, 4);
        assert_eq!(config.max_batch_size, 90);
        assert_eq!(config.bins, BinScheme::new(50, 2500));
        assert!(config.sort_long_by_length);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_settings_are_rejected() {
        let mut config = PartitionConfig::default();
        config.max_batch_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxBatchSize));

        let mut config = PartitionConfig::default();
        config.bins.width = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBinWidth));

        let mut config = PartitionConfig::default();
        config.short_batch_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroShortBatchCount));

        let mut config = PartitionConfig::default();
        config.length_threshold = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLengthThreshold));
    }

    #[test]
    fn oversized_ceiling_is_rejected() {
        let mut config = PartitionConfig::default();
        config.bins.ceiling = usize::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::BinCeilingTooLarge {
                ceiling: usize::MAX,
                max: MAX_BIN_CEILING,
            })
        );

        config.bins.ceiling = MAX_BIN_CEILING;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn smallest_threshold_label_parses_back() {
        let mut config = PartitionConfig::default();
        config.length_threshold = 1;
        assert!(config.validate().is_ok());
        let label = format!("1-{}", config.length_threshold);
        let bin = crate::model::bin::SequenceBin::from_label(&label).expect("label");
        assert_eq!(bin.label(), label);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: PartitionConfig = toml::from_str(
            r#"
            max_batch_size = 25

            [bins]
            width = 100
            "#,
        )
        .expect("parse");
        assert_eq!(config.max_batch_size, 25);
        assert_eq!(config.length_threshold, 600);
        assert_eq!(config.bins, BinScheme::new(100, 2500));
    }
}
