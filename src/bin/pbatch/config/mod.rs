use anyhow::{Context, Result, bail};

use ped_batch::{PipelineConfig, RelocationMode};

use crate::cli::{BinOptions, PartitionOptions, RelocationOptions, SourceOptions};

/// Loads `--config` (or the defaults) and applies command-line overrides.
pub fn build_pipeline_config(
    source: &SourceOptions,
    bins: &BinOptions,
    partition: Option<&PartitionOptions>,
    relocation: Option<&RelocationOptions>,
    rescan: bool,
) -> Result<PipelineConfig> {
    let mut config = match &source.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if !source.paths.is_empty() {
        config.sources = source.paths.clone();
    }
    if let Some(ext) = &source.ext {
        config.extension = ext.clone();
    }
    if let Some(prefix) = &source.source_prefix {
        config.source_prefix = prefix.clone();
    }

    apply_bins(&mut config, bins);
    if let Some(opts) = partition {
        apply_partition(&mut config, opts);
    }
    if relocation.is_some_and(|r| r.copy) {
        config.relocation = RelocationMode::Copy;
    }
    config.rescan |= rescan;

    if config.sources.is_empty() {
        bail!(
            "No source directories given.\n\nPass one or more PATH arguments or list them under `sources` in --config."
        );
    }
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn apply_bins(config: &mut PipelineConfig, opts: &BinOptions) {
    if let Some(width) = opts.bin_width {
        config.partition.bins.width = width;
    }
    if let Some(ceiling) = opts.ceiling {
        config.partition.bins.ceiling = ceiling;
    }
}

fn apply_partition(config: &mut PipelineConfig, opts: &PartitionOptions) {
    if let Some(threshold) = opts.threshold {
        config.partition.length_threshold = threshold;
    }
    if let Some(k) = opts.short_batches {
        config.partition.short_batch_count = k;
    }
    if let Some(max) = opts.max_batch_size {
        config.partition.max_batch_size = max;
    }
    if opts.keep_order {
        config.partition.sort_long_by_length = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn source(paths: &[&str], config: Option<PathBuf>) -> SourceOptions {
        SourceOptions {
            paths: paths.iter().map(PathBuf::from).collect(),
            config,
            ext: None,
            source_prefix: None,
            quiet: false,
            verbose: 0,
        }
    }

    fn no_bins() -> BinOptions {
        BinOptions {
            bin_width: None,
            ceiling: None,
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pbatch.toml");
        fs::write(
            &file,
            "sources = [\"/from/file\"]\nrelocation = \"move\"\n[partition]\nmax_batch_size = 10\nlength_threshold = 300\n",
        )
        .unwrap();

        let partition = PartitionOptions {
            threshold: None,
            short_batches: Some(2),
            max_batch_size: Some(40),
            keep_order: true,
        };
        let config = build_pipeline_config(
            &source(&["/from/cli"], Some(file)),
            &no_bins(),
            Some(&partition),
            Some(&RelocationOptions { copy: true }),
            false,
        )
        .unwrap();

        assert_eq!(config.sources, [PathBuf::from("/from/cli")]);
        assert_eq!(config.partition.max_batch_size, 40);
        assert_eq!(config.partition.length_threshold, 300);
        assert_eq!(config.partition.short_batch_count, 2);
        assert!(!config.partition.sort_long_by_length);
        assert_eq!(config.relocation, RelocationMode::Copy);
    }

    #[test]
    fn sources_come_from_file_when_no_paths_given() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pbatch.toml");
        fs::write(&file, "sources = [\"/a\", \"/b\"]\n").unwrap();

        let config =
            build_pipeline_config(&source(&[], Some(file)), &no_bins(), None, None, true).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert!(config.rescan);
    }

    #[test]
    fn missing_sources_is_an_error() {
        assert!(build_pipeline_config(&source(&[], None), &no_bins(), None, None, false).is_err());
    }

    #[test]
    fn zero_bin_width_is_rejected() {
        let bins = BinOptions {
            bin_width: Some(0),
            ceiling: None,
        };
        assert!(build_pipeline_config(&source(&["/x"], None), &bins, None, None, false).is_err());
    }
}
