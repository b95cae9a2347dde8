use std::collections::BTreeMap;
use std::path::Path;

use super::config::PartitionConfig;
use crate::model::batch::{Batch, Regime, SubIndex};
use crate::model::bin::SequenceBin;
use crate::model::record::EnsembleRecord;

/// Partitions `records` into sealed batches rooted at `batches_root`.
///
/// Every record lands in exactly one batch. Short-regime batches come first,
/// followed by long-regime batches in ascending bin order. `config` is
/// expected to have passed [`PartitionConfig::validate`].
pub fn partition(
    records: &[EnsembleRecord],
    config: &PartitionConfig,
    batches_root: &Path,
) -> Vec<Batch> {
    let (short, long): (Vec<_>, Vec<_>) = records
        .iter()
        .cloned()
        .partition(|r| r.residue_count <= config.length_threshold);

    let mut batches = split_short(short, config, batches_root);
    batches.extend(chunk_long(long, config, batches_root));
    batches
}

/// Stable sort by length, then `K` contiguous groups whose sizes differ by at
/// most one (larger groups first).
fn split_short(
    mut records: Vec<EnsembleRecord>,
    config: &PartitionConfig,
    batches_root: &Path,
) -> Vec<Batch> {
    records.sort_by_key(|r| r.residue_count);

    let groups = config.short_batch_count;
    let base = records.len() / groups;
    let extra = records.len() % groups;
    let bin = SequenceBin::closed(1, config.length_threshold);

    let mut remaining = records.into_iter();
    (0..groups)
        .filter_map(|i| {
            let size = base + usize::from(i < extra);
            if size == 0 {
                return None;
            }
            let members: Vec<_> = remaining.by_ref().take(size).collect();
            Some(Batch::seal(
                bin,
                Some(SubIndex::new(i + 1, groups)),
                Regime::Short,
                members,
                batches_root,
            ))
        })
        .collect()
}

fn chunk_long(
    mut records: Vec<EnsembleRecord>,
    config: &PartitionConfig,
    batches_root: &Path,
) -> Vec<Batch> {
    if config.sort_long_by_length {
        records.sort_by_key(|r| r.residue_count);
    }

    let mut by_bin: BTreeMap<SequenceBin, Vec<EnsembleRecord>> = BTreeMap::new();
    for record in records {
        by_bin
            .entry(config.bins.bin_for(record.residue_count))
            .or_default()
            .push(record);
    }

    let mut batches = Vec::new();
    for (bin, members) in by_bin {
        let chunk_count = members.len().div_ceil(config.max_batch_size);
        if chunk_count == 1 {
            batches.push(Batch::seal(
                bin,
                None,
                Regime::Long,
                members,
                batches_root,
            ));
            continue;
        }
        for (i, chunk) in members.chunks(config.max_batch_size).enumerate() {
            batches.push(Batch::seal(
                bin,
                Some(SubIndex::new(i + 1, chunk_count)),
                Regime::Long,
                chunk.to_vec(),
                batches_root,
            ));
        }
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BinScheme;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn records(lengths: &[usize]) -> Vec<EnsembleRecord> {
        let dir: Arc<Path> = Arc::from(PathBuf::from("/src").as_path());
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| EnsembleRecord::new(format!("f{i:03}.pdb"), 1000, len, dir.clone()))
            .collect()
    }

    fn lengths(batch: &Batch) -> Vec<usize> {
        batch.members().iter().map(|r| r.residue_count).collect()
    }

    fn root() -> PathBuf {
        PathBuf::from("/out/batches_by_length")
    }

    #[test]
    fn mixed_scenario_splits_regimes_and_chunks_bins() {
        let config = PartitionConfig {
            length_threshold: 600,
            max_batch_size: 2,
            bins: BinScheme::new(50, 2500),
            ..PartitionConfig::default()
        };
        let batches = partition(&records(&[50, 150, 610, 620, 700]), &config, &root());

        assert_eq!(batches.len(), 4);
        assert_eq!(lengths(&batches[0]), [50]);
        assert_eq!(lengths(&batches[1]), [150]);
        assert!(batches[..2].iter().all(|b| b.regime() == Regime::Short));
        assert_eq!(batches[0].batch_id(), "1-600_01");
        assert_eq!(batches[1].batch_id(), "1-600_02");

        assert_eq!(batches[2].batch_id(), "601-650");
        assert_eq!(lengths(&batches[2]), [610, 620]);
        assert_eq!(batches[3].batch_id(), "651-700");
        assert_eq!(lengths(&batches[3]), [700]);
        assert_eq!(
            batches[3].destination(),
            Path::new("/out/batches_by_length/batch_651-700")
        );
    }

    #[test]
    fn every_record_lands_in_exactly_one_batch() {
        let input: Vec<usize> = (0..500).map(|i| (i * 37) % 3100).collect();
        let recs = records(&input);
        let config = PartitionConfig {
            max_batch_size: 7,
            ..PartitionConfig::default()
        };
        let batches = partition(&recs, &config, &root());

        let total: usize = batches.iter().map(Batch::len).sum();
        assert_eq!(total, recs.len());

        let names: HashSet<&str> = batches
            .iter()
            .flat_map(|b| b.members().iter().map(|r| r.filename.as_str()))
            .collect();
        assert_eq!(names.len(), recs.len());
    }

    #[test]
    fn long_batches_respect_size_bound() {
        let input = vec![700; 23];
        let config = PartitionConfig {
            max_batch_size: 5,
            ..PartitionConfig::default()
        };
        let batches = partition(&records(&input), &config, &root());

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, [5, 5, 5, 5, 3]);
        let ids: Vec<&str> = batches.iter().map(Batch::batch_id).collect();
        assert_eq!(
            ids,
            ["651-700_01", "651-700_02", "651-700_03", "651-700_04", "651-700_05"]
        );
        assert_eq!(
            batches[4].destination(),
            Path::new("/out/batches_by_length/batch_651-700_05")
        );
    }

    #[test]
    fn sub_index_width_grows_with_chunk_count() {
        let input = vec![900; 101];
        let config = PartitionConfig {
            max_batch_size: 1,
            ..PartitionConfig::default()
        };
        let batches = partition(&records(&input), &config, &root());
        assert_eq!(batches.len(), 101);
        assert_eq!(batches[0].batch_id(), "851-900_001");
        assert_eq!(batches[100].batch_id(), "851-900_101");
    }

    #[test]
    fn short_regime_is_balanced_and_ordered() {
        let input = [300, 10, 200, 10, 50, 600, 5, 400, 100, 1];
        let batches = partition(&records(&input), &PartitionConfig::default(), &root());

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, [3, 3, 2, 2]);

        let flattened: Vec<usize> = batches.iter().flat_map(lengths).collect();
        let mut sorted = input.to_vec();
        sorted.sort();
        assert_eq!(flattened, sorted);
    }

    #[test]
    fn short_regime_sort_is_stable() {
        let recs = records(&[20, 10, 20, 10]);
        let config = PartitionConfig {
            short_batch_count: 1,
            ..PartitionConfig::default()
        };
        let batches = partition(&recs, &config, &root());
        let names: Vec<&str> = batches[0]
            .members()
            .iter()
            .map(|r| r.filename.as_str())
            .collect();
        assert_eq!(names, ["f001.pdb", "f003.pdb", "f000.pdb", "f002.pdb"]);
    }

    #[test]
    fn fewer_short_records_than_groups_skips_empty_groups() {
        let batches = partition(&records(&[5, 6]), &PartitionConfig::default(), &root());
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn threshold_is_inclusive_for_short_regime() {
        let batches = partition(&records(&[600, 601]), &PartitionConfig::default(), &root());
        assert_eq!(batches[0].regime(), Regime::Short);
        assert_eq!(lengths(&batches[0]), [600]);
        assert_eq!(batches[1].regime(), Regime::Long);
        assert_eq!(batches[1].batch_id(), "601-650");
    }

    #[test]
    fn long_bins_are_emitted_in_ascending_order() {
        let batches = partition(
            &records(&[3000, 700, 1200, 650]),
            &PartitionConfig::default(),
            &root(),
        );
        let ids: Vec<&str> = batches.iter().map(Batch::batch_id).collect();
        assert_eq!(ids, ["601-650", "651-700", "1151-1200", ">2500"]);
        assert_eq!(
            batches[3].destination(),
            Path::new("/out/batches_by_length/batch_gt2500")
        );
    }

    #[test]
    fn keep_order_leaves_long_members_in_input_order() {
        let config = PartitionConfig {
            sort_long_by_length: false,
            ..PartitionConfig::default()
        };
        let batches = partition(&records(&[640, 610, 630]), &config, &root());
        assert_eq!(lengths(&batches[0]), [640, 610, 630]);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(partition(&[], &PartitionConfig::default(), &root()).is_empty());
    }
}
