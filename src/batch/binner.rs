use serde::{Deserialize, Serialize};

use crate::model::bin::SequenceBin;

pub(crate) const DEFAULT_BIN_WIDTH: usize = 50;
pub(crate) const DEFAULT_BIN_CEILING: usize = 2500;
/// Largest accepted ceiling; keeps `bins()` small and `ceiling + 1` in range.
pub const MAX_BIN_CEILING: usize = 1_000_000;

/// Fixed-width residue-count bins with an open-ended bin above `ceiling`.
///
/// Bins are `[1, W]` (which also takes a count of zero), `[W+1, 2W]`, and so
/// on up to `ceiling`, followed by `(ceiling, ∞)`. A `ceiling` that is not a
/// multiple of `width` shortens the last closed bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinScheme {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_ceiling")]
    pub ceiling: usize,
}

fn default_width() -> usize {
    DEFAULT_BIN_WIDTH
}
fn default_ceiling() -> usize {
    DEFAULT_BIN_CEILING
}

impl Default for BinScheme {
    fn default() -> Self {
        Self {
            width: DEFAULT_BIN_WIDTH,
            ceiling: DEFAULT_BIN_CEILING,
        }
    }
}

impl BinScheme {
    pub fn new(width: usize, ceiling: usize) -> Self {
        Self { width, ceiling }
    }

    /// The bin holding `residue_count`. `width` must be non-zero.
    pub fn bin_for(&self, residue_count: usize) -> SequenceBin {
        if residue_count > self.ceiling {
            return SequenceBin::above(self.ceiling);
        }
        let k = residue_count.saturating_sub(1) / self.width;
        self.closed_bin(k)
    }

    /// Every bin of the scheme in ascending order, the open-ended one last.
    pub fn bins(&self) -> Vec<SequenceBin> {
        let closed = self.ceiling.div_ceil(self.width);
        (0..closed)
            .map(|k| self.closed_bin(k))
            .chain(std::iter::once(SequenceBin::above(self.ceiling)))
            .collect()
    }

    fn closed_bin(&self, k: usize) -> SequenceBin {
        let first = k * self.width + 1;
        let last = ((k + 1) * self.width).min(self.ceiling);
        SequenceBin::closed(first, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_on_multiples_of_width_close_their_bin() {
        let scheme = BinScheme::default();
        assert_eq!(scheme.bin_for(50).label(), "1-50");
        assert_eq!(scheme.bin_for(51).label(), "51-100");
        assert_eq!(scheme.bin_for(100).label(), "51-100");
        assert_eq!(scheme.bin_for(101).label(), "101-150");
    }

    #[test]
    fn zero_and_one_share_the_first_bin() {
        let scheme = BinScheme::default();
        assert_eq!(scheme.bin_for(0), scheme.bin_for(1));
        assert_eq!(scheme.bin_for(0).label(), "1-50");
    }

    #[test]
    fn counts_above_ceiling_are_unbounded() {
        let scheme = BinScheme::default();
        assert_eq!(scheme.bin_for(2500).label(), "2451-2500");
        let above = scheme.bin_for(2501);
        assert!(above.is_unbounded());
        assert_eq!(above.label(), ">2500");
        assert_eq!(scheme.bin_for(100_000), above);
    }

    #[test]
    fn every_count_is_in_its_bin() {
        let scheme = BinScheme::new(7, 40);
        for count in 0..200 {
            assert!(scheme.bin_for(count).contains(count), "count {count}");
        }
    }

    #[test]
    fn bins_cover_the_scheme_in_order() {
        let scheme = BinScheme::default();
        let bins = scheme.bins();
        assert_eq!(bins.len(), 51);
        assert_eq!(bins[0].label(), "1-50");
        assert_eq!(bins[49].label(), "2451-2500");
        assert_eq!(bins[50].label(), ">2500");
        assert!(bins.windows(2).all(|w| w[0] < w[1]));
        assert!(
            bins.windows(2)
                .all(|w| w[0].upper() == Some(w[1].lower()))
        );
    }

    #[test]
    fn uneven_ceiling_shortens_last_closed_bin() {
        let scheme = BinScheme::new(50, 120);
        let labels: Vec<String> = scheme.bins().iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["1-50", "51-100", "101-120", ">120"]);
        assert_eq!(scheme.bin_for(120).label(), "101-120");
        assert_eq!(scheme.bin_for(121).label(), ">120");
    }
}
