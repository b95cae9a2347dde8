use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sequence bin label: '{0}'")]
pub struct ParseBinLabelError(String);

/// A residue-count interval `[lower, upper)`, or `[lower, ∞)` when unbounded.
///
/// Labels use the closed form a reader expects (`"51-100"`, `">2500"`). The
/// first bin starts at zero so that the bins of a scheme cover `[0, ∞)`;
/// its label still reads `"1-W"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceBin {
    lower: usize,
    upper: Option<usize>,
}

impl SequenceBin {
    /// Closed interval `[first, last]`; a `first` of 0 or 1 both denote the
    /// leading bin.
    pub fn closed(first: usize, last: usize) -> Self {
        let lower = if first <= 1 { 0 } else { first };
        Self {
            lower,
            upper: Some(last.max(lower) + 1),
        }
    }

    /// Every count strictly greater than `ceiling`.
    pub fn above(ceiling: usize) -> Self {
        Self {
            lower: ceiling + 1,
            upper: None,
        }
    }

    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> Option<usize> {
        self.upper
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.upper.is_none()
    }

    pub fn contains(&self, residue_count: usize) -> bool {
        residue_count >= self.lower && self.upper.is_none_or(|u| residue_count < u)
    }

    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{}-{}", self.lower.max(1), upper - 1),
            None => format!(">{}", self.lower - 1),
        }
    }

    /// Label usable as a directory name component (`>` becomes `gt`).
    pub fn safe_label(&self) -> String {
        self.label().replace('>', "gt")
    }

    pub fn from_label(label: &str) -> Result<Self, ParseBinLabelError> {
        label.parse()
    }
}

impl fmt::Display for SequenceBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for SequenceBin {
    type Err = ParseBinLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBinLabelError(s.to_string());
        let trimmed = s.trim();

        if let Some(rest) = trimmed
            .strip_prefix('>')
            .or_else(|| trimmed.strip_prefix("gt"))
        {
            let ceiling: usize = rest.parse().map_err(|_| err())?;
            if ceiling == usize::MAX {
                return Err(err());
            }
            return Ok(Self::above(ceiling));
        }

        let (first, last) = trimmed.split_once('-').ok_or_else(err)?;
        let first: usize = first.parse().map_err(|_| err())?;
        let last: usize = last.parse().map_err(|_| err())?;
        if last < first || last == usize::MAX {
            return Err(err());
        }
        Ok(Self::closed(first, last))
    }
}
