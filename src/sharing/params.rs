//! Threshold parameters.

use core::fmt;
use super::ShareError;

/// A validated `(parties, threshold)` pair.
///
/// `threshold` shares out of `parties` reconstruct the key. The honest
/// majority condition `parties ≥ 2·threshold − 1` is enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdParameters {
    parties: u32,
    threshold: u32,
}

impl ThresholdParameters {
    pub fn new(parties: u32, threshold: u32) -> Result<Self, ShareError> {
        let invalid = ShareError::InvalidParameters { parties, threshold };
        if parties == 0 || threshold == 0 {
            return Err(invalid);
        }
        if u64::from(parties) + 1 < 2 * u64::from(threshold) {
            return Err(invalid);
        }
        Ok(Self { parties, threshold })
    }

    pub fn parties(&self) -> u32 {
        self.parties
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether `index` names a holder (`1..=parties`).
    pub fn is_valid_index(&self, index: u32) -> bool {
        index >= 1 && index <= self.parties
    }
}

impl fmt::Display for ThresholdParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-of-{}", self.threshold, self.parties)
    }
}
