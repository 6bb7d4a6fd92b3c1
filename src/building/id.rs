use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a single building within a `BuildingRepository`.
///
/// Ids are assigned contiguously starting from `1`, in the enumeration order
/// of the accepted input footprints, and are stable for the lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub u32);

impl BuildingId {
    /// Build an id from a zero-based position in the repository.
    #[inline] pub fn from_index(index: usize) -> Self { Self(index as u32 + 1) }

    /// Zero-based position of this id in the repository.
    #[inline] pub fn index(self) -> usize { (self.0 as usize).wrapping_sub(1) }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuildingId({})", self.0)
    }
}
