use serde::{Deserialize, Serialize};

use tessera_core::{FragmentId, OwnerId};

/// Composite key addressing one fragment's metadata record and blob.
///
/// Both stores are keyed by the same (owner, id) pair; the metadata
/// store is additionally enumerable by owner alone, which any remote
/// backend must support with a partition/range-key (or equivalent
/// two-level) index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentKey {
    pub owner: OwnerId,
    pub id: FragmentId,
}

impl FragmentKey {
    /// Create a new fragment key.
    #[must_use]
    pub fn new(owner: impl Into<OwnerId>, id: impl Into<FragmentId>) -> Self {
        Self {
            owner: owner.into(),
            id: id.into(),
        }
    }

    /// Return the canonical string representation: `{owner}/{id}`.
    ///
    /// This is also the object key layout used by blob backends.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}/{}", self.owner, self.id)
    }
}

impl std::fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}
