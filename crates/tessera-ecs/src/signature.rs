//! Archetype signatures.
//!
//! A signature is the sorted, de-duplicated set of component ids an
//! archetype stores. It always contains [`ComponentId::ENTITY`], so the
//! smallest possible signature is `[ENTITY]`.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use smallvec::SmallVec;

use crate::component::ComponentId;

const FOLD_SEED: u64 = 0xcbf2_9ce4_8422_2325;
const FOLD_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Sorted set of component ids identifying an archetype.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Signature {
    ids: SmallVec<[ComponentId; 8]>,
}

impl Signature {
    /// Build a signature from any id list. The entity column is added,
    /// then ids are sorted and duplicates dropped.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = ComponentId>) -> Self {
        let mut ids: SmallVec<[ComponentId; 8]> = ids.into_iter().collect();
        ids.push(ComponentId::ENTITY);
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// The signature of entities with no components.
    #[must_use]
    pub fn entity_only() -> Self {
        Self::new([])
    }

    /// The ids, sorted ascending. `ENTITY` is always first.
    #[must_use]
    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    /// Number of ids, the entity column included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: the entity column is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check whether `id` is part of this signature.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Check whether every id of `self` also appears in `other`.
    ///
    /// Both sides are sorted, so this is a single merge walk.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        if self.ids.len() > other.ids.len() {
            return false;
        }

        let mut theirs = other.ids.iter();
        'outer: for id in &self.ids {
            for candidate in theirs.by_ref() {
                if candidate == id {
                    continue 'outer;
                }
                if candidate > id {
                    return false;
                }
            }
            return false;
        }
        true
    }

    /// This signature with `extra` merged in.
    #[must_use]
    pub fn with(&self, extra: &[ComponentId]) -> Self {
        Self::new(self.ids.iter().chain(extra).copied())
    }

    /// This signature with `id` taken out.
    ///
    /// # Panics
    ///
    /// Panics if `id` is [`ComponentId::ENTITY`].
    #[must_use]
    pub fn without(&self, id: ComponentId) -> Self {
        assert_ne!(id, ComponentId::ENTITY, "the entity column cannot be removed");
        Self {
            ids: self.ids.iter().copied().filter(|&c| c != id).collect(),
        }
    }

    /// Iterative XOR/multiply fold over the sorted ids.
    #[must_use]
    pub fn fold_hash(&self) -> u64 {
        self.ids.iter().fold(FOLD_SEED, |hash, id| {
            (hash ^ u64::from(id.as_raw())).wrapping_mul(FOLD_PRIME)
        })
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fold_hash());
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.ids.iter().map(|id| id.as_raw()))
            .finish()
    }
}
