//! Superset relation index between archetypes.
//!
//! Every archetype caches the archetypes whose signature contains its own
//! (see [`Archetype::related`]). A query for signature `S` resolves the
//! archetype of `S` and walks that list instead of testing every archetype.
//!
//! The cache is maintained incrementally: creating an archetype compares it
//! once against every existing one, destroying it removes it from every
//! list. Archetypes are created rarely compared to how often they are
//! queried, so the O(n) pass per creation is cheap overall.

use crate::{
    archetype::{Archetype, ArchetypeId},
    signature::Signature,
};

/// How two distinct signatures relate under set inclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    /// The first signature is a strict superset of the second.
    Superset,
    /// The first signature is a strict subset of the second.
    Subset,
    /// Neither contains the other.
    Unrelated,
}

impl Containment {
    /// Classify `a` against `b`.
    ///
    /// Equal signatures never reach this: the registry maps each signature
    /// to a single archetype.
    #[must_use]
    pub fn of(a: &Signature, b: &Signature) -> Self {
        debug_assert_ne!(a, b, "distinct archetypes share a signature");
        if b.is_subset_of(a) {
            Self::Superset
        } else if a.is_subset_of(b) {
            Self::Subset
        } else {
            Self::Unrelated
        }
    }
}

/// Link the last archetype of `archetypes`, which was just created, with
/// every archetype before it. Returns the number of links added.
pub(crate) fn link_newest(archetypes: &mut [Archetype]) -> usize {
    let Some((newest, existing)) = archetypes.split_last_mut() else {
        return 0;
    };

    let mut links = 0;
    for other in existing {
        match Containment::of(newest.signature(), other.signature()) {
            // Entities of `newest` satisfy queries issued against `other`.
            Containment::Superset => other.link(newest.id()),
            Containment::Subset => newest.link(other.id()),
            Containment::Unrelated => continue,
        }
        links += 1;
    }
    links
}

/// Remove `removed` from every cached relation list.
pub(crate) fn unlink(archetypes: &mut [Archetype], removed: ArchetypeId) {
    for archetype in archetypes {
        archetype.unlink(removed);
    }
}
