//! Canonical integer labels for connected-component membership sets.
//!
//! A component is hashed through its membership indicator over all `N` nodes, so the hash does
//! not depend on the order in which members were discovered. The registry hands out dense labels
//! `0, 1, 2, …` in order of first sighting and never forgets or relabels an entry. Hash
//! collisions are not handled; a 64-bit hash is treated as collision-free.
use std::collections::hash_map::{
    DefaultHasher,
    Entry,
};
use std::collections::HashMap;
use std::hash::{
    Hash,
    Hasher,
};

/// Content hash of the membership indicator of `members` over `n` nodes.
///
/// Members must be `< n`.
pub fn membership_hash<'a, I>(n: usize, members: I) -> u64
where
    I: IntoIterator<Item = &'a usize>,
{
    hash_indicator(n, &indicator(n, members))
}

fn indicator<'a, I>(n: usize, members: I) -> Vec<u64>
where
    I: IntoIterator<Item = &'a usize>,
{
    let mut words = vec![0_u64; n.div_ceil(64)];
    for &node in members {
        words[node / 64] |= 1 << (node % 64);
    }
    words
}

fn hash_indicator(n: usize, words: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    n.hash(&mut hasher);
    words.hash(&mut hasher);
    hasher.finish()
}

/// A canonical group: its label, size and membership hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalGroup {
    /// Dense integer label, stable for the lifetime of the registry.
    pub label: usize,
    /// Number of member nodes.
    pub size: usize,
    /// Membership hash.
    pub hash: u64,
}

/// Monotonically growing map from membership hashes to dense labels. Local to one analysis call.
#[derive(Clone, Debug, Default)]
pub struct GroupRegistry {
    n: usize,
    hash_to_label: HashMap<u64, usize>,
}

impl GroupRegistry {
    /// Empty registry for components of an `n`-node graph.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n, hash_to_label: HashMap::new() }
    }

    /// Number of distinct groups seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hash_to_label.len()
    }

    /// Whether no group was registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hash_to_label.is_empty()
    }

    /// Resolve a membership set to its canonical group, registering it under the next unused
    /// label if unseen. Repeated members count once.
    pub fn resolve<'a, I>(&mut self, members: I) -> CanonicalGroup
    where
        I: IntoIterator<Item = &'a usize>,
    {
        let words = indicator(self.n, members);
        let size = words.iter().map(|word| word.count_ones() as usize).sum();
        let hash = hash_indicator(self.n, &words);
        let next = self.hash_to_label.len();
        let label = match self.hash_to_label.entry(hash) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(next),
        };
        CanonicalGroup { label, size, hash }
    }

    /// Label of an already registered membership set, without registering it.
    pub fn lookup<'a, I>(&self, members: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        self.hash_to_label.get(&membership_hash(self.n, members)).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::*;

    use super::*;

    #[rstest]
    fn test_hash_ignores_member_order() {
        assert_eq!(membership_hash(100, &[3, 70, 12]), membership_hash(100, &[70, 12, 3]));
        assert_ne!(membership_hash(100, &[3, 70, 12]), membership_hash(100, &[3, 70, 13]));
    }

    #[rstest]
    fn test_labels_are_dense_and_stable() {
        let mut registry = GroupRegistry::new(10);

        let a = registry.resolve(&[0, 1]);
        let b = registry.resolve(&BTreeSet::from([2, 3, 4]));
        let a_again = registry.resolve(&[1, 0]);

        assert_eq!((a.label, b.label), (0, 1));
        assert_eq!(a_again, a);
        assert_eq!(b.size, 3);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&[4, 3, 2]), Some(1));
        assert_eq!(registry.lookup(&[5, 6]), None);
    }

    #[rstest]
    fn test_repeated_members_count_once() {
        let mut registry = GroupRegistry::new(100);

        let group = registry.resolve(&[3, 70, 3, 70, 12]);

        assert_eq!(group.size, 3);
        assert_eq!(group, registry.resolve(&[12, 3, 70]));
    }

    #[rstest]
    fn test_disjoint_groups_of_equal_size_get_distinct_labels() {
        let mut registry = GroupRegistry::new(6);

        let first = registry.resolve(&[0, 1, 2]);
        let second = registry.resolve(&[3, 4, 5]);

        assert_ne!(first.label, second.label);
        assert_ne!(first.hash, second.hash);
    }
}
