use std::collections::HashMap;
use std::hash::Hash;

/// Set with constant-time insertion, removal and access by position.
///
/// Positions are dense (`0..len`); removal moves the last element into the freed slot, so the
/// order only depends on the sequence of operations.
#[derive(Clone, Debug)]
pub(crate) struct IndexedSet<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> IndexedSet<T> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new(), positions: HashMap::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn get(&self, position: usize) -> Option<T> {
        self.items.get(position).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().copied()
    }

    pub(crate) fn insert(&mut self, item: T) -> bool {
        if self.positions.contains_key(&item) {
            return false;
        }
        self.positions.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    pub(crate) fn remove(&mut self, item: &T) -> bool {
        let Some(position) = self.positions.remove(item) else {
            return false;
        };
        self.items.swap_remove(position);
        if let Some(&moved) = self.items.get(position) {
            self.positions.insert(moved, position);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn test_insert_and_remove_keep_positions_dense() {
        let mut set = IndexedSet::new();
        for item in [4, 8, 15, 16, 23] {
            assert!(set.insert(item));
        }
        assert!(!set.insert(8));

        assert!(set.remove(&8));
        assert!(!set.remove(&8));
        assert!(set.remove(&23));

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![4, 16, 15]);
        assert_eq!(set.get(1), Some(16));
        assert!(set.remove(&16));
        assert!(set.remove(&4));
        assert!(set.remove(&15));
        assert!(set.is_empty());
    }
}
