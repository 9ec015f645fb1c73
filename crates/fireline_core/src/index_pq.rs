//! Indexed binary min-heap with decrease-key.
//!
//! Items are dense indices in `0..capacity` (tile indices for pathfinding).
//! Each index carries at most one key. Equal keys pop in ascending index
//! order so that every search is deterministic.

use crate::math::Fixed;

/// Min-priority queue over indices `0..capacity` keyed by [`Fixed`].
#[derive(Debug, Clone)]
pub struct IndexMinPq {
    /// Binary heap of indices, 1-based (`heap[0]` is unused).
    heap: Vec<usize>,
    /// Heap position of each index, or `None` if not queued.
    position: Vec<Option<usize>>,
    /// Key of each index.
    keys: Vec<Fixed>,
}

impl IndexMinPq {
    /// Create an empty queue for indices `0..capacity`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: vec![0],
            position: vec![None; capacity],
            keys: vec![Fixed::MAX; capacity],
        }
    }

    /// Number of queued indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len() - 1
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if an index is queued.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.position.get(index).is_some_and(Option::is_some)
    }

    /// Current key of a queued index.
    #[must_use]
    pub fn key_of(&self, index: usize) -> Option<Fixed> {
        self.contains(index).then(|| self.keys[index])
    }

    /// Queue an index with a key.
    ///
    /// An index that is already queued has its key lowered instead if the
    /// new key is smaller; a larger key is ignored.
    pub fn insert(&mut self, index: usize, key: Fixed) {
        if self.contains(index) {
            self.decrease_key(index, key);
            return;
        }
        self.keys[index] = key;
        self.heap.push(index);
        let slot = self.heap.len() - 1;
        self.position[index] = Some(slot);
        self.swim(slot);
    }

    /// Lower the key of a queued index.
    ///
    /// Returns `false` if the index is not queued or `key` is not smaller.
    pub fn decrease_key(&mut self, index: usize, key: Fixed) -> bool {
        let Some(slot) = self.position.get(index).copied().flatten() else {
            return false;
        };
        if key >= self.keys[index] {
            return false;
        }
        self.keys[index] = key;
        self.swim(slot);
        true
    }

    /// Remove and return the index with the smallest key.
    pub fn pop_min(&mut self) -> Option<(usize, Fixed)> {
        if self.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(1, last);
        let min = self.heap.pop()?;
        self.position[min] = None;
        if !self.is_empty() {
            self.sink(1);
        }
        Some((min, self.keys[min]))
    }

    /// Check if heap slot `a` should sit below slot `b`.
    fn greater(&self, a: usize, b: usize) -> bool {
        let (ia, ib) = (self.heap[a], self.heap[b]);
        (self.keys[ia], ia) > (self.keys[ib], ib)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = Some(a);
        self.position[self.heap[b]] = Some(b);
    }

    fn swim(&mut self, mut slot: usize) {
        while slot > 1 && self.greater(slot / 2, slot) {
            self.swap(slot / 2, slot);
            slot /= 2;
        }
    }

    fn sink(&mut self, mut slot: usize) {
        let len = self.len();
        while 2 * slot <= len {
            let mut child = 2 * slot;
            if child < len && self.greater(child, child + 1) {
                child += 1;
            }
            if !self.greater(slot, child) {
                break;
            }
            self.swap(slot, child);
            slot = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_pops_in_key_order() {
        let mut pq = IndexMinPq::with_capacity(8);
        for (index, key) in [(3, 5), (1, 2), (7, 9), (0, 1), (5, 3)] {
            pq.insert(index, fixed(key));
        }

        let order: Vec<usize> = std::iter::from_fn(|| pq.pop_min().map(|(i, _)| i)).collect();
        assert_eq!(order, vec![0, 1, 5, 3, 7]);
        assert!(pq.is_empty());
    }

    #[test]
    fn test_ties_pop_by_index() {
        let mut pq = IndexMinPq::with_capacity(4);
        pq.insert(2, fixed(1));
        pq.insert(0, fixed(1));
        pq.insert(3, fixed(1));
        assert_eq!(pq.pop_min(), Some((0, fixed(1))));
        assert_eq!(pq.pop_min(), Some((2, fixed(1))));
        assert_eq!(pq.pop_min(), Some((3, fixed(1))));
    }

    #[test]
    fn test_decrease_key_reorders() {
        let mut pq = IndexMinPq::with_capacity(4);
        pq.insert(0, fixed(5));
        pq.insert(1, fixed(3));
        assert!(pq.decrease_key(0, fixed(1)));
        assert!(!pq.decrease_key(0, fixed(4)));
        assert!(!pq.decrease_key(2, fixed(0)));
        assert_eq!(pq.key_of(0), Some(fixed(1)));
        assert_eq!(pq.pop_min(), Some((0, fixed(1))));
    }

    #[test]
    fn test_contains_tracks_membership() {
        let mut pq = IndexMinPq::with_capacity(3);
        assert!(!pq.contains(1));
        pq.insert(1, fixed(2));
        assert!(pq.contains(1));
        assert_eq!(pq.len(), 1);
        pq.pop_min();
        assert!(!pq.contains(1));
        assert_eq!(pq.key_of(1), None);
    }
}
