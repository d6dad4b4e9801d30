//! Distance index over sibling pairs.
//!
//! Two coupled views are kept in sync inside every mutating call:
//!
//! - `pair -> distance` for point lookups and updates;
//! - `distance -> {pairs}`, ordered by value, for min/max retrieval in
//!   `O(log n)` regardless of how many pairs are stored.
//!
//! A third, per-point adjacency view lets [`DistanceIndex::remove_touching`]
//! drop a whole row in time proportional to the row, not to the index.
//!
//! Within one distance bucket pairs are ordered by `(lo, hi)`, so ties for the
//! minimum resolve to the smallest pair.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use ordered_float::OrderedFloat;

use super::graph::ClusterId;
use super::pair::UnorderedPair;
use crate::error::{Error, Result};

/// Pairwise distances among points of one partition.
#[derive(Clone, Debug)]
pub struct DistanceIndex<T = ClusterId> {
    by_pair: HashMap<UnorderedPair<T>, f64>,
    by_distance: BTreeMap<OrderedFloat<f64>, BTreeSet<UnorderedPair<T>>>,
    rows: HashMap<T, HashSet<T>>,
}

impl<T> Default for DistanceIndex<T> {
    fn default() -> Self {
        Self {
            by_pair: HashMap::new(),
            by_distance: BTreeMap::new(),
            rows: HashMap::new(),
        }
    }
}

impl<T: Copy + Ord + Hash> DistanceIndex<T> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the distance of `pair`, returning the previous value.
    ///
    /// Negative and NaN distances are rejected and leave the index untouched.
    pub fn insert(&mut self, pair: UnorderedPair<T>, distance: f64) -> Result<Option<f64>> {
        if distance.is_nan() || distance < 0.0 {
            return Err(Error::InvalidDistance { distance });
        }
        // -0.0 and 0.0 share a bucket
        let distance = if distance == 0.0 { 0.0 } else { distance };

        let previous = self.by_pair.insert(pair, distance);
        match previous {
            Some(old) => self.detach(old, pair),
            None => self.attach_row(pair),
        }
        self.by_distance
            .entry(OrderedFloat(distance))
            .or_default()
            .insert(pair);
        Ok(previous)
    }

    /// Remove `pair`, returning its distance if it was present.
    pub fn remove(&mut self, pair: UnorderedPair<T>) -> Option<f64> {
        let distance = self.by_pair.remove(&pair)?;
        self.detach(distance, pair);
        let (lo, hi) = pair.members();
        self.detach_row(lo, hi);
        self.detach_row(hi, lo);
        Some(distance)
    }

    /// Remove every pair containing `point`.
    ///
    /// Returns `other endpoint -> distance` for the removed pairs.
    pub fn remove_touching(&mut self, point: T) -> HashMap<T, f64> {
        let Some(row) = self.rows.remove(&point) else {
            return HashMap::new();
        };

        let mut removed = HashMap::with_capacity(row.len());
        for other in row {
            let pair = UnorderedPair::new(point, other);
            if let Some(distance) = self.by_pair.remove(&pair) {
                self.detach(distance, pair);
                removed.insert(other, distance);
            }
            if other != point {
                self.detach_row(other, point);
            }
        }
        removed
    }

    /// Stored distance of `pair`.
    pub fn get(&self, pair: UnorderedPair<T>) -> Option<f64> {
        self.by_pair.get(&pair).copied()
    }

    /// Stored distance between `a` and `b`.
    pub fn distance(&self, a: T, b: T) -> Option<f64> {
        self.get(UnorderedPair::new(a, b))
    }

    /// Whether `pair` is stored.
    pub fn contains(&self, pair: UnorderedPair<T>) -> bool {
        self.by_pair.contains_key(&pair)
    }

    /// Pair with the smallest distance, `None` if the index is empty.
    pub fn min_pair(&self) -> Option<(UnorderedPair<T>, f64)> {
        self.by_distance
            .first_key_value()
            .and_then(|(d, pairs)| pairs.first().map(|&p| (p, d.0)))
    }

    /// Pair with the largest distance, `None` if the index is empty.
    pub fn max_pair(&self) -> Option<(UnorderedPair<T>, f64)> {
        self.by_distance
            .last_key_value()
            .and_then(|(d, pairs)| pairs.last().map(|&p| (p, d.0)))
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    /// Whether no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    /// Number of stored pairs that contain `point`.
    pub fn row_len(&self, point: T) -> usize {
        self.rows.get(&point).map_or(0, HashSet::len)
    }

    /// All stored pairs, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (UnorderedPair<T>, f64)> + '_ {
        self.by_pair.iter().map(|(&p, &d)| (p, d))
    }

    fn detach(&mut self, distance: f64, pair: UnorderedPair<T>) {
        if let Entry::Occupied(mut bucket) = self.by_distance.entry(OrderedFloat(distance)) {
            bucket.get_mut().remove(&pair);
            if bucket.get().is_empty() {
                bucket.remove();
            }
        }
    }

    fn attach_row(&mut self, pair: UnorderedPair<T>) {
        let (lo, hi) = pair.members();
        self.rows.entry(lo).or_default().insert(hi);
        self.rows.entry(hi).or_default().insert(lo);
    }

    fn detach_row(&mut self, point: T, other: T) {
        if let Some(row) = self.rows.get_mut(&point) {
            row.remove(&other);
            if row.is_empty() {
                self.rows.remove(&point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: u32, b: u32) -> UnorderedPair<u32> {
        UnorderedPair::new(a, b)
    }

    /// Both views agree: every pair sits in exactly the bucket of its distance.
    fn assert_consistent(index: &DistanceIndex<u32>) {
        let bucketed: usize = index.by_distance.values().map(BTreeSet::len).sum();
        assert_eq!(bucketed, index.len());
        for (p, d) in index.iter() {
            assert!(index.by_distance[&OrderedFloat(d)].contains(&p));
            assert!(index.rows[&p.first()].contains(&p.second()));
            assert!(index.rows[&p.second()].contains(&p.first()));
        }
        assert!(index.by_distance.values().all(|b| !b.is_empty()));
    }

    #[test]
    fn empty_index_has_no_extremes() {
        let index: DistanceIndex<u32> = DistanceIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.min_pair(), None);
        assert_eq!(index.max_pair(), None);
    }

    #[test]
    fn insert_and_lookup_in_any_order() {
        let mut index = DistanceIndex::new();
        assert_eq!(index.insert(pair(1, 2), 0.4).unwrap(), None);
        assert_eq!(index.distance(2, 1), Some(0.4));
        assert!(index.contains(pair(2, 1)));
        assert_eq!(index.len(), 1);
        assert_consistent(&index);
    }

    #[test]
    fn insert_replaces_and_moves_bucket() {
        let mut index = DistanceIndex::new();
        index.insert(pair(1, 2), 0.4).unwrap();
        index.insert(pair(3, 4), 0.6).unwrap();
        assert_eq!(index.insert(pair(2, 1), 0.9).unwrap(), Some(0.4));
        assert_eq!(index.len(), 2);
        assert_eq!(index.min_pair(), Some((pair(3, 4), 0.6)));
        assert_eq!(index.max_pair(), Some((pair(1, 2), 0.9)));
        assert!(!index.by_distance.contains_key(&OrderedFloat(0.4)));
        assert_consistent(&index);
    }

    #[test]
    fn rejects_negative_and_nan() {
        let mut index = DistanceIndex::new();
        assert!(matches!(
            index.insert(pair(1, 2), -0.1),
            Err(Error::InvalidDistance { .. })
        ));
        assert!(index.insert(pair(1, 2), f64::NAN).is_err());
        assert!(index.is_empty());

        index.insert(pair(1, 2), -0.0).unwrap();
        index.insert(pair(1, 3), 0.0).unwrap();
        assert_eq!(index.by_distance.len(), 1);
    }

    #[test]
    fn remove_returns_previous() {
        let mut index = DistanceIndex::new();
        index.insert(pair(1, 2), 0.3).unwrap();
        index.insert(pair(1, 3), 0.3).unwrap();
        assert_eq!(index.remove(pair(2, 1)), Some(0.3));
        assert_eq!(index.remove(pair(2, 1)), None);
        assert_eq!(index.min_pair(), Some((pair(1, 3), 0.3)));
        assert_eq!(index.row_len(2), 0);
        assert_consistent(&index);

        index.remove(pair(1, 3));
        assert!(index.is_empty());
        assert_eq!(index.min_pair(), None);
        assert!(index.rows.is_empty());
    }

    #[test]
    fn remove_touching_drops_whole_row() {
        let mut index = DistanceIndex::new();
        index.insert(pair(1, 2), 0.1).unwrap();
        index.insert(pair(1, 3), 0.2).unwrap();
        index.insert(pair(2, 3), 0.3).unwrap();
        index.insert(pair(3, 4), 0.4).unwrap();

        let removed = index.remove_touching(3);
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[&1], 0.2);
        assert_eq!(removed[&2], 0.3);
        assert_eq!(removed[&4], 0.4);

        assert_eq!(index.len(), 1);
        assert_eq!(index.row_len(3), 0);
        assert_eq!(index.row_len(4), 0);
        assert_eq!(index.max_pair(), Some((pair(1, 2), 0.1)));
        assert_consistent(&index);

        assert!(index.remove_touching(3).is_empty());
    }

    #[test]
    fn remove_touching_degenerate_pair() {
        let mut index = DistanceIndex::new();
        index.insert(pair(5, 5), 0.5).unwrap();
        index.insert(pair(5, 6), 0.7).unwrap();
        let removed = index.remove_touching(5);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[&5], 0.5);
        assert!(index.is_empty());
        assert!(index.rows.is_empty());
    }

    #[test]
    fn ties_resolve_to_smallest_pair() {
        let mut index = DistanceIndex::new();
        index.insert(pair(7, 9), 0.2).unwrap();
        index.insert(pair(2, 8), 0.2).unwrap();
        index.insert(pair(2, 5), 0.2).unwrap();
        assert_eq!(index.min_pair(), Some((pair(2, 5), 0.2)));
        assert_eq!(index.max_pair(), Some((pair(7, 9), 0.2)));
    }
}
