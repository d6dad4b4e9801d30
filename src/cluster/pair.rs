/// An unordered pair of points, stored in canonical (sorted) order.
///
/// `UnorderedPair::new(a, b) == UnorderedPair::new(b, a)`. Both members are
/// always present; a pair may hold the same point twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnorderedPair<T> {
    lo: T,
    hi: T,
}

impl<T: Ord + Copy> UnorderedPair<T> {
    /// Create a pair from two points in any order.
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The smaller member.
    pub fn first(&self) -> T {
        self.lo
    }

    /// The larger member.
    pub fn second(&self) -> T {
        self.hi
    }

    /// Both members, smaller first.
    pub fn members(&self) -> (T, T) {
        (self.lo, self.hi)
    }

    /// Whether `point` is one of the members.
    pub fn contains(&self, point: T) -> bool {
        self.lo == point || self.hi == point
    }

    /// The member that is not `point`.
    ///
    /// Returns `point` itself for a pair `(point, point)`, and `None` when
    /// `point` is not in the pair at all.
    pub fn other(&self, point: T) -> Option<T> {
        if self.lo == point {
            Some(self.hi)
        } else if self.hi == point {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Whether both members are the same point.
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }
}

impl<T: Ord + Copy> From<(T, T)> for UnorderedPair<T> {
    fn from((a, b): (T, T)) -> Self {
        Self::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn order_does_not_matter() {
        assert_eq!(UnorderedPair::new(1, 2), UnorderedPair::new(2, 1));

        let mut set = HashSet::new();
        set.insert(UnorderedPair::new(3, 7));
        assert!(set.contains(&UnorderedPair::new(7, 3)));
    }

    #[test]
    fn other_member() {
        let pair = UnorderedPair::new(5, 2);
        assert_eq!(pair.members(), (2, 5));
        assert_eq!(pair.other(2), Some(5));
        assert_eq!(pair.other(5), Some(2));
        assert_eq!(pair.other(9), None);
    }

    #[test]
    fn degenerate_pair_returns_same_member() {
        let pair = UnorderedPair::new(4, 4);
        assert!(pair.is_degenerate());
        assert!(pair.contains(4));
        assert_eq!(pair.other(4), Some(4));
    }

    #[test]
    fn distinct_pairs_are_not_equal() {
        assert_ne!(UnorderedPair::new(1, 2), UnorderedPair::new(1, 3));
        assert_ne!(UnorderedPair::new(1, 1), UnorderedPair::new(1, 2));
    }
}
