//! Generic two-collection reconciliation.
//!
//! This module matches elements of two collections by structural equality of
//! a derived key and partitions them into matched pairs plus the elements
//! unique to each side. It has no schema knowledge; the differ applies it at
//! class, property, and index granularity.

/// Result of reconciling two collections.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDiff<T> {
    /// Matched pairs of original values, in first-collection order.
    pub common: Vec<(T, T)>,
    /// Elements present only in the first collection.
    pub left: Vec<T>,
    /// Elements present only in the second collection.
    pub right: Vec<T>,
}

impl<T> ListDiff<T> {
    /// Returns true if neither side has unmatched elements.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Reconciles two sequences by structural equality of whole elements.
pub fn reconcile<T>(a: &[T], b: &[T]) -> ListDiff<T>
where
    T: Clone + PartialEq,
{
    reconcile_by(a, b, Clone::clone)
}

/// Reconciles two sequences by a derived key.
///
/// Matching is determined solely by structural equality of `key(x)`; the
/// returned `common` pairs and `left`/`right` lists carry the original
/// elements, in input order. Every element of `a` pairs with every
/// key-equal element of `b`, so callers that need one-to-one pairing must
/// keep keys unique on at least one side.
///
/// Keys may be arbitrary structured records, so comparison is O(n·m)
/// pairwise rather than hashed.
pub fn reconcile_by<T, K, F>(a: &[T], b: &[T], key: F) -> ListDiff<T>
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let a_keys: Vec<K> = a.iter().map(&key).collect();
    let b_keys: Vec<K> = b.iter().map(&key).collect();

    let mut common = Vec::new();
    let mut left = Vec::new();
    for (x, x_key) in a.iter().zip(&a_keys) {
        let mut matched = false;
        for (y, y_key) in b.iter().zip(&b_keys) {
            if x_key == y_key {
                common.push((x.clone(), y.clone()));
                matched = true;
            }
        }
        if !matched {
            left.push(x.clone());
        }
    }

    let right = b
        .iter()
        .zip(&b_keys)
        .filter(|(_, y_key)| !a_keys.iter().any(|x_key| x_key == *y_key))
        .map(|(y, _)| y.clone())
        .collect();

    ListDiff {
        common,
        left,
        right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_inputs_have_no_common() {
        let diff = reconcile(&[1, 2], &[3, 4]);
        assert!(diff.common.is_empty());
        assert_eq!(diff.left, vec![1, 2]);
        assert_eq!(diff.right, vec![3, 4]);
    }

    #[test]
    fn equal_inputs_are_unchanged() {
        let diff = reconcile(&["a", "b"], &["a", "b"]);
        assert!(diff.is_unchanged());
        assert_eq!(diff.common, vec![("a", "a"), ("b", "b")]);
    }

    #[test]
    fn partitions_overlapping_inputs() {
        let diff = reconcile(&[1, 2, 3], &[2, 3, 4]);
        assert_eq!(diff.common, vec![(2, 2), (3, 3)]);
        assert_eq!(diff.left, vec![1]);
        assert_eq!(diff.right, vec![4]);
    }

    #[test]
    fn empty_sides() {
        let diff = reconcile::<i32>(&[], &[1]);
        assert!(diff.common.is_empty() && diff.left.is_empty());
        assert_eq!(diff.right, vec![1]);

        let diff = reconcile::<i32>(&[2], &[]);
        assert_eq!(diff.left, vec![2]);
        assert!(diff.right.is_empty());
    }

    #[test]
    fn by_key_returns_original_records() {
        let a = [("ann", 30), ("bob", 40)];
        let b = [("ann", 31), ("cid", 50)];
        let diff = reconcile_by(&a, &b, |record| record.0);

        // Matched by name, but the pair carries both original tuples.
        assert_eq!(diff.common, vec![(("ann", 30), ("ann", 31))]);
        assert_eq!(diff.left, vec![("bob", 40)]);
        assert_eq!(diff.right, vec![("cid", 50)]);
    }

    #[test]
    fn by_key_with_structured_keys() {
        let a = [(1, "x", true), (2, "y", true)];
        let b = [(1, "x", false), (3, "z", false)];
        let diff = reconcile_by(&a, &b, |record| (record.0, record.1));
        assert_eq!(diff.common.len(), 1);
        assert_eq!(diff.common[0].0, (1, "x", true));
        assert_eq!(diff.common[0].1, (1, "x", false));
    }

    #[test]
    fn duplicate_keys_pair_with_every_counterpart() {
        let diff = reconcile_by(&[1, 1], &[1], |x| *x);
        assert_eq!(diff.common, vec![(1, 1), (1, 1)]);
        assert!(diff.left.is_empty() && diff.right.is_empty());
    }
}
