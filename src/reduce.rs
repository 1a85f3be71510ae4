//! Implements the Reduce phase.
//!

use crate::record_types::PassengerCounts;

/// Sums any number of partial counts into one. The order of `partials` does not matter; empty
/// partials (from empty partitions) contribute nothing.
pub fn merge<It: IntoIterator<Item = PassengerCounts>>(partials: It) -> PassengerCounts {
    let mut global = PassengerCounts::new();
    for p in partials {
        global.merge_from(p);
    }
    global
}

#[cfg(test)]
mod tests {
    use super::merge;
    use crate::record_types::PassengerCounts;

    fn counts(pairs: &[(&str, u64)]) -> PassengerCounts {
        pairs.iter().map(|&(k, n)| (String::from(k), n)).collect()
    }

    fn partials() -> Vec<PassengerCounts> {
        vec![counts(&[("A", 1), ("B", 2)]),
             counts(&[]),
             counts(&[("B", 3), ("C", 1)]),
             counts(&[("A", 4), ("C", 1), ("D", 7)])]
    }

    #[test]
    fn test_merge_sums() {
        let g = merge(partials());
        assert_eq!(g, counts(&[("A", 5), ("B", 5), ("C", 2), ("D", 7)]));
    }

    #[test]
    fn test_merge_order_independent() {
        let expected = merge(partials());

        let mut reversed = partials();
        reversed.reverse();
        assert_eq!(merge(reversed), expected);

        let mut rotated = partials();
        rotated.rotate_left(2);
        assert_eq!(merge(rotated), expected);

        // (p0 + p1) + (p2 + p3) == p0 + (p1 + (p2 + p3))
        let mut ps = partials().into_iter();
        let (p0, p1, p2, p3) = (ps.next().unwrap(), ps.next().unwrap(), ps.next().unwrap(),
                                ps.next().unwrap());
        let left = merge(vec![merge(vec![p0.clone(), p1.clone()]), merge(vec![p2.clone(), p3.clone()])]);
        let right = merge(vec![p0, merge(vec![p1, merge(vec![p2, p3])])]);
        assert_eq!(left, expected);
        assert_eq!(right, expected);
    }

    #[test]
    fn test_merge_nothing() {
        assert!(merge(Vec::new()).is_empty());
        assert!(merge(vec![PassengerCounts::new(), PassengerCounts::new()]).is_empty());
    }
}
