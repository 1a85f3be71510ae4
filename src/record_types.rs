//! Key and count types flowing between the map and reduce phases.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// The first field of a flight record. Not validated beyond being non-empty.
pub type PassengerId = String;

/// Number of records attributed to one passenger.
pub type FlightCount = u64;

/// A mapping from passenger to flight count.
///
/// Map workers produce one of these per partition (the partial counts); the reduce phase sums
/// them into the global counts. Keys are kept in order so that everything derived from a
/// PassengerCounts (iteration, tie reporting) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassengerCounts {
    counts: BTreeMap<PassengerId, FlightCount>,
}

impl PassengerCounts {
    pub fn new() -> PassengerCounts {
        PassengerCounts { counts: BTreeMap::new() }
    }

    /// Records one flight for `passenger`.
    pub fn increment(&mut self, passenger: &str) {
        self.add(passenger, 1);
    }

    /// Adds `n` flights for `passenger`.
    pub fn add(&mut self, passenger: &str, n: FlightCount) {
        // Avoid allocating a key for passengers that are already present.
        match self.counts.get_mut(passenger) {
            Some(c) => *c += n,
            None => {
                self.counts.insert(passenger.to_string(), n);
            }
        }
    }

    /// Sums all counts of `other` into self, consuming it.
    pub fn merge_from(&mut self, other: PassengerCounts) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (k, n) in other.counts {
            *self.counts.entry(k).or_insert(0) += n;
        }
    }

    pub fn get(&self, passenger: &str) -> FlightCount {
        self.counts.get(passenger).copied().unwrap_or(0)
    }

    /// Number of distinct passengers.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over all passengers' counts.
    pub fn total_flights(&self) -> FlightCount {
        self.counts.values().sum()
    }

    /// Iterates in ascending passenger order.
    pub fn iter(&self) -> btree_map::Iter<'_, PassengerId, FlightCount> {
        self.counts.iter()
    }
}

impl<'a> IntoIterator for &'a PassengerCounts {
    type Item = (&'a PassengerId, &'a FlightCount);
    type IntoIter = btree_map::Iter<'a, PassengerId, FlightCount>;
    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl FromIterator<(PassengerId, FlightCount)> for PassengerCounts {
    fn from_iter<I: IntoIterator<Item = (PassengerId, FlightCount)>>(it: I) -> Self {
        let mut pc = PassengerCounts::new();
        for (k, n) in it {
            pc.add(&k, n);
        }
        pc
    }
}

/// What one map worker hands to the controller.
#[derive(Debug)]
pub struct WorkerOutput {
    pub worker: usize,
    pub counts: PassengerCounts,
    /// Records in the partition that were attributed to a passenger.
    pub counted: usize,
    /// Records in the partition dropped as malformed.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::PassengerCounts;

    #[test]
    fn test_increment_and_get() {
        let mut pc = PassengerCounts::new();
        pc.increment("P1");
        pc.increment("P2");
        pc.increment("P1");

        assert_eq!(pc.get("P1"), 2);
        assert_eq!(pc.get("P2"), 1);
        assert_eq!(pc.get("P3"), 0);
        assert_eq!(pc.len(), 2);
        assert_eq!(pc.total_flights(), 3);
    }

    #[test]
    fn test_merge_from_sums_counts() {
        let mut a: PassengerCounts = vec![(String::from("A"), 2), (String::from("B"), 1)]
            .into_iter()
            .collect();
        let b: PassengerCounts = vec![(String::from("B"), 4), (String::from("C"), 3)]
            .into_iter()
            .collect();
        a.merge_from(b);

        assert_eq!(a.get("A"), 2);
        assert_eq!(a.get("B"), 5);
        assert_eq!(a.get("C"), 3);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut pc = PassengerCounts::new();
        for k in &["zed", "alpha", "mike"] {
            pc.increment(k);
        }
        let keys: Vec<&String> = pc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alpha", "mike", "zed"]);
    }
}
