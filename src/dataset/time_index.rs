//! Ordered time index of a [`Dataset`](crate::dataset::Dataset).
//!
//! A [`TimeIndex`] holds one [`Epoch`] per row. It does not enforce ordering on
//! construction: plugins may hand back unsorted or duplicated timestamps, and the
//! loading engine decides (via its strictness flag) whether that is fatal. All the
//! time-based slicing helpers assume a monotonic index, exactly like label based
//! slicing on a sorted table.
use std::{cmp::Ordering, ops::Range};

use hifitime::Epoch;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeIndex {
    epochs: Vec<Epoch>,
}

impl TimeIndex {
    pub fn new(epochs: Vec<Epoch>) -> Self {
        TimeIndex { epochs }
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn first(&self) -> Option<Epoch> {
        self.epochs.first().copied()
    }

    pub fn last(&self) -> Option<Epoch> {
        self.epochs.last().copied()
    }

    pub fn get(&self, position: usize) -> Option<Epoch> {
        self.epochs.get(position).copied()
    }

    pub fn as_slice(&self) -> &[Epoch] {
        &self.epochs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Epoch> {
        self.epochs.iter()
    }

    /// True when every epoch is greater than or equal to its predecessor.
    pub fn is_monotonic_increasing(&self) -> bool {
        self.epochs.windows(2).all(|w| w[0] <= w[1])
    }

    /// True when no epoch appears twice.
    ///
    /// Works on unsorted indices: the check sorts a copy of the epochs.
    pub fn is_unique(&self) -> bool {
        if self.is_monotonic_increasing() {
            return self.epochs.windows(2).all(|w| w[0] != w[1]);
        }
        let mut sorted = self.epochs.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    /// Row positions that would sort the index, stable for equal epochs.
    pub fn argsort(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.epochs.len()).collect();
        order.sort_by(|&a, &b| {
            self.epochs[a]
                .partial_cmp(&self.epochs[b])
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    /// Positions of the rows with `start <= t <= stop` (inclusive on both ends).
    pub fn range_inclusive(&self, start: Epoch, stop: Epoch) -> Range<usize> {
        let lo = self.epochs.partition_point(|t| *t < start);
        let hi = self.epochs.partition_point(|t| *t <= stop);
        lo..hi.max(lo)
    }

    /// Positions of the rows strictly before `stop`.
    pub fn range_before(&self, stop: Epoch) -> Range<usize> {
        0..self.epochs.partition_point(|t| *t < stop)
    }

    /// Positions of the rows strictly after `start`.
    pub fn range_after(&self, start: Epoch) -> Range<usize> {
        self.epochs.partition_point(|t| *t <= start)..self.epochs.len()
    }

    /// Positions of the rows with `t >= start`.
    pub fn range_from(&self, start: Epoch) -> Range<usize> {
        self.epochs.partition_point(|t| *t < start)..self.epochs.len()
    }

    pub(crate) fn select(&self, positions: &[usize]) -> TimeIndex {
        TimeIndex::new(positions.iter().map(|&i| self.epochs[i]).collect())
    }

    pub(crate) fn slice(&self, range: Range<usize>) -> TimeIndex {
        TimeIndex::new(self.epochs[range].to_vec())
    }

    pub(crate) fn extend_from(&mut self, other: &TimeIndex) {
        self.epochs.extend_from_slice(&other.epochs);
    }
}

impl From<Vec<Epoch>> for TimeIndex {
    fn from(epochs: Vec<Epoch>) -> Self {
        TimeIndex::new(epochs)
    }
}

#[cfg(test)]
mod time_index_test {
    use super::*;
    use hifitime::Unit;

    fn seconds(values: &[i64]) -> TimeIndex {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        TimeIndex::new(values.iter().map(|&s| t0 + Unit::Second * s).collect())
    }

    #[test]
    fn test_monotonic_and_unique() {
        assert!(seconds(&[0, 1, 2]).is_monotonic_increasing());
        assert!(seconds(&[0, 1, 2]).is_unique());

        let repeated = seconds(&[0, 1, 1, 2]);
        assert!(repeated.is_monotonic_increasing());
        assert!(!repeated.is_unique());

        let shuffled = seconds(&[2, 0, 1]);
        assert!(!shuffled.is_monotonic_increasing());
        assert!(shuffled.is_unique());
        assert!(!seconds(&[2, 0, 2]).is_unique());
    }

    #[test]
    fn test_ranges() {
        let index = seconds(&[0, 10, 20, 30]);
        let t0 = index.first().unwrap();
        assert_eq!(
            index.range_inclusive(t0 + Unit::Second * 10, t0 + Unit::Second * 20),
            1..3
        );
        assert_eq!(index.range_before(t0 + Unit::Second * 20), 0..2);
        assert_eq!(index.range_after(t0 + Unit::Second * 20), 3..4);
        assert_eq!(index.range_from(t0 + Unit::Second * 20), 2..4);
        assert_eq!(
            index.range_inclusive(t0 + Unit::Second * 40, t0 + Unit::Second * 50),
            4..4
        );
    }

    #[test]
    fn test_argsort_is_stable() {
        let index = seconds(&[5, 1, 5, 0]);
        assert_eq!(index.argsort(), vec![3, 1, 0, 2]);
    }
}
