//! Three-slot cache of the padded loads.
//!
//! Padding a window needs the data of the windows right before and after it.
//! [`LoadCache`] keeps those three loads, each slot tagged with the window it
//! holds, so that stepping forward or backward through the data costs a single
//! new plugin call.
use crate::{dataset::Dataset, instrument::load_request::LoadWindow, metadata::Meta};

#[derive(Debug, Clone)]
pub(crate) struct CacheSlot {
    pub window: LoadWindow,
    pub data: Dataset,
    pub meta: Meta,
}

impl CacheSlot {
    pub fn new(window: LoadWindow, mut data: Dataset, meta: Meta) -> Self {
        if !data.index().is_monotonic_increasing() {
            log::debug!("Sorting data of {window}, the time index is not monotonic");
            data.sort_by_time();
        }
        CacheSlot { window, data, meta }
    }

    fn has_data(slot: &Option<CacheSlot>) -> bool {
        slot.as_ref().is_some_and(|s| !s.data.is_empty())
    }
}

/// What the cache needs before a window can be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CachePlan {
    /// Load the requested window and both neighbours
    Reset,
    /// The requested window is the cached `next`: load the window after it
    ShiftForward,
    /// The requested window is the cached `prev`: load the window before it
    ShiftBackward,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LoadCache {
    prev: Option<CacheSlot>,
    curr: Option<CacheSlot>,
    next: Option<CacheSlot>,
}

impl LoadCache {
    pub fn plan(&self, window: LoadWindow) -> CachePlan {
        if !CacheSlot::has_data(&self.prev) && !CacheSlot::has_data(&self.next) {
            return CachePlan::Reset;
        }
        let tagged = |slot: &Option<CacheSlot>| slot.as_ref().is_some_and(|s| s.window == window);
        if tagged(&self.next) {
            CachePlan::ShiftForward
        } else if tagged(&self.prev) {
            CachePlan::ShiftBackward
        } else {
            CachePlan::Reset
        }
    }

    pub fn reset(&mut self, prev: CacheSlot, curr: CacheSlot, next: CacheSlot) {
        self.prev = Some(prev);
        self.curr = Some(curr);
        self.next = Some(next);
    }

    pub fn shift_forward(&mut self, next: CacheSlot) {
        self.prev = self.curr.take();
        self.curr = self.next.take();
        self.next = Some(next);
    }

    pub fn shift_backward(&mut self, prev: CacheSlot) {
        self.next = self.curr.take();
        self.curr = self.prev.take();
        self.prev = Some(prev);
    }

    pub fn clear(&mut self) {
        self.prev = None;
        self.curr = None;
        self.next = None;
    }

    pub fn prev(&self) -> Option<&CacheSlot> {
        self.prev.as_ref()
    }

    pub fn curr(&self) -> Option<&CacheSlot> {
        self.curr.as_ref()
    }

    pub fn next(&self) -> Option<&CacheSlot> {
        self.next.as_ref()
    }
}

#[cfg(test)]
mod cache_test {
    use hifitime::{Epoch, Unit};

    use super::*;
    use crate::dataset::{TableKind, TimeIndex};

    fn day(d: i64) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(2009, 1, 1) + Unit::Day * d
    }

    fn window(d: i64) -> LoadWindow {
        LoadWindow::Date {
            start: day(d),
            step: Unit::Day * 1,
        }
    }

    fn slot(d: i64, rows: i64) -> CacheSlot {
        let index = TimeIndex::new((0..rows).map(|s| day(d) + Unit::Second * s).collect());
        let data = Dataset::from_columns(
            TableKind::Tabular,
            index,
            [("x", vec![d as f64; rows as usize])],
        )
        .unwrap();
        CacheSlot::new(window(d), data, Meta::new())
    }

    #[test]
    fn test_plan_and_shift() {
        let mut cache = LoadCache::default();
        assert_eq!(cache.plan(window(1)), CachePlan::Reset);

        cache.reset(slot(0, 2), slot(1, 2), slot(2, 2));
        assert_eq!(cache.plan(window(2)), CachePlan::ShiftForward);
        assert_eq!(cache.plan(window(0)), CachePlan::ShiftBackward);
        assert_eq!(cache.plan(window(5)), CachePlan::Reset);

        cache.shift_forward(slot(3, 2));
        assert_eq!(cache.prev().unwrap().window, window(1));
        assert_eq!(cache.curr().unwrap().window, window(2));
        assert_eq!(cache.next().unwrap().window, window(3));

        cache.shift_backward(slot(0, 2));
        assert_eq!(cache.curr().unwrap().window, window(1));
        assert_eq!(cache.next().unwrap().window, window(2));
    }

    #[test]
    fn test_empty_neighbours_force_reset() {
        let mut cache = LoadCache::default();
        cache.reset(slot(0, 0), slot(1, 2), slot(2, 0));
        assert_eq!(cache.plan(window(2)), CachePlan::Reset);
    }

    #[test]
    fn test_slots_are_sorted() {
        let index = TimeIndex::new(vec![day(0) + Unit::Second * 5, day(0)]);
        let data =
            Dataset::from_columns(TableKind::Tabular, index, [("x", vec![5.0, 0.0])]).unwrap();
        let slot = CacheSlot::new(window(0), data, Meta::new());
        assert_eq!(slot.data.get("x").unwrap(), &[0.0, 5.0]);
    }
}
