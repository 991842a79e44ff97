//! Window stepping and iteration.
//!
//! [`Instrument::next`] and [`Instrument::prev`] move the loaded window one
//! step through the iteration windows of the [`Bounds`](crate::instrument::Bounds).
//! Stepping past either end returns [`SatFrameError::EndOfData`] and leaves the
//! instrument untouched, so callers can stop on it.
//!
//! [`Instrument::windows`] walks every window from the first one and yields a
//! [`WindowResult`] copy of each load.
use hifitime::Epoch;

use crate::{
    dataset::Dataset,
    instrument::{load_request::LoadWindow, Instrument},
    metadata::Meta,
    satframe_errors::SatFrameError,
};

/// Copy of the state of an instrument after a load or an orbit step.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    pub data: Dataset,
    pub meta: Meta,
    pub date: Option<Epoch>,
    pub fid: Option<isize>,
    /// 1-based orbit selected in the window, if any
    pub orbit: Option<usize>,
}

impl Instrument {
    /// Load the iteration window following the loaded one.
    ///
    /// With nothing loaded, the first window of the bounds is loaded.
    pub fn next(&mut self) -> Result<(), SatFrameError> {
        let windows = self.iteration_windows()?;
        let target = match self.iteration_position(&windows)? {
            None => windows.first().copied(),
            Some(position) => windows.get(position + 1).copied(),
        };
        let window = target.ok_or_else(|| SatFrameError::EndOfData(self.outside_bounds()))?;
        self.load_window(window, false)
    }

    /// Load the iteration window preceding the loaded one.
    ///
    /// With nothing loaded, the last window of the bounds is loaded.
    pub fn prev(&mut self) -> Result<(), SatFrameError> {
        let windows = self.iteration_windows()?;
        let target = match self.iteration_position(&windows)? {
            None => windows.last().copied(),
            Some(0) => None,
            Some(position) => windows.get(position - 1).copied(),
        };
        let window = target.ok_or_else(|| SatFrameError::EndOfData(self.outside_bounds()))?;
        self.load_window(window, false)
    }

    /// Iterate over every window of the bounds, from the first one.
    pub fn windows(&mut self) -> Result<WindowIter<'_>, SatFrameError> {
        let windows = self.iteration_windows()?;
        Ok(WindowIter {
            inst: self,
            windows,
            position: 0,
            failed: false,
        })
    }

    /// Copy of the loaded data and load parameters.
    pub fn snapshot(&self) -> WindowResult {
        let current = self.orbit_state.current();
        WindowResult {
            data: self.data.clone(),
            meta: self.meta.clone(),
            date: self.date,
            fid: self.fid,
            orbit: (current > 0).then_some(current),
        }
    }

    /// Load the first iteration window.
    pub(crate) fn rewind(&mut self) -> Result<(), SatFrameError> {
        let windows = self.iteration_windows()?;
        let first = windows
            .first()
            .copied()
            .ok_or_else(|| SatFrameError::EndOfData(self.outside_bounds()))?;
        self.load_window(first, false)
    }

    /// Position of the loaded window in `windows`, `None` when nothing is loaded.
    fn iteration_position(&self, windows: &[LoadWindow]) -> Result<Option<usize>, SatFrameError> {
        if self.window.is_none() {
            return Ok(None);
        }
        let by_date = self.bounds().map_or(true, |b| b.is_dates());
        let position = windows.iter().position(|window| match *window {
            LoadWindow::Date { start, .. } => by_date && self.date == Some(start),
            LoadWindow::Files { start, .. } => !by_date && self.fid == Some(start),
            LoadWindow::All => false,
        });
        match position {
            Some(position) => Ok(Some(position)),
            None if by_date => Err(SatFrameError::EndOfData(
                "Unable to find loaded date in the supported iteration list. Please check the Instrument bounds for supported iteration ranges.".into(),
            )),
            None => Err(SatFrameError::EndOfData(
                "Unable to find loaded filename in the supported iteration list. Please check the Instrument bounds for supported iteration ranges.".into(),
            )),
        }
    }

    fn outside_bounds(&self) -> String {
        match self.bounds() {
            Some(bounds) if !bounds.is_dates() => "Outside the set file boundaries.".into(),
            _ => "Outside the set date boundaries.".into(),
        }
    }
}

/// Iterator over the windows of an instrument, see [`Instrument::windows`].
pub struct WindowIter<'a> {
    inst: &'a mut Instrument,
    windows: Vec<LoadWindow>,
    position: usize,
    failed: bool,
}

impl Iterator for WindowIter<'_> {
    type Item = Result<WindowResult, SatFrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let window = *self.windows.get(self.position)?;
        self.position += 1;
        match self.inst.load_window(window, false) {
            Ok(()) => Some(Ok(self.inst.snapshot())),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
