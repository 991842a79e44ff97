//! Orbit stepping across window boundaries.
//!
//! Inside a window, stepping only moves between the break positions. At the
//! first or last orbit the neighbouring window is loaded through the
//! instrument, the edge orbit is glued to the neighbour data and the orbit
//! spanning the boundary is selected whole.
//!
//! With date windows, a neighbour is not fetched when the edge orbit is at
//! least one orbital period away from the window boundary.
use crate::{
    dataset::Dataset,
    instrument::WindowResult,
    orbits::Orbits,
    satframe_errors::SatFrameError,
};

impl<'a> Orbits<'a> {
    /// Select the next orbit, loading the next window when needed.
    ///
    /// Return
    /// ----------
    /// * [`SatFrameError::EndOfData`] past the last orbit of the instrument bounds.
    pub fn next(&mut self) -> Result<(), SatFrameError> {
        if self.inst.data.is_empty() {
            while self.inst.data.is_empty() {
                self.inst.next()?;
            }
            return self.next();
        }

        let num = self.num()?;
        let current = self.current();
        if current == 0 {
            self.load(1)
        } else if current >= num {
            self.step_past_last()
        } else if current == num - 1 {
            self.bridge_forward()
        } else {
            self.get(current as isize + 1)
        }
    }

    /// Select the previous orbit, loading the previous window when needed.
    ///
    /// Return
    /// ----------
    /// * [`SatFrameError::EndOfData`] before the first orbit of the instrument bounds.
    pub fn prev(&mut self) -> Result<(), SatFrameError> {
        if self.inst.data.is_empty() {
            while self.inst.data.is_empty() {
                self.inst.prev()?;
            }
            return self.prev();
        }

        match self.current() {
            0 => self.load(-1),
            1 => self.step_before_first(),
            2 => self.bridge_backward(),
            current => self.get(current as isize - 1),
        }
    }

    /// Iterate over every orbit of the instrument bounds, from the first window.
    pub fn iter(self) -> OrbitIter<'a> {
        OrbitIter {
            orbits: self,
            started: false,
            done: false,
        }
    }

    /// Select the last orbit and complete it with the head of the next window.
    pub(crate) fn bridge_forward(&mut self) -> Result<(), SatFrameError> {
        self.get(-1)?;
        let last = self.inst.data.last_time();
        if let (Some((_, window_end)), Some(last)) = (self.inst.date_window_bounds(), last) {
            if window_end - last >= self.info.period() {
                return Ok(());
            }
        }

        let saved = self.inst.data.clone();
        match self.inst.next() {
            Ok(()) => {}
            Err(e) if e.is_end_of_data() => {
                log::debug!("No window after the last orbit, keeping it as is");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if self.inst.data.is_empty() {
            self.inst.prev()?;
            return self.get(-1);
        }
        self.glue_before(&saved);
        self.get(1)
    }

    /// Select the first orbit and complete it with the tail of the previous window.
    pub(crate) fn bridge_backward(&mut self) -> Result<(), SatFrameError> {
        self.get(1)?;
        let first = self.inst.data.first_time();
        if let (Some((window_start, _)), Some(first)) = (self.inst.date_window_bounds(), first) {
            if first - window_start >= self.info.period() {
                return Ok(());
            }
        }

        let saved = self.inst.data.clone();
        match self.inst.prev() {
            Ok(()) => {}
            Err(e) if e.is_end_of_data() => {
                log::debug!("No window before the first orbit, keeping it as is");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if self.inst.data.is_empty() {
            self.inst.next()?;
            return self.get(1);
        }
        self.glue_after(&saved);
        self.get(-1)
    }

    /// Move from the last orbit of a window to the first new orbit of the next one.
    fn step_past_last(&mut self) -> Result<(), SatFrameError> {
        let saved = self.inst.data.clone();
        self.inst.next()?;
        while self.inst.data.is_empty() {
            self.inst.next()?;
        }

        if !self.continues_after(&saved) || !self.glue_before(&saved) {
            self.get(1)?;
            if self.num()? == 1 {
                return self.bridge_forward();
            }
            return Ok(());
        }

        if self.num()? < 2 {
            self.get(1)?;
            return self.next();
        }
        self.get(2)
    }

    /// Move from the first orbit of a window to the last new orbit of the previous one.
    fn step_before_first(&mut self) -> Result<(), SatFrameError> {
        let saved = self.inst.data.clone();
        self.inst.prev()?;
        while self.inst.data.is_empty() {
            self.inst.prev()?;
        }

        if !self.continues_before(&saved) || !self.glue_after(&saved) {
            self.get(-1)?;
            if self.num()? == 1 {
                return self.bridge_backward();
            }
            return Ok(());
        }

        if self.num()? < 2 {
            self.get(-1)?;
            return self.prev();
        }
        self.get(-2)
    }

    /// Prepend the part of `saved` before the loaded data. Returns `false`
    /// when nothing was added.
    fn glue_before(&mut self, saved: &Dataset) -> bool {
        let head = match self.inst.data.first_time() {
            Some(first) => saved.before(first),
            None => return false,
        };
        if head.is_empty() {
            return false;
        }
        self.inst.concat_data(head, true);
        true
    }

    /// Append the part of `saved` after the loaded data. Returns `false`
    /// when nothing was added.
    fn glue_after(&mut self, saved: &Dataset) -> bool {
        let tail = match self.inst.data.last_time() {
            Some(last) => saved.after(last),
            None => return false,
        };
        if tail.is_empty() {
            return false;
        }
        self.inst.concat_data(tail, false);
        true
    }

    /// Whether the orbit `saved`, taken from the previous window, may go on
    /// in the loaded window.
    fn continues_after(&self, saved: &Dataset) -> bool {
        if self.inst.date_window_bounds().is_none() {
            return true;
        }
        match (saved.last_time(), self.inst.data.first_time()) {
            (Some(last), Some(first)) => first - last < self.info.period(),
            _ => false,
        }
    }

    /// Whether the orbit `saved`, taken from the next window, may have
    /// started in the loaded window.
    fn continues_before(&self, saved: &Dataset) -> bool {
        if self.inst.date_window_bounds().is_none() {
            return true;
        }
        match (saved.first_time(), self.inst.data.last_time()) {
            (Some(first), Some(last)) => first - last < self.info.period(),
            _ => false,
        }
    }
}

/// Iterator over the orbits of an instrument, see [`Orbits::iter`].
///
/// Each item is a copy of the instrument data restricted to one orbit.
/// Iteration stops at the end of the instrument bounds; any other error is
/// yielded once and ends the iteration.
pub struct OrbitIter<'a> {
    orbits: Orbits<'a>,
    started: bool,
    done: bool,
}

impl<'a> OrbitIter<'a> {
    fn finish(&mut self, error: SatFrameError) -> Option<Result<WindowResult, SatFrameError>> {
        self.done = true;
        if error.is_end_of_data() {
            None
        } else {
            Some(Err(error))
        }
    }
}

impl Iterator for OrbitIter<'_> {
    type Item = Result<WindowResult, SatFrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            if let Err(e) = self.orbits.inst.rewind() {
                return self.finish(e);
            }
        }
        match self.orbits.next() {
            Ok(()) => Some(Ok(self.orbits.inst.snapshot())),
            Err(e) => self.finish(e),
        }
    }
}
