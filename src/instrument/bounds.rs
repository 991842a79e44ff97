//! Iteration bounds of an instrument.
//!
//! [`Bounds`] lists the windows [`Instrument::next`] and [`Instrument::prev`]
//! walk through, either as date segments or as file-name segments. Each
//! segment is cut into windows of `width` (days or files), starting every
//! `step`. Without explicit bounds, an instrument iterates day by day from the
//! first to the last date of its file catalog.
use hifitime::{Duration, Epoch, Unit};

use crate::{
    files::FileCatalog,
    instrument::{load_request::LoadWindow, Instrument},
    satframe_errors::SatFrameError,
    time::{floor_day, format_day},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Bounds {
    /// Date segments `[starts[i], stops[i]]`, both days included
    Dates {
        starts: Vec<Epoch>,
        stops: Vec<Epoch>,
        step: Duration,
        width: Duration,
    },
    /// File segments from `starts[i]` to `stops[i]`, both files included
    Files {
        starts: Vec<String>,
        stops: Vec<String>,
        step: usize,
        width: usize,
    },
}

impl Bounds {
    /// Every day of `start..=stop`, one day at a time.
    pub fn dates(start: Epoch, stop: Epoch) -> Self {
        Bounds::Dates {
            starts: vec![start],
            stops: vec![stop],
            step: Unit::Day * 1,
            width: Unit::Day * 1,
        }
    }

    /// Every file from `start` to `stop`, one file at a time.
    pub fn files(start: impl Into<String>, stop: impl Into<String>) -> Self {
        Bounds::Files {
            starts: vec![start.into()],
            stops: vec![stop.into()],
            step: 1,
            width: 1,
        }
    }

    /// Same segments, with a new step between two window starts.
    ///
    /// For file bounds the step is a number of files, rounded from `days`.
    pub fn with_step_days(self, days: i64) -> Self {
        match self {
            Bounds::Dates {
                starts,
                stops,
                width,
                ..
            } => Bounds::Dates {
                starts,
                stops,
                step: Unit::Day * days,
                width,
            },
            Bounds::Files {
                starts,
                stops,
                width,
                ..
            } => Bounds::Files {
                starts,
                stops,
                step: days.max(0) as usize,
                width,
            },
        }
    }

    /// Same segments, with a new window width (days or files).
    pub fn with_width(self, width: i64) -> Self {
        match self {
            Bounds::Dates {
                starts,
                stops,
                step,
                ..
            } => Bounds::Dates {
                starts,
                stops,
                step,
                width: Unit::Day * width,
            },
            Bounds::Files {
                starts,
                stops,
                step,
                ..
            } => Bounds::Files {
                starts,
                stops,
                step,
                width: width.max(0) as usize,
            },
        }
    }

    pub fn is_dates(&self) -> bool {
        matches!(self, Bounds::Dates { .. })
    }

    /// Check the bounds against a file catalog.
    pub(crate) fn validate(&self, files: &FileCatalog) -> Result<(), SatFrameError> {
        match self {
            Bounds::Dates {
                starts,
                stops,
                step,
                width,
            } => {
                Self::check_segment_count(starts.len(), stops.len())?;
                if *step <= Duration::ZERO || *width <= Duration::ZERO {
                    return Err(SatFrameError::InvalidBounds(
                        "step and width must be positive".into(),
                    ));
                }
                for (start, stop) in starts.iter().zip(stops) {
                    if stop < start {
                        return Err(SatFrameError::InvalidBounds(format!(
                            "segment stops on {} before it starts on {}",
                            format_day(*stop),
                            format_day(*start)
                        )));
                    }
                }
                Ok(())
            }
            Bounds::Files {
                starts,
                stops,
                step,
                width,
            } => {
                Self::check_segment_count(starts.len(), stops.len())?;
                if *step == 0 || *width == 0 {
                    return Err(SatFrameError::InvalidBounds(
                        "step and width must be positive".into(),
                    ));
                }
                for (start, stop) in starts.iter().zip(stops) {
                    if files.get_index(stop)? < files.get_index(start)? {
                        return Err(SatFrameError::InvalidBounds(format!(
                            "segment stops on {stop} before it starts on {start}"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn check_segment_count(starts: usize, stops: usize) -> Result<(), SatFrameError> {
        if starts == 0 || starts != stops {
            return Err(SatFrameError::InvalidBounds(format!(
                "{starts} segment starts for {stops} segment stops"
            )));
        }
        Ok(())
    }

    /// Windows covered by the bounds, in iteration order.
    pub(crate) fn windows(&self, files: &FileCatalog) -> Result<Vec<LoadWindow>, SatFrameError> {
        let mut windows = Vec::new();
        match self {
            Bounds::Dates {
                starts,
                stops,
                step,
                width,
            } => {
                for (start, stop) in starts.iter().zip(stops) {
                    let limit = floor_day(*stop) + Unit::Day * 1;
                    let mut current = floor_day(*start);
                    while current + *width <= limit {
                        windows.push(LoadWindow::Date {
                            start: current,
                            step: *width,
                        });
                        current = current + *step;
                    }
                }
            }
            Bounds::Files {
                starts,
                stops,
                step,
                width,
            } => {
                for (start, stop) in starts.iter().zip(stops) {
                    let first = files.get_index(start)?;
                    let last = files.get_index(stop)?;
                    let mut current = first;
                    while current + width - 1 <= last {
                        windows.push(LoadWindow::Files {
                            start: current as isize,
                            step: width - 1,
                        });
                        current += step;
                    }
                }
            }
        }
        Ok(windows)
    }
}

impl Instrument {
    /// Iteration bounds in use: the ones set with [`Instrument::set_bounds`], or
    /// every day of the file catalog.
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.bounds {
            Some(bounds) => Some(bounds.clone()),
            None => match (self.files.start_date(), self.files.stop_date()) {
                (Some(start), Some(stop)) => Some(Bounds::dates(floor_day(start), floor_day(stop))),
                _ => None,
            },
        }
    }

    /// Restrict iteration to `bounds`, or go back to the catalog range with `None`.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) -> Result<(), SatFrameError> {
        if let Some(bounds) = &bounds {
            bounds.validate(&self.files)?;
        }
        self.bounds = bounds;
        Ok(())
    }

    /// Windows of the current bounds, in iteration order.
    pub fn iteration_windows(&self) -> Result<Vec<LoadWindow>, SatFrameError> {
        match self.bounds() {
            Some(bounds) => bounds.windows(&self.files),
            None => Ok(Vec::new()),
        }
    }
}
