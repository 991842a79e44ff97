//! Load requests and the windows they resolve to.
//!
//! A [`LoadRequest`] collects the user arguments of
//! [`Instrument::load`](crate::instrument::Instrument::load). Exactly one
//! addressing mode may be used per request:
//!
//! * by day: `yr` + `doy`, optionally `end_yr` + `end_doy`,
//! * by date: `date`, optionally `end_date`,
//! * by file: `fname`, optionally `stop_fname`,
//! * nothing at all, which loads every file of the catalog.
//!
//! The request resolves against the [`FileCatalog`] into a [`LoadWindow`], the
//! anchor + step pair the cache is keyed on. Date windows are end-exclusive
//! (`[date, end_date)`), file windows include both named files.
use std::fmt;

use hifitime::{Duration, Epoch, Unit};

use crate::{
    files::FileCatalog,
    satframe_errors::SatFrameError,
    time::{floor_day, format_day, from_year_doy},
};

/// Resolved addressing of a load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadWindow {
    /// Files with `start <= date < start + step`
    Date { start: Epoch, step: Duration },
    /// Files at positions `start..=start + step`
    Files { start: isize, step: usize },
    /// Every file of the catalog
    All,
}

impl LoadWindow {
    /// Window right after this one, with the same step.
    pub fn following(&self) -> LoadWindow {
        match *self {
            LoadWindow::Date { start, step } => LoadWindow::Date {
                start: start + step,
                step,
            },
            LoadWindow::Files { start, step } => LoadWindow::Files {
                start: start + step as isize + 1,
                step,
            },
            LoadWindow::All => LoadWindow::All,
        }
    }

    /// Window right before this one, with the same step.
    pub fn preceding(&self) -> LoadWindow {
        match *self {
            LoadWindow::Date { start, step } => LoadWindow::Date {
                start: start - step,
                step,
            },
            LoadWindow::Files { start, step } => LoadWindow::Files {
                start: start - step as isize - 1,
                step,
            },
            LoadWindow::All => LoadWindow::All,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, LoadWindow::Date { .. })
    }

    pub fn is_files(&self) -> bool {
        matches!(self, LoadWindow::Files { .. })
    }
}

impl fmt::Display for LoadWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWindow::Date { start, step } => {
                write!(f, "{} (+{})", format_day(*start), step)
            }
            LoadWindow::Files { start, step } => write!(f, "files {start}..={}", start + *step as isize),
            LoadWindow::All => write!(f, "all files"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadRequest {
    pub yr: Option<i32>,
    pub doy: Option<u16>,
    pub end_yr: Option<i32>,
    pub end_doy: Option<u16>,
    pub date: Option<Epoch>,
    pub end_date: Option<Epoch>,
    pub fname: Option<String>,
    pub stop_fname: Option<String>,
    pub verify_pad: bool,
}

impl LoadRequest {
    /// Request loading every available file.
    pub fn new() -> Self {
        LoadRequest::default()
    }

    /// Request the day `doy` of year `yr`.
    pub fn by_doy(yr: i32, doy: u16) -> Self {
        LoadRequest::new().yr(yr).doy(doy)
    }

    /// Request the day containing `date`.
    pub fn by_date(date: Epoch) -> Self {
        LoadRequest::new().date(date)
    }

    /// Request the file `fname`.
    pub fn by_file(fname: impl Into<String>) -> Self {
        LoadRequest::new().fname(fname)
    }

    pub fn yr(mut self, v: i32) -> Self {
        self.yr = Some(v);
        self
    }

    pub fn doy(mut self, v: u16) -> Self {
        self.doy = Some(v);
        self
    }

    pub fn end_yr(mut self, v: i32) -> Self {
        self.end_yr = Some(v);
        self
    }

    pub fn end_doy(mut self, v: u16) -> Self {
        self.end_doy = Some(v);
        self
    }

    pub fn date(mut self, v: Epoch) -> Self {
        self.date = Some(v);
        self
    }

    pub fn end_date(mut self, v: Epoch) -> Self {
        self.end_date = Some(v);
        self
    }

    pub fn fname(mut self, v: impl Into<String>) -> Self {
        self.fname = Some(v.into());
        self
    }

    pub fn stop_fname(mut self, v: impl Into<String>) -> Self {
        self.stop_fname = Some(v.into());
        self
    }

    /// Keep the padded data after loading.
    pub fn verify_pad(mut self, v: bool) -> Self {
        self.verify_pad = v;
        self
    }

    fn has_doy_args(&self) -> bool {
        self.yr.is_some() || self.doy.is_some() || self.end_yr.is_some() || self.end_doy.is_some()
    }

    fn has_date_args(&self) -> bool {
        self.date.is_some() || self.end_date.is_some()
    }

    fn has_file_args(&self) -> bool {
        self.fname.is_some() || self.stop_fname.is_some()
    }

    /// Resolve the request against a file catalog.
    ///
    /// Arguments
    /// -----------------
    /// * `files`: the catalog `fname` and `stop_fname` are looked up in.
    ///
    /// Return
    /// ----------
    /// * The window to load, or
    ///   - [`SatFrameError::ConflictingLoadArguments`] when more than one addressing mode is used,
    ///   - [`SatFrameError::IncompleteLoadArguments`] when half of a pair is missing,
    ///   - [`SatFrameError::InvalidDayOfYear`] for a day of year outside `1..=366`,
    ///   - [`SatFrameError::StopBeforeStart`] when the end of the range is not after its start,
    ///   - [`SatFrameError::FileNotInCatalog`] for an unknown file name.
    pub fn resolve(&self, files: &FileCatalog) -> Result<LoadWindow, SatFrameError> {
        let modes = [
            self.has_doy_args(),
            self.has_date_args(),
            self.has_file_args(),
        ];
        if modes.iter().filter(|m| **m).count() > 1 {
            return Err(SatFrameError::ConflictingLoadArguments(
                "use only one of yr/doy, date or fname style arguments".into(),
            ));
        }

        if self.has_doy_args() {
            let (Some(yr), Some(doy)) = (self.yr, self.doy) else {
                return Err(SatFrameError::IncompleteLoadArguments(
                    "both yr and doy must be set".into(),
                ));
            };
            let start = from_year_doy(yr, doy)?;
            let stop = match (self.end_yr, self.end_doy) {
                (None, None) => None,
                (Some(end_yr), Some(end_doy)) => Some(from_year_doy(end_yr, end_doy)?),
                _ => {
                    return Err(SatFrameError::IncompleteLoadArguments(
                        "both end_yr and end_doy must be set".into(),
                    ))
                }
            };
            return Self::date_window(start, stop);
        }

        if self.has_date_args() {
            let Some(date) = self.date else {
                return Err(SatFrameError::IncompleteLoadArguments(
                    "end_date requires date".into(),
                ));
            };
            return Self::date_window(floor_day(date), self.end_date.map(floor_day));
        }

        if self.has_file_args() {
            let Some(fname) = self.fname.as_deref() else {
                return Err(SatFrameError::IncompleteLoadArguments(
                    "stop_fname requires fname".into(),
                ));
            };
            let start = files.get_index(fname)?;
            let step = match self.stop_fname.as_deref() {
                None => 0,
                Some(stop_fname) => {
                    let stop = files.get_index(stop_fname)?;
                    if stop < start {
                        return Err(SatFrameError::StopBeforeStart {
                            start: fname.to_string(),
                            stop: stop_fname.to_string(),
                        });
                    }
                    stop - start
                }
            };
            return Ok(LoadWindow::Files {
                start: start as isize,
                step,
            });
        }

        Ok(LoadWindow::All)
    }

    fn date_window(start: Epoch, stop: Option<Epoch>) -> Result<LoadWindow, SatFrameError> {
        let step = match stop {
            None => Unit::Day * 1,
            Some(stop) => {
                if stop <= start {
                    return Err(SatFrameError::StopBeforeStart {
                        start: format_day(start),
                        stop: format_day(stop),
                    });
                }
                stop - start
            }
        };
        Ok(LoadWindow::Date { start, step })
    }
}
