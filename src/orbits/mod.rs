//! # Orbits: orbit segmentation of the loaded data
//!
//! The data of an [`Instrument`] window is cut into orbits at break positions
//! computed from an orbit index variable (see [`breaks`]). Orbits are numbered
//! from 1 within the loaded window, negative numbers count from the end.
//!
//! ## Overview
//!
//! - [`Orbits::get`] returns the raw slice of one orbit of the window.
//! - [`Orbits::load`] does the same, but completes the first and last orbits
//!   with the neighbouring windows.
//! - [`Orbits::next`] / [`Orbits::prev`] step orbit by orbit and cross window
//!   boundaries, loading the neighbouring window through the instrument.
//! - [`Orbits::iter`] walks every orbit of the instrument bounds.
//!
//! Orbit breaks are computed on first use after a load and kept until the
//! instrument data changes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satframe::instrument::{Instrument, LoadRequest};
//! use satframe::instruments::synthetic::SyntheticInstrument;
//! use satframe::orbits::OrbitInfo;
//!
//! let info = OrbitInfo::new("local time", "mlt").unwrap();
//! let mut inst = Instrument::builder(SyntheticInstrument::new())
//!     .orbit_info(info)
//!     .build()
//!     .unwrap();
//! inst.load(&LoadRequest::by_doy(2009, 1)).unwrap();
//!
//! let mut orbits = inst.orbits().unwrap();
//! println!("{} orbits", orbits.num().unwrap());
//! orbits.next().unwrap();
//! println!("{}", orbits.instrument().data());
//! ```
//!
//! ## See also
//! ------------
//! * [`params::OrbitParams`] – tuning of the break heuristics.
//! * [`crate::instrument::Instrument::next`] – window stepping used at orbit boundaries.
pub mod breaks;
pub mod params;
mod stepping;

use std::{fmt, str::FromStr};

use hifitime::{Duration, Unit};
use once_cell::unsync::OnceCell;

use crate::{
    constants::{DEFAULT_ORBIT_PERIOD_MINUTES, LOCAL_TIME_CYCLE, LONGITUDE_CYCLE},
    dataset::Dataset,
    instrument::Instrument,
    satframe_errors::SatFrameError,
};

use params::OrbitParams;

pub use stepping::OrbitIter;

/// How orbit breaks are found in the orbit index variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitKind {
    /// Magnetic or solar local time, wrapping every 24 hours
    LocalTime,
    /// Geographic longitude, wrapping every 360 degrees
    Longitude,
    /// Latitude, an orbit starts at each equator crossing
    Polar,
    /// Orbit counter, an orbit starts at each change of value
    OrbitNumber,
}

impl OrbitKind {
    /// Length of the cycle of the index, for the cyclic kinds.
    pub fn cycle(&self) -> Option<f64> {
        match self {
            OrbitKind::LocalTime => Some(LOCAL_TIME_CYCLE),
            OrbitKind::Longitude => Some(LONGITUDE_CYCLE),
            OrbitKind::Polar | OrbitKind::OrbitNumber => None,
        }
    }
}

impl FromStr for OrbitKind {
    type Err = SatFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local time" | "lt" => Ok(OrbitKind::LocalTime),
            "longitude" | "long" | "lon" => Ok(OrbitKind::Longitude),
            "polar" => Ok(OrbitKind::Polar),
            "orbit" => Ok(OrbitKind::OrbitNumber),
            _ => Err(SatFrameError::UnknownOrbitKind(s.to_string())),
        }
    }
}

impl fmt::Display for OrbitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrbitKind::LocalTime => "local time",
            OrbitKind::Longitude => "longitude",
            OrbitKind::Polar => "polar",
            OrbitKind::OrbitNumber => "orbit",
        };
        f.write_str(name)
    }
}

/// Orbit definition of an instrument: kind, index variable and period.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitInfo {
    kind: OrbitKind,
    index: String,
    period: Duration,
}

impl OrbitInfo {
    /// Build an orbit definition with the default 97 minutes period.
    ///
    /// Arguments
    /// -----------------
    /// * `kind`: one of `local time` (`lt`), `longitude` (`long`, `lon`),
    ///   `polar` or `orbit`, case insensitive.
    /// * `index`: name of the variable used to find the breaks.
    ///
    /// Return
    /// ----------
    /// * [`SatFrameError::UnknownOrbitKind`] or [`SatFrameError::MissingOrbitIndex`]
    ///   when the definition cannot be used.
    pub fn new(kind: &str, index: &str) -> Result<Self, SatFrameError> {
        let kind = kind.parse::<OrbitKind>()?;
        if index.trim().is_empty() {
            return Err(SatFrameError::MissingOrbitIndex(
                "Orbit properties must be defined".into(),
            ));
        }
        Ok(OrbitInfo {
            kind,
            index: index.to_string(),
            period: Unit::Minute * DEFAULT_ORBIT_PERIOD_MINUTES,
        })
    }

    /// Same definition with another orbital period.
    pub fn with_period(self, period: Duration) -> Result<Self, SatFrameError> {
        if period <= Duration::ZERO {
            return Err(SatFrameError::InvalidParameter(format!(
                "orbital period must be positive, got {period}"
            )));
        }
        Ok(OrbitInfo { period, ..self })
    }

    pub fn kind(&self) -> OrbitKind {
        self.kind
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl fmt::Display for OrbitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} orbits on `{}`, period {}",
            self.kind, self.index, self.period
        )
    }
}

/// Orbit state kept by the instrument between two loads.
#[derive(Debug, Default)]
pub(crate) struct OrbitState {
    /// Breaks of `full`, computed on first use
    breaks: OnceCell<Vec<usize>>,
    /// Data the breaks refer to
    full: Option<Dataset>,
    /// 1-based selected orbit, 0 when none
    current: usize,
}

impl OrbitState {
    pub(crate) fn reset(&mut self) {
        self.breaks.take();
        self.full = None;
        self.current = 0;
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }
}

/// Orbit navigation over the data of an [`Instrument`], see [`Instrument::orbits`].
pub struct Orbits<'a> {
    inst: &'a mut Instrument,
    info: OrbitInfo,
    params: OrbitParams,
}

impl<'a> Orbits<'a> {
    pub(crate) fn new(inst: &'a mut Instrument, info: OrbitInfo, params: OrbitParams) -> Self {
        Orbits { inst, info, params }
    }

    pub fn info(&self) -> &OrbitInfo {
        &self.info
    }

    pub fn params(&self) -> &OrbitParams {
        &self.params
    }

    pub fn instrument(&self) -> &Instrument {
        self.inst
    }

    /// 1-based selected orbit, 0 when no orbit is selected.
    pub fn current(&self) -> usize {
        self.inst.orbit_state.current
    }

    /// Number of orbits in the loaded window.
    pub fn num(&mut self) -> Result<usize, SatFrameError> {
        Ok(self.compute_breaks()?.len())
    }

    /// Break positions of the loaded window, computed on first call.
    ///
    /// Return
    /// ----------
    /// * Strictly increasing row positions starting at 0, empty when no data is
    ///   loaded, or [`SatFrameError::MissingOrbitIndex`] when the orbit index
    ///   variable is not in the data.
    pub fn compute_breaks(&mut self) -> Result<&[usize], SatFrameError> {
        let inst: &mut Instrument = self.inst;
        let state = &mut inst.orbit_state;
        let full: &Dataset = state.full.get_or_insert_with(|| inst.data.clone());
        let breaks = state
            .breaks
            .get_or_try_init(|| breaks::compute_breaks(full, &self.info, &self.params))?;
        Ok(breaks.as_slice())
    }

    /// Select orbit `n` of the loaded window, without looking at the
    /// neighbouring windows.
    ///
    /// Arguments
    /// -----------------
    /// * `n`: 1-based orbit number, `-1` is the last orbit.
    ///
    /// Return
    /// ----------
    /// * [`SatFrameError::InvalidOrbitNumber`] for `0` or a number beyond the
    ///   orbit count.
    pub fn get(&mut self, n: isize) -> Result<(), SatFrameError> {
        let num = self.num()?;
        let k = Self::resolve(n, num)?;
        let breaks = self.compute_breaks()?;
        let start = breaks[k - 1];
        let stop = breaks.get(k).copied();

        let state = &mut self.inst.orbit_state;
        let orbit = match &state.full {
            Some(full) => full.slice_rows(start..stop.unwrap_or(full.len())),
            None => return Err(SatFrameError::InvalidOrbitNumber(format!("orbit {n}"))),
        };
        state.current = k;
        self.inst.data = orbit;
        log::debug!("Now on orbit {k} of {num}");
        Ok(())
    }

    /// Select orbit `n` of the loaded window. The first and the last orbits
    /// are completed with the data of the neighbouring windows when they
    /// cross the window boundary.
    pub fn load(&mut self, n: isize) -> Result<(), SatFrameError> {
        if self.inst.data.is_empty() {
            log::info!("Need to load instrument first");
            return Ok(());
        }
        let num = self.num()?;
        let k = Self::resolve(n, num)?;
        if k == 1 {
            self.bridge_backward()
        } else if k == num {
            self.bridge_forward()
        } else {
            self.get(k as isize)
        }
    }

    fn resolve(n: isize, num: usize) -> Result<usize, SatFrameError> {
        let k = if n < 0 { num as isize + n + 1 } else { n };
        if n == 0 || k < 1 || k > num as isize {
            return Err(SatFrameError::InvalidOrbitNumber(format!(
                "orbit {n} requested, {num} orbits available"
            )));
        }
        Ok(k as usize)
    }
}
