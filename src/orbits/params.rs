//! Tuning of the orbit break heuristics.
//!
//! The defaults reproduce the behaviour expected for low Earth orbit
//! satellites sampled every few seconds. They are empirical: change them only
//! when a data set shows spurious or missing breaks.
use std::fmt;

use crate::{
    constants::{
        DEFAULT_CONSISTENCY_RATIO, DEFAULT_DECREASE_THRESHOLD, DEFAULT_FALSE_POSITIVE_JUMP,
        DEFAULT_FALSE_POSITIVE_WINDOW, DEFAULT_GAP_FRACTION, DEFAULT_MIN_BREAK_SEPARATION,
    },
    satframe_errors::SatFrameError,
};

/// Parameters of the orbit break detection.
///
/// Fields
/// -----------------
/// * `decrease_threshold`: a sample-to-sample change of the orbit index below
///   this value (index units, negative) is a break candidate.
/// * `false_positive_window`: half width, in samples, of the window inspected
///   around each candidate for a large positive jump.
/// * `false_positive_jump`: multiple of the median index step above which a
///   positive jump is inspected.
/// * `consistency_ratio`: minimum value of `elapsed / period - change / cycle`
///   between two consecutive breaks.
/// * `gap_fraction`: fraction of the orbital period a time gap must exceed to
///   become a break.
/// * `min_break_separation`: candidates this close (in samples) to the next
///   one are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitParams {
    pub decrease_threshold: f64,
    pub false_positive_window: usize,
    pub false_positive_jump: f64,
    pub consistency_ratio: f64,
    pub gap_fraction: f64,
    pub min_break_separation: usize,
}

impl OrbitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> OrbitParamsBuilder {
        OrbitParamsBuilder::new()
    }
}

impl Default for OrbitParams {
    fn default() -> Self {
        OrbitParams {
            decrease_threshold: DEFAULT_DECREASE_THRESHOLD,
            false_positive_window: DEFAULT_FALSE_POSITIVE_WINDOW,
            false_positive_jump: DEFAULT_FALSE_POSITIVE_JUMP,
            consistency_ratio: DEFAULT_CONSISTENCY_RATIO,
            gap_fraction: DEFAULT_GAP_FRACTION,
            min_break_separation: DEFAULT_MIN_BREAK_SEPARATION,
        }
    }
}

impl fmt::Display for OrbitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Orbit break parameters")?;
        writeln!(f, "----------------------")?;
        writeln!(f, "  decrease_threshold    = {:.3}", self.decrease_threshold)?;
        writeln!(f, "  false_positive_window = {}", self.false_positive_window)?;
        writeln!(f, "  false_positive_jump   = {:.1}", self.false_positive_jump)?;
        writeln!(f, "  consistency_ratio     = {:.3}", self.consistency_ratio)?;
        writeln!(f, "  gap_fraction          = {:.3}", self.gap_fraction)?;
        write!(f, "  min_break_separation  = {}", self.min_break_separation)
    }
}

/// Builder for [`OrbitParams`], with validation.
#[derive(Debug, Clone)]
pub struct OrbitParamsBuilder {
    params: OrbitParams,
}

impl Default for OrbitParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: OrbitParams::default(),
        }
    }

    pub fn decrease_threshold(mut self, v: f64) -> Self {
        self.params.decrease_threshold = v;
        self
    }

    pub fn false_positive_window(mut self, v: usize) -> Self {
        self.params.false_positive_window = v;
        self
    }

    pub fn false_positive_jump(mut self, v: f64) -> Self {
        self.params.false_positive_jump = v;
        self
    }

    pub fn consistency_ratio(mut self, v: f64) -> Self {
        self.params.consistency_ratio = v;
        self
    }

    pub fn gap_fraction(mut self, v: f64) -> Self {
        self.params.gap_fraction = v;
        self
    }

    pub fn min_break_separation(mut self, v: usize) -> Self {
        self.params.min_break_separation = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(OrbitParams)` if every value is usable.
    /// * `Err(SatFrameError::InvalidParameter)` when
    ///   - `decrease_threshold` is not strictly negative,
    ///   - `false_positive_jump` is not a finite value above 1,
    ///   - `gap_fraction` is outside `(0, 1]`,
    ///   - `consistency_ratio` is not finite.
    pub fn build(self) -> Result<OrbitParams, SatFrameError> {
        let p = &self.params;

        if !(p.decrease_threshold.is_finite() && p.decrease_threshold < 0.0) {
            return Err(SatFrameError::InvalidParameter(
                "decrease_threshold must be < 0".into(),
            ));
        }
        if !(p.false_positive_jump.is_finite() && p.false_positive_jump > 1.0) {
            return Err(SatFrameError::InvalidParameter(
                "false_positive_jump must be > 1".into(),
            ));
        }
        if !(p.gap_fraction > 0.0 && p.gap_fraction <= 1.0) {
            return Err(SatFrameError::InvalidParameter(
                "gap_fraction must be in (0, 1]".into(),
            ));
        }
        if !p.consistency_ratio.is_finite() {
            return Err(SatFrameError::InvalidParameter(
                "consistency_ratio must be finite".into(),
            ));
        }

        Ok(self.params)
    }
}
