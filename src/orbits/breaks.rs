//! Orbit break detection.
//!
//! A break is the row position where a new orbit starts. Every detector
//! returns a strictly increasing list of positions starting with `0`, or an
//! empty list for empty data.
//!
//! ## Gradient breaks (local time, longitude)
//! -----------------
//! The orbit index grows steadily along an orbit and wraps back once per
//! orbit. The detector:
//!
//! 1. flags the samples where the index decreases by more than
//!    `decrease_threshold`,
//! 2. drops flagged samples closer than `min_break_separation` to the next one,
//! 3. drops the candidates that are glitches of the index rather than wraps:
//!    within `false_positive_window` samples, every positive jump larger than
//!    `false_positive_jump` times the median index step is too fast for the
//!    orbital motion, and the largest one recovers at least half of the
//!    candidate's drop. A single jump consistent with the elapsed time is
//!    enough to keep the candidate,
//! 4. adds breaks at the time gaps longer than `gap_fraction` of the period
//!    that hide more motion than the index change shows,
//! 5. keeps a break only when the time elapsed since the previous break,
//!    in periods, minus the index change between them, in cycles, exceeds
//!    `consistency_ratio`.
//!
//! ## Polar breaks
//! -----------------
//! Sign changes of a latitude-like index, in both directions, plus the time
//! gaps longer than `gap_fraction` of the period.
//!
//! ## Orbit number breaks
//! -----------------
//! Changes of value of an orbit counter.
use hifitime::{Duration, Epoch};
use itertools::Itertools;
use smallvec::SmallVec;

use crate::{
    constants::GLITCH_RECOVERY_FRACTION,
    dataset::Dataset,
    orbits::{params::OrbitParams, OrbitInfo, OrbitKind},
    satframe_errors::SatFrameError,
};

/// Break positions of `data` for the orbit definition `info`.
///
/// Arguments
/// -----------------
/// * `data`: the loaded window.
/// * `info`: orbit kind, index variable and period.
/// * `params`: tuning of the gradient and polar heuristics.
///
/// Return
/// ----------
/// * The break positions, or [`SatFrameError::MissingOrbitIndex`] when the index
///   variable is not loaded.
pub fn compute_breaks(
    data: &Dataset,
    info: &OrbitInfo,
    params: &OrbitParams,
) -> Result<Vec<usize>, SatFrameError> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let values = data.column(info.index()).ok_or_else(|| {
        SatFrameError::MissingOrbitIndex(format!(
            "`{}` is not a loaded variable",
            info.index()
        ))
    })?;
    let times = data.index().as_slice();

    let breaks = match info.kind() {
        OrbitKind::LocalTime | OrbitKind::Longitude => {
            let cycle = info.kind().cycle().unwrap_or(1.0);
            gradient_breaks(times, values, cycle, info.period(), params)
        }
        OrbitKind::Polar => polar_breaks(times, values, info.period(), params),
        OrbitKind::OrbitNumber => orbit_number_breaks(values),
    };
    log::debug!(
        "{} orbits found using {} `{}`",
        breaks.len(),
        info.kind(),
        info.index()
    );
    Ok(breaks)
}

/// Breaks of a cyclic index such as local time (`cycle = 24`) or longitude
/// (`cycle = 360`). See the module documentation for the steps.
pub fn gradient_breaks(
    times: &[Epoch],
    values: &[f64],
    cycle: f64,
    period: Duration,
    params: &OrbitParams,
) -> Vec<usize> {
    let n = values.len().min(times.len());
    if n == 0 {
        return Vec::new();
    }
    let period = period.to_seconds();
    let ut_diff = time_steps(&times[..n]);
    let lt_diff = value_steps(&values[..n]);
    let typical_step = median(&lt_diff);
    log::debug!("typical orbit index step {typical_step}");

    let candidates: Vec<usize> = (1..n)
        .filter(|&i| lt_diff[i] < params.decrease_threshold)
        .collect();
    let mut candidates = collapse_adjacent(candidates, n, params.min_break_separation);

    let glitch = GlitchCheck {
        ut_diff: &ut_diff,
        lt_diff: &lt_diff,
        jump: params.false_positive_jump * typical_step,
        window: params.false_positive_window,
        cycle,
        period,
    };
    candidates.retain(|&c| {
        let false_positive = glitch.is_false_positive(c);
        if false_positive {
            log::info!("Dropping found break as false positive.");
        }
        !false_positive
    });

    let gaps: Vec<usize> = (1..n)
        .filter(|&i| {
            let norm_ut = ut_diff[i] / period;
            norm_ut > 1.0 || (norm_ut > params.gap_fraction && norm_ut > lt_diff[i].abs() / cycle)
        })
        .collect();
    if !gaps.is_empty() {
        log::info!("Time gap");
    }

    let merged: Vec<usize> = candidates.into_iter().merge(gaps).dedup().collect();
    consistency_filter(&merged, &times[..n], &values[..n], cycle, period, params.consistency_ratio)
}

/// Breaks at the sign changes of a latitude-like index.
pub fn polar_breaks(
    times: &[Epoch],
    values: &[f64],
    period: Duration,
    params: &OrbitParams,
) -> Vec<usize> {
    let n = values.len().min(times.len());
    if n == 0 {
        return Vec::new();
    }
    let period = period.to_seconds();
    let crossings: Vec<usize> = (1..n)
        .filter(|&i| (values[i - 1] >= 0.0) != (values[i] >= 0.0))
        .collect();
    let crossings = collapse_adjacent(crossings, n, params.min_break_separation);

    let ut_diff = time_steps(&times[..n]);
    let gaps: Vec<usize> = (1..n)
        .filter(|&i| ut_diff[i] / period > params.gap_fraction)
        .collect();
    if !gaps.is_empty() {
        log::info!("Time gap");
    }

    let mut breaks = vec![0];
    breaks.extend(
        crossings
            .into_iter()
            .merge(gaps)
            .dedup()
            .filter(|&b| b != 0),
    );
    breaks
}

/// Breaks at every change of an orbit counter.
pub fn orbit_number_breaks(values: &[f64]) -> Vec<usize> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut breaks = vec![0];
    breaks.extend((1..values.len()).filter(|&i| {
        let (a, b) = (values[i - 1], values[i]);
        a != b && !(a.is_nan() && b.is_nan())
    }));
    breaks
}

/// Sample-to-sample steps around break candidates, and the thresholds telling
/// a glitch of the index from a wrap.
struct GlitchCheck<'a> {
    ut_diff: &'a [f64],
    lt_diff: &'a [f64],
    /// Positive steps above this are large jumps.
    jump: f64,
    window: usize,
    cycle: f64,
    period: f64,
}

impl GlitchCheck<'_> {
    /// A jump is too fast when the index moves more than the orbit allows in
    /// the elapsed time.
    fn too_fast(&self, j: usize) -> bool {
        self.ut_diff[j] < self.lt_diff[j] / self.cycle * self.period
    }

    fn is_false_positive(&self, c: usize) -> bool {
        let lo = c.saturating_sub(self.window);
        let hi = (c + self.window + 1).min(self.lt_diff.len());
        let jumps: SmallVec<[usize; 16]> = (lo..hi)
            .filter(|&j| self.lt_diff[j] > self.jump)
            .collect();
        if jumps.is_empty() || !jumps.iter().all(|&j| self.too_fast(j)) {
            return false;
        }
        // a glitch drops and comes back, a wrap next to a glitch does not
        let recovered = jumps
            .iter()
            .map(|&j| self.lt_diff[j])
            .fold(0.0, f64::max);
        recovered >= GLITCH_RECOVERY_FRACTION * self.lt_diff[c].abs()
    }
}

fn time_steps(times: &[Epoch]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(times.windows(2).map(|w| (w[1] - w[0]).to_seconds()))
        .collect()
}

fn value_steps(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    }
}

/// Keep the candidates farther than `separation` samples from the next one.
/// The last candidate is measured against the end of the data.
fn collapse_adjacent(candidates: Vec<usize>, len: usize, separation: usize) -> Vec<usize> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut adjacent = false;
    for (k, &candidate) in candidates.iter().enumerate() {
        let next = candidates.get(k + 1).copied().unwrap_or(len);
        if next - candidate > separation {
            kept.push(candidate);
        } else {
            adjacent = true;
        }
    }
    if adjacent {
        log::info!("There are orbit breaks right next to each other");
    }
    kept
}

/// Keep the first break, and every later break whose distance to the
/// previous candidate is consistent with a full orbit.
fn consistency_filter(
    merged: &[usize],
    times: &[Epoch],
    values: &[f64],
    cycle: f64,
    period: f64,
    ratio: f64,
) -> Vec<usize> {
    let mut breaks = Vec::with_capacity(merged.len() + 1);
    breaks.push(0);
    for (k, &b) in merged.iter().enumerate() {
        let keep = match k.checked_sub(1).map(|p| merged[p]) {
            None => true,
            Some(p) => {
                let elapsed = (times[b] - times[p]).to_seconds() / period;
                let change = (values[b] - values[p]) / cycle;
                elapsed - change > ratio
            }
        };
        if keep && b != 0 {
            breaks.push(b);
        }
    }
    breaks
}

#[cfg(test)]
mod breaks_test {
    use hifitime::Unit;

    use super::*;

    fn seconds(n: usize) -> Vec<Epoch> {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        (0..n).map(|s| t0 + Unit::Second * s as i64).collect()
    }

    fn local_time(n: usize, orbit: usize) -> Vec<f64> {
        (0..n)
            .map(|s| (s % orbit) as f64 / orbit as f64 * 24.0)
            .collect()
    }

    #[test]
    fn test_gradient_breaks_on_clean_signal() {
        let times = seconds(10_000);
        let values = local_time(10_000, 2_000);
        let breaks = gradient_breaks(
            &times,
            &values,
            24.0,
            Unit::Second * 2_000,
            &OrbitParams::default(),
        );
        assert_eq!(breaks, vec![0, 2_000, 4_000, 6_000, 8_000]);
    }

    #[test]
    fn test_glitch_is_a_false_positive() {
        let times = seconds(6_000);
        let mut values = local_time(6_000, 3_000);
        // a single sample falling to zero in the middle of an orbit
        values[1_500] = 0.0;
        let breaks = gradient_breaks(
            &times,
            &values,
            24.0,
            Unit::Second * 3_000,
            &OrbitParams::default(),
        );
        assert_eq!(breaks, vec![0, 3_000]);
    }

    fn nine_thousand_seconds_with(glitches: &[(usize, f64)]) -> Vec<usize> {
        let times = seconds(9_000);
        let mut values = local_time(9_000, 3_000);
        for &(at, value) in glitches {
            values[at] = value;
        }
        gradient_breaks(
            &times,
            &values,
            24.0,
            Unit::Second * 3_000,
            &OrbitParams::default(),
        )
    }

    #[test]
    fn test_moderate_glitch_is_a_false_positive() {
        // two hours below the true value, in the middle of an orbit
        assert_eq!(
            nine_thousand_seconds_with(&[(1_500, 10.0)]),
            vec![0, 3_000, 6_000]
        );
        assert_eq!(
            nine_thousand_seconds_with(&[(1_500, 11.5), (4_500, 6.0)]),
            vec![0, 3_000, 6_000]
        );
    }

    #[test]
    fn test_glitch_next_to_a_wrap_keeps_the_break() {
        assert_eq!(
            nine_thousand_seconds_with(&[(3_003, 1.0)]),
            vec![0, 3_000, 6_000]
        );
        assert_eq!(
            nine_thousand_seconds_with(&[(2_997, 20.0), (6_002, 3.0)]),
            vec![0, 3_000, 6_000]
        );
    }

    #[test]
    fn test_one_consistent_jump_keeps_the_candidate() {
        let nan = f64::NAN;
        let mut ut_diff = vec![nan, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let mut lt_diff = vec![nan, 0.01, -2.0, 2.0, 0.01, 0.01, 0.01];
        let check = |ut_diff: &[f64], lt_diff: &[f64]| {
            GlitchCheck {
                ut_diff,
                lt_diff,
                jump: 0.1,
                window: 5,
                cycle: 24.0,
                period: 3_000.0,
            }
            .is_false_positive(2)
        };
        assert!(check(&ut_diff, &lt_diff));

        // a slow rise across a time gap is orbital motion
        ut_diff[5] = 500.0;
        lt_diff[5] = 0.5;
        assert!(!check(&ut_diff, &lt_diff));

        // a fast rise too small to undo the drop
        let lt_diff = vec![nan, 0.01, -20.0, 2.0, 0.01, 0.01, 0.01];
        assert!(!check(&[nan, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0], &lt_diff));
    }

    #[test]
    fn test_polar_breaks() {
        let times = seconds(400);
        let values: Vec<f64> = (0..400)
            .map(|s| (s as f64 / 200.0 * std::f64::consts::PI).sin() + 0.01)
            .collect();
        let breaks = polar_breaks(&times, &values, Unit::Second * 400, &OrbitParams::default());
        assert_eq!(breaks.len(), 2);
        assert_eq!(breaks[0], 0);
        assert!((200..=203).contains(&breaks[1]));
    }

    #[test]
    fn test_orbit_number_breaks() {
        let values = [1.0, 1.0, 2.0, 2.0, 2.0, 3.0];
        assert_eq!(orbit_number_breaks(&values), vec![0, 2, 5]);
        assert!(orbit_number_breaks(&[]).is_empty());
    }

    #[test]
    fn test_synthetic_day_breaks() {
        let data = &*crate::unit_test_global::SYNTHETIC_DAY;
        let params = OrbitParams::default();
        let period = |info: OrbitInfo| info.with_period(Unit::Second * 5820).unwrap();

        let mlt = period(OrbitInfo::new("local time", "mlt").unwrap());
        let breaks = compute_breaks(data, &mlt, &params).unwrap();
        assert_eq!(breaks.len(), 15);
        assert!(breaks.iter().enumerate().all(|(k, b)| *b == 5820 * k));

        let lon = period(OrbitInfo::new("longitude", "longitude").unwrap());
        assert_eq!(compute_breaks(data, &lon, &params).unwrap(), breaks);

        let num = OrbitInfo::new("orbit", "orbit_num").unwrap();
        assert_eq!(compute_breaks(data, &num, &params).unwrap(), breaks);

        let polar = period(OrbitInfo::new("polar", "latitude").unwrap());
        assert_eq!(compute_breaks(data, &polar, &params).unwrap().len(), 30);

        let missing = OrbitInfo::new("lt", "not_there").unwrap();
        assert!(matches!(
            compute_breaks(data, &missing, &params),
            Err(SatFrameError::MissingOrbitIndex(_))
        ));
    }

    #[test]
    fn test_gap_hiding_a_wrap() {
        let data = &*crate::unit_test_global::SYNTHETIC_DAY;
        let t0 = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        let mut gapped = data.before(t0 + Unit::Second * 20_000);
        gapped.concat(data.since(t0 + Unit::Second * 30_000), false);

        let info = OrbitInfo::new("lt", "mlt")
            .unwrap()
            .with_period(Unit::Second * 5820)
            .unwrap();
        let breaks = compute_breaks(&gapped, &info, &OrbitParams::default()).unwrap();
        assert_eq!(breaks.len(), 14);
        assert!(breaks.contains(&20_000));
        assert!(breaks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_data_has_no_breaks() {
        let info = OrbitInfo::new("lt", "mlt").unwrap();
        let empty = Dataset::default();
        assert!(compute_breaks(&empty, &info, &OrbitParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_adjacent_candidates_collapse() {
        assert_eq!(collapse_adjacent(vec![3, 4, 10], 20, 1), vec![4, 10]);
        assert_eq!(collapse_adjacent(vec![3, 19], 20, 1), vec![3]);
    }
}
