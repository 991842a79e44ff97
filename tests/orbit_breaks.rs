mod common;

use hifitime::{Epoch, Unit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use satframe::dataset::{Dataset, TableKind, TimeIndex};
use satframe::instrument::LoadRequest;
use satframe::orbits::breaks::compute_breaks;
use satframe::orbits::params::OrbitParams;
use satframe::orbits::OrbitInfo;
use satframe::satframe_errors::SatFrameError;

use common::{builder, day, mlt_orbits, orbit_instrument, synthetic};

/// `orbits` orbits of `length` seconds of noisy local time, sampled every
/// second. Each sample is dropped with probability `drop`.
fn noisy_samples(
    rng: &mut StdRng,
    orbits: usize,
    length: usize,
    drop: f64,
) -> (Vec<Epoch>, Vec<f64>) {
    let t0 = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
    let mut times = Vec::new();
    let mut mlt = Vec::new();
    for s in 0..orbits * length {
        if s % length != 0 && rng.random_bool(drop) {
            continue;
        }
        times.push(t0 + Unit::Second * s as i64);
        mlt.push((s % length) as f64 / length as f64 * 24.0 + rng.random_range(-0.01..0.01));
    }
    (times, mlt)
}

fn local_time_data(times: Vec<Epoch>, mlt: Vec<f64>) -> Dataset {
    Dataset::from_columns(TableKind::Tabular, TimeIndex::new(times), [("mlt", mlt)]).unwrap()
}

fn noisy_local_time(rng: &mut StdRng, orbits: usize, length: usize, drop: f64) -> Dataset {
    let (times, mlt) = noisy_samples(rng, orbits, length, drop);
    local_time_data(times, mlt)
}

fn local_time_info(length: usize) -> OrbitInfo {
    OrbitInfo::new("lt", "mlt")
        .unwrap()
        .with_period(Unit::Second * length as i64)
        .unwrap()
}

#[test]
fn test_n_discontinuities_give_n_plus_one_orbits() {
    let mut rng = StdRng::seed_from_u64(42);
    let length = 1_500;
    for orbits in [1, 2, 5, 10] {
        let data = noisy_local_time(&mut rng, orbits, length, 0.0);
        let breaks =
            compute_breaks(&data, &local_time_info(length), &OrbitParams::default()).unwrap();
        let expected: Vec<usize> = (0..orbits).map(|k| k * length).collect();
        assert_eq!(breaks, expected);
    }
}

#[test]
fn test_breaks_survive_dropped_samples() {
    let mut rng = StdRng::seed_from_u64(7);
    let length = 1_500;
    let data = noisy_local_time(&mut rng, 6, length, 0.1);
    let breaks = compute_breaks(&data, &local_time_info(length), &OrbitParams::default()).unwrap();

    assert_eq!(breaks.len(), 6);
    assert_eq!(breaks[0], 0);
    let mlt = data.get("mlt").unwrap();
    for b in &breaks {
        assert!(mlt[*b] < 0.1, "break at {b} has mlt {}", mlt[*b]);
    }
    assert!(breaks.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_index_glitches_keep_the_true_breaks() {
    let mut rng = StdRng::seed_from_u64(11);
    let length = 1_500;
    let (times, mut mlt) = noisy_samples(&mut rng, 4, length, 0.0);
    // a two hour dip mid orbit, then spikes a few samples after and before wraps
    mlt[750] -= 2.0;
    mlt[1_502] = 1.0;
    mlt[2_997] = 20.0;

    let data = local_time_data(times, mlt);
    let breaks = compute_breaks(&data, &local_time_info(length), &OrbitParams::default()).unwrap();
    assert_eq!(breaks, vec![0, 1_500, 3_000, 4_500]);
}

#[test]
fn test_tighter_threshold_keeps_breaks() {
    let mut rng = StdRng::seed_from_u64(3);
    let length = 1_500;
    let data = noisy_local_time(&mut rng, 4, length, 0.0);
    let params = OrbitParams::builder()
        .decrease_threshold(-12.0)
        .build()
        .unwrap();
    let breaks = compute_breaks(&data, &local_time_info(length), &params).unwrap();
    assert_eq!(breaks, vec![0, 1_500, 3_000, 4_500]);
}

#[test]
fn test_orbits_of_a_loaded_day() {
    let mut inst = orbit_instrument();
    inst.load(&LoadRequest::by_date(day(1))).unwrap();
    let mut orbits = inst.orbits().unwrap();

    assert_eq!(orbits.num().unwrap(), 15);
    let breaks: Vec<usize> = orbits.compute_breaks().unwrap().to_vec();
    assert_eq!(breaks, (0..15).map(|k| k * 5_820).collect::<Vec<_>>());

    orbits.get(3).unwrap();
    assert_eq!(orbits.current(), 3);
    assert_eq!(orbits.instrument().data().len(), 5_820);
    assert_eq!(
        orbits.instrument().data().first_time(),
        Some(day(1) + Unit::Second * 11_640)
    );

    orbits.get(-1).unwrap();
    let last = orbits.instrument().data().clone();
    orbits.get(15).unwrap();
    assert_eq!(orbits.instrument().data(), &last);
    assert_eq!(last.len(), 86_400 - 14 * 5_820);

    // the count does not change once an orbit is selected
    assert_eq!(orbits.num().unwrap(), 15);
}

#[test]
fn test_every_index_kind_on_a_loaded_day() {
    let cases = [
        (OrbitInfo::new("longitude", "longitude").unwrap(), 15),
        (OrbitInfo::new("orbit", "orbit_num").unwrap(), 15),
        (OrbitInfo::new("polar", "latitude").unwrap(), 30),
    ];
    for (info, expected) in cases {
        let mut inst = builder(synthetic()).orbit_info(info).build().unwrap();
        inst.load(&LoadRequest::by_date(day(1))).unwrap();
        assert_eq!(inst.orbits().unwrap().num().unwrap(), expected);
    }
}

#[test]
fn test_time_gap_breaks() {
    let plugin = synthetic().with_gap(
        day(1) + Unit::Second * 20_000,
        day(1) + Unit::Second * 30_000,
    );
    let mut inst = builder(plugin).orbit_info(mlt_orbits()).build().unwrap();
    inst.load(&LoadRequest::by_date(day(1))).unwrap();

    let mut orbits = inst.orbits().unwrap();
    let breaks = orbits.compute_breaks().unwrap().to_vec();
    assert_eq!(breaks.len(), 14);
    assert!(breaks.contains(&20_000));
    assert!(breaks.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_breaks_follow_new_loads() {
    let mut inst = orbit_instrument();
    inst.load(&LoadRequest::by_date(day(1))).unwrap();
    assert_eq!(inst.orbits().unwrap().num().unwrap(), 15);

    inst.load(&LoadRequest::by_date(day(2))).unwrap();
    let mut orbits = inst.orbits().unwrap();
    assert_eq!(orbits.num().unwrap(), 16);
    assert_eq!(orbits.compute_breaks().unwrap()[1], 900);
}

#[test]
fn test_orbit_errors() {
    let mut plain = builder(synthetic()).build().unwrap();
    assert!(matches!(
        plain.orbits(),
        Err(SatFrameError::OrbitsNotConfigured)
    ));

    let info = OrbitInfo::new("lt", "not_loaded").unwrap();
    let mut inst = builder(synthetic()).orbit_info(info).build().unwrap();
    inst.load(&LoadRequest::by_date(day(1))).unwrap();
    assert!(matches!(
        inst.orbits().unwrap().num(),
        Err(SatFrameError::MissingOrbitIndex(_))
    ));

    let mut inst = orbit_instrument();
    inst.load(&LoadRequest::by_date(day(1))).unwrap();
    let mut orbits = inst.orbits().unwrap();
    assert!(matches!(
        orbits.get(0),
        Err(SatFrameError::InvalidOrbitNumber(_))
    ));
    assert!(matches!(
        orbits.get(16),
        Err(SatFrameError::InvalidOrbitNumber(_))
    ));
    assert!(matches!(
        orbits.get(-16),
        Err(SatFrameError::InvalidOrbitNumber(_))
    ));
    assert_eq!(orbits.current(), 0);
}
