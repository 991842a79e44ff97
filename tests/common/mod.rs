#![allow(dead_code)]

use approx::assert_relative_eq;
use hifitime::{Epoch, Unit};
use satframe::dataset::Dataset;
use satframe::instrument::{Instrument, InstrumentBuilder};
use satframe::instruments::synthetic::SyntheticInstrument;
use satframe::orbits::OrbitInfo;

/// Midnight of the given day of January 2009.
pub fn day(d: u8) -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2009, 1, d)
}

/// Synthetic files from 2008-12-30 to 2009-01-10.
pub fn synthetic() -> SyntheticInstrument {
    SyntheticInstrument::new().with_days(Epoch::from_gregorian_utc_at_midnight(2008, 12, 30), day(10))
}

pub fn builder(plugin: SyntheticInstrument) -> InstrumentBuilder {
    Instrument::builder(plugin).data_path("synthetic")
}

pub fn mlt_orbits() -> OrbitInfo {
    OrbitInfo::new("local time", "mlt")
        .unwrap()
        .with_period(Unit::Second * 5820)
        .unwrap()
}

/// Synthetic instrument with local time orbits on `mlt` (5820 s period).
pub fn orbit_instrument() -> Instrument {
    builder(synthetic()).orbit_info(mlt_orbits()).build().unwrap()
}

/// Assert two datasets hold the same times and the same values.
pub fn assert_same_data(actual: &Dataset, expected: &Dataset) {
    assert_eq!(actual.len(), expected.len());
    assert_eq!(actual.first_time(), expected.first_time());
    assert_eq!(actual.last_time(), expected.last_time());
    assert_eq!(actual.variables(), expected.variables());
    for name in expected.variables() {
        let (a, e) = (actual.get(name).unwrap(), expected.get(name).unwrap());
        for (x, y) in a.iter().zip(e) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }
}
