use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hifitime::{Epoch, Unit};

use satframe::instrument::{Bounds, Instrument, LoadRequest};
use satframe::instruments::synthetic::SyntheticInstrument;
use satframe::orbits::OrbitInfo;

fn day(d: u8) -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2009, 1, d)
}

fn instrument(pad: bool) -> Instrument {
    let plugin = SyntheticInstrument::new().with_days(day(1), day(31));
    let builder = Instrument::builder(plugin).data_path("synthetic");
    let builder = if pad {
        builder.pad(Unit::Minute * 5)
    } else {
        builder
    };
    builder.build().unwrap()
}

/// Day by day loads: every step reuses two cached days.
fn bench_sequential_days(c: &mut Criterion) {
    c.bench_function("padded_load/sequential_days", |b| {
        let mut inst = instrument(true);
        let mut d = 2u8;
        b.iter(|| {
            inst.load(&LoadRequest::by_date(day(d))).unwrap();
            black_box(inst.data().len());
            d = if d == 29 { 2 } else { d + 1 };
        })
    });
}

/// Jumps between distant days: every load refills the cache.
fn bench_cache_reset(c: &mut Criterion) {
    c.bench_function("padded_load/cache_reset", |b| {
        let mut inst = instrument(true);
        let mut toggle = false;
        b.iter(|| {
            toggle = !toggle;
            let target = if toggle { day(5) } else { day(20) };
            inst.load(&LoadRequest::by_date(target)).unwrap();
            black_box(inst.data().len());
        })
    });
}

fn bench_plain_day(c: &mut Criterion) {
    c.bench_function("padded_load/no_pad", |b| {
        let mut inst = instrument(false);
        b.iter(|| {
            inst.load(&LoadRequest::by_date(black_box(day(10)))).unwrap();
            black_box(inst.data().len());
        })
    });
}

fn bench_orbit_iteration(c: &mut Criterion) {
    c.bench_function("padded_load/orbits_over_two_days", |b| {
        b.iter(|| {
            let plugin = SyntheticInstrument::new().with_days(day(1), day(2));
            let info = OrbitInfo::new("local time", "mlt").unwrap();
            let mut inst = Instrument::builder(plugin)
                .data_path("synthetic")
                .orbit_info(info)
                .build()
                .unwrap();
            inst.set_bounds(Some(Bounds::dates(day(1), day(2)))).unwrap();
            let count = inst.orbits().unwrap().iter().count();
            black_box(count);
        })
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_sequential_days, bench_cache_reset, bench_plain_day, bench_orbit_iteration
);
criterion_main!(benches);
