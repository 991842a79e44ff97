mod common;

use std::{cell::Cell, rc::Rc, sync::atomic::Ordering};

use hifitime::Unit;
use satframe::custom::CustomFunction;
use satframe::instrument::LoadRequest;
use satframe::satframe_errors::SatFrameError;

use common::{assert_same_data, builder, day, synthetic};

#[test]
fn test_trimmed_padded_load_matches_plain_load() {
    let mut plain = builder(synthetic()).build().unwrap();
    let mut padded = builder(synthetic())
        .pad(Unit::Minute * 5)
        .build()
        .unwrap();

    for d in [1, 2, 5] {
        plain.load(&LoadRequest::by_date(day(d))).unwrap();
        padded.load(&LoadRequest::by_date(day(d))).unwrap();
        assert_same_data(padded.data(), plain.data());
        assert_eq!(padded.date(), plain.date());
    }
}

#[test]
fn test_verify_pad_keeps_the_pad() {
    let mut inst = builder(synthetic())
        .pad(Unit::Minute * 5)
        .build()
        .unwrap();
    inst.load(&LoadRequest::by_date(day(2)).verify_pad(true))
        .unwrap();

    assert_eq!(inst.data().len(), 86_400 + 2 * 300);
    assert_eq!(inst.data().first_time(), Some(day(2) - Unit::Minute * 5));
    // the end of the pad is excluded, like the end of the window
    assert_eq!(
        inst.data().last_time(),
        Some(day(3) + Unit::Minute * 5 - Unit::Second * 1)
    );
    assert!(inst.data().index().is_monotonic_increasing());
    assert!(inst.data().index().is_unique());
}

#[test]
fn test_cache_shifts_load_one_file() {
    let plugin = synthetic();
    let calls = plugin.load_counter();
    let mut inst = builder(plugin).pad(Unit::Minute * 5).build().unwrap();

    inst.load(&LoadRequest::by_date(day(2))).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 3);

    inst.load(&LoadRequest::by_date(day(3))).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 4);

    inst.load(&LoadRequest::by_date(day(2))).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 5);

    inst.load(&LoadRequest::by_date(day(7))).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 8);
}

#[test]
fn test_hooks_see_the_padded_data() {
    let mut inst = builder(synthetic())
        .pad(Unit::Minute * 5)
        .build()
        .unwrap();
    let rows = Rc::new(Cell::new(0));
    let seen = Rc::clone(&rows);
    inst.custom_attach(
        CustomFunction::pass(move |data| {
            seen.set(data.len());
            Ok(())
        }),
        None,
    );

    inst.load(&LoadRequest::by_date(day(4))).unwrap();
    assert_eq!(rows.get(), 86_400 + 2 * 300);
    assert_eq!(inst.data().len(), 86_400);
}

#[test]
fn test_pad_next_to_an_empty_day() {
    let mut inst = builder(synthetic().with_empty_day(day(1)))
        .pad(Unit::Minute * 5)
        .build()
        .unwrap();
    inst.load(&LoadRequest::by_date(day(2)).verify_pad(true))
        .unwrap();

    assert_eq!(inst.data().first_time(), Some(day(2)));
    assert_eq!(inst.data().len(), 86_400 + 300);
}

#[test]
fn test_pad_must_be_shorter_than_the_window() {
    let mut inst = builder(synthetic()).pad(Unit::Day * 1).build().unwrap();
    let err = inst.load(&LoadRequest::by_date(day(2))).unwrap_err();
    assert!(matches!(err, SatFrameError::PadTooLong { .. }));
    assert!(err.to_string().starts_with("Data padding window"));

    inst.load(&LoadRequest::by_date(day(2)).end_date(day(4)))
        .unwrap();
    assert_eq!(inst.data().len(), 2 * 86_400);
}

#[test]
fn test_padded_file_load_keeps_file_samples() {
    let mut inst = builder(synthetic())
        .pad(Unit::Minute * 5)
        .build()
        .unwrap();
    inst.load(&LoadRequest::by_file("2009-01-03.nofile")).unwrap();

    assert_eq!(inst.data().len(), 86_400);
    assert_eq!(inst.data().first_time(), Some(day(3)));
    assert_eq!(inst.data().last_time(), Some(day(4) - Unit::Second * 1));
    assert_eq!(inst.date(), Some(day(3)));
}

#[test]
fn test_multi_file_day() {
    let offset = Unit::Hour * 12;

    let mut single = builder(synthetic().with_file_offset(offset))
        .build()
        .unwrap();
    single.load(&LoadRequest::by_date(day(2))).unwrap();
    assert_eq!(single.data().first_time(), Some(day(2) + offset));

    let mut multi = builder(synthetic().with_file_offset(offset))
        .multi_file_day(true)
        .build()
        .unwrap();
    multi.load(&LoadRequest::by_date(day(2))).unwrap();
    assert_eq!(multi.data().len(), 86_400);
    assert_eq!(multi.data().first_time(), Some(day(2)));
    assert_eq!(multi.data().last_time(), Some(day(3) - Unit::Second * 1));
}
