mod common;

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use satframe::env_state::SatFrameEnv;
use satframe::files::filename_parser::from_os;
use satframe::instrument::{Instrument, LoadRequest};
use satframe::instruments::csv_table::{CsvTableInstrument, VARIABLES_FILE};
use satframe::plugin::CleanLevel;

use common::day;

const TEMPLATE: &str = "ivm_{year:04d}{doy:03d}_v{version:02d}.csv";

fn write(dir: &Utf8Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Two days of ion drift files, the first day in two versions, plus an
/// empty third day.
fn populate(dir: &Utf8Path) {
    fs::create_dir_all(dir).unwrap();
    write(
        dir,
        "ivm_2009001_v01.csv",
        "time,density\n2009-01-01T00:00:00 UTC,-1\n",
    );
    write(
        dir,
        "ivm_2009001_v02.csv",
        "time,density\n\
         2009-01-01T00:00:00 UTC,10.0\n\
         2009-01-01T08:00:00 UTC,-3.0\n\
         2009-01-01T16:00:00 UTC,12.5\n",
    );
    write(
        dir,
        "ivm_2009002_v01.csv",
        "time,density\n\
         2009-01-02T00:00:00 UTC,11.0\n\
         2009-01-02T08:00:00 UTC,\n\
         2009-01-02T16:00:00 UTC,13.0\n",
    );
    write(dir, "ivm_2009003_v01.csv", "");
    write(dir, "notes.txt", "not data");
    write(
        dir,
        VARIABLES_FILE,
        "name,units,long_name,min_val,max_val\ndensity,cm^-3,Ion density,0,\n",
    );
}

fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let dir = Utf8Path::from_path(tmp.path()).unwrap().to_path_buf();
    (tmp, dir)
}

#[test]
fn test_from_os_keeps_the_latest_version() {
    let (_tmp, dir) = utf8_tempdir();
    populate(&dir);

    let entries = from_os(&dir, TEMPLATE).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ivm_2009001_v02.csv",
            "ivm_2009002_v01.csv",
            "ivm_2009003_v01.csv"
        ]
    );
    assert_eq!(entries[1].date, day(2));

    assert!(from_os(&dir.join("missing"), TEMPLATE).unwrap().is_empty());
}

#[test]
fn test_csv_instrument_through_the_environment() {
    let (_tmp, root) = utf8_tempdir();
    let env = SatFrameEnv::builder()
        .data_dir(root.clone())
        .ignore_empty_files(true)
        .build()
        .unwrap();
    let data_path = env.instrument_data_path("cnofs", "ivm", "", "");
    assert_eq!(data_path, root.join("cnofs").join("ivm"));
    populate(&data_path);

    let mut inst = Instrument::builder(CsvTableInstrument::new("cnofs", "ivm", TEMPLATE))
        .env(env)
        .build()
        .unwrap();
    assert_eq!(inst.data_path(), data_path.as_path());
    assert_eq!(inst.files().len(), 2);

    inst.load(&LoadRequest::by_date(day(1))).unwrap();
    assert_eq!(inst.data().len(), 3);
    assert_eq!(
        inst.load_messages(),
        ["Returning cnofs ivm data for 01 January 2009"]
    );
    let density = inst.get("density").unwrap();
    assert_eq!(density[0], 10.0);
    assert!(density[1].is_nan());
    assert_eq!(inst.meta().get("density").unwrap().long_name, "Ion density");

    inst.load(&LoadRequest::by_date(day(1)).end_date(day(3)))
        .unwrap();
    assert_eq!(inst.data().len(), 6);
    assert!(inst.data().index().is_monotonic_increasing());
}

#[test]
fn test_dirty_level_keeps_out_of_range_values() {
    let (_tmp, dir) = utf8_tempdir();
    populate(&dir);

    let mut inst = Instrument::builder(CsvTableInstrument::new("cnofs", "ivm", TEMPLATE))
        .data_path(dir)
        .clean_level(CleanLevel::Dirty)
        .build()
        .unwrap();
    assert_eq!(inst.files().len(), 3);

    inst.load(&LoadRequest::by_file("ivm_2009001_v02.csv")).unwrap();
    assert_eq!(inst.get("density").unwrap()[1], -3.0);
    assert_eq!(inst.date(), Some(day(1)));
}
