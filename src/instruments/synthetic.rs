//! Deterministic synthetic instrument.
//!
//! One virtual file per day (`YYYY-MM-DD.nofile`), nothing is read from disk.
//! Each file holds one day of samples at a fixed cadence, starting at midnight
//! plus an optional offset. The orbit of the simulated satellite starts at a
//! reference epoch and lasts `orbit_period`, so every variable is a pure
//! function of time:
//!
//! | variable    | value                                        |
//! |-------------|----------------------------------------------|
//! | `uts`       | seconds since the start of the file day      |
//! | `mlt`       | orbit phase × 24, wraps once per orbit       |
//! | `slt`       | `mlt` shifted by 0.2 h, wrapped to `[0, 24)` |
//! | `longitude` | orbit phase × 360                            |
//! | `latitude`  | 70° × sin(2π × orbit phase)                  |
//! | `orbit_num` | number of orbits since the reference epoch   |
//!
//! Data gaps, empty files, files with undecodable times and files with a
//! duplicated timestamp can be injected to exercise the loading engine.
use std::{
    f64::consts::TAU,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::{Duration, Epoch, Unit};

use crate::{
    dataset::{Dataset, TableKind, TimeIndex},
    files::FileEntry,
    metadata::{Meta, VarMeta},
    plugin::{CleanLevel, InstrumentPlugin},
    satframe_errors::SatFrameError,
    time::{epoch_range, floor_day, parse_date},
};

const FILE_SUFFIX: &str = ".nofile";

/// Synthetic instrument, platform `satframe`, name `testing`.
#[derive(Debug, Clone)]
pub struct SyntheticInstrument {
    first_day: Epoch,
    last_day: Epoch,
    cadence: Duration,
    file_offset: Duration,
    reference: Epoch,
    orbit_period: Duration,
    table_kind: TableKind,
    gaps: Vec<(Epoch, Epoch)>,
    empty_days: Vec<Epoch>,
    bad_days: Vec<Epoch>,
    duplicate_days: Vec<Epoch>,
    load_count: Arc<AtomicUsize>,
}

impl Default for SyntheticInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticInstrument {
    /// Files from 2008-01-01 to 2010-12-31, one sample per second, 5820 s orbits
    /// starting on 2009-01-01.
    pub fn new() -> Self {
        SyntheticInstrument {
            first_day: Epoch::from_gregorian_utc_at_midnight(2008, 1, 1),
            last_day: Epoch::from_gregorian_utc_at_midnight(2010, 12, 31),
            cadence: Unit::Second * 1,
            file_offset: Duration::ZERO,
            reference: Epoch::from_gregorian_utc_at_midnight(2009, 1, 1),
            orbit_period: Unit::Second * 5820,
            table_kind: TableKind::Tabular,
            gaps: Vec::new(),
            empty_days: Vec::new(),
            bad_days: Vec::new(),
            duplicate_days: Vec::new(),
            load_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Restrict the virtual files to the days `first..=last`.
    pub fn with_days(mut self, first: Epoch, last: Epoch) -> Self {
        self.first_day = floor_day(first);
        self.last_day = floor_day(last);
        self
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Shift the samples of every file by `offset` from midnight, so that a
    /// file spills over the next day.
    pub fn with_file_offset(mut self, offset: Duration) -> Self {
        self.file_offset = offset;
        self
    }

    pub fn with_orbit_period(mut self, period: Duration) -> Self {
        self.orbit_period = period;
        self
    }

    pub fn with_table_kind(mut self, kind: TableKind) -> Self {
        self.table_kind = kind;
        self
    }

    /// Remove the samples of `[start, stop)`.
    pub fn with_gap(mut self, start: Epoch, stop: Epoch) -> Self {
        self.gaps.push((start, stop));
        self
    }

    /// The file of `day` loads without any sample.
    pub fn with_empty_day(mut self, day: Epoch) -> Self {
        self.empty_days.push(floor_day(day));
        self
    }

    /// The file of `day` fails with [`SatFrameError::BadDatetime`].
    pub fn with_bad_day(mut self, day: Epoch) -> Self {
        self.bad_days.push(floor_day(day));
        self
    }

    /// The first timestamp of the file of `day` appears twice.
    pub fn with_duplicate_day(mut self, day: Epoch) -> Self {
        self.duplicate_days.push(floor_day(day));
        self
    }

    /// Shared counter of the `load` calls, still readable once the
    /// instrument is moved into an [`Instrument`](crate::instrument::Instrument).
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.load_count)
    }

    /// File name of the day containing `day`.
    pub fn file_name(day: Epoch) -> String {
        let (year, month, day, _, _, _, _) = floor_day(day).to_gregorian_utc();
        format!("{year:04}-{month:02}-{day:02}{FILE_SUFFIX}")
    }

    fn file_day(path: &Utf8Path) -> Result<Epoch, SatFrameError> {
        let name = path.file_name().unwrap_or(path.as_str());
        let stem = name.strip_suffix(FILE_SUFFIX).unwrap_or(name);
        parse_date(&format!("{stem}T00:00:00 UTC"))
    }

    fn in_gap(&self, epoch: Epoch) -> bool {
        self.gaps
            .iter()
            .any(|(start, stop)| *start <= epoch && epoch < *stop)
    }

    /// Samples of one file: its epochs, appended to `times`.
    fn day_samples(&self, day: Epoch, times: &mut Vec<Epoch>) {
        if self.empty_days.contains(&day) {
            return;
        }
        let start = day + self.file_offset;
        let count = (Unit::Day * 1).to_seconds() / self.cadence.to_seconds();
        let first = times.len();
        times.extend(
            (0..count as i64)
                .map(|k| start + self.cadence * k)
                .filter(|t| !self.in_gap(*t)),
        );
        if self.duplicate_days.contains(&day) && times.len() > first {
            times.insert(first, times[first]);
        }
    }

    fn meta(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert(
            "uts",
            VarMeta::new("s", "Universal Time").with_limits(0.0, 86_400.0),
        );
        meta.insert(
            "mlt",
            VarMeta::new("hours", "Magnetic Local Time").with_limits(0.0, 24.0),
        );
        meta.insert(
            "slt",
            VarMeta::new("hours", "Solar Local Time").with_limits(0.0, 24.0),
        );
        meta.insert(
            "longitude",
            VarMeta::new("degrees", "Longitude").with_limits(0.0, 360.0),
        );
        meta.insert(
            "latitude",
            VarMeta::new("degrees", "Latitude").with_limits(-90.0, 90.0),
        );
        meta.insert(
            "orbit_num",
            VarMeta::new("", "Orbit Number").with_desc("Orbits since the reference epoch"),
        );
        meta.set_header("platform", "satframe");
        meta.set_header("name", "testing");
        meta
    }
}

impl InstrumentPlugin for SyntheticInstrument {
    fn platform(&self) -> &str {
        "satframe"
    }

    fn name(&self) -> &str {
        "testing"
    }

    fn table_kind(&self) -> TableKind {
        self.table_kind
    }

    fn list_files(
        &self,
        _tag: &str,
        _inst_id: &str,
        _data_path: &Utf8Path,
    ) -> Result<Vec<FileEntry>, SatFrameError> {
        Ok(epoch_range(self.first_day, self.last_day, Unit::Day * 1)
            .into_iter()
            .map(|day| FileEntry::new(day, Self::file_name(day)))
            .collect())
    }

    fn load(
        &self,
        files: &[Utf8PathBuf],
        _tag: &str,
        _inst_id: &str,
    ) -> Result<(Dataset, Meta), SatFrameError> {
        self.load_count.fetch_add(1, Ordering::Relaxed);

        let mut times = Vec::new();
        let mut day_starts = Vec::with_capacity(files.len());
        for path in files {
            let day = Self::file_day(path)?;
            if self.bad_days.contains(&day) {
                return Err(SatFrameError::BadDatetime(path.to_string()));
            }
            let first = times.len();
            self.day_samples(day, &mut times);
            day_starts.extend(std::iter::repeat(day).take(times.len() - first));
        }

        let period = self.orbit_period.to_seconds();
        let phases: Vec<f64> = times
            .iter()
            .map(|t| (*t - self.reference).to_seconds().rem_euclid(period) / period)
            .collect();
        let uts: Vec<f64> = times
            .iter()
            .zip(&day_starts)
            .map(|(t, day)| (*t - *day).to_seconds())
            .collect();
        let mlt: Vec<f64> = phases.iter().map(|p| p * 24.0).collect();
        let slt: Vec<f64> = mlt.iter().map(|m| (m + 0.2).rem_euclid(24.0)).collect();
        let longitude: Vec<f64> = phases.iter().map(|p| p * 360.0).collect();
        let latitude: Vec<f64> = phases.iter().map(|p| 70.0 * (TAU * p).sin()).collect();
        let orbit_num: Vec<f64> = times
            .iter()
            .map(|t| ((*t - self.reference).to_seconds() / period).floor())
            .collect();

        let data = Dataset::from_columns(
            self.table_kind,
            TimeIndex::new(times),
            [
                ("uts", uts),
                ("mlt", mlt),
                ("slt", slt),
                ("longitude", longitude),
                ("latitude", latitude),
                ("orbit_num", orbit_num),
            ],
        )?;
        Ok((data, self.meta()))
    }

    fn download(
        &self,
        dates: &[Epoch],
        _tag: &str,
        _inst_id: &str,
        data_path: &Utf8Path,
    ) -> Result<(), SatFrameError> {
        log::info!(
            "Synthetic files need no download ({} days requested for {data_path})",
            dates.len()
        );
        Ok(())
    }

    fn clean(
        &self,
        _data: &mut Dataset,
        meta: &mut Meta,
        level: CleanLevel,
    ) -> Result<(), SatFrameError> {
        meta.set_header("clean_level", level.to_string());
        Ok(())
    }

    fn preprocess(&self, _data: &mut Dataset, meta: &mut Meta) -> Result<(), SatFrameError> {
        meta.set_header("preprocessed", "true");
        Ok(())
    }
}
