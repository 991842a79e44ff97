//! # Instrument: loading engine of a data source
//!
//! An [`Instrument`] binds an [`InstrumentPlugin`] to a file catalog and to the
//! loaded data. It owns:
//!
//! - the current [`Dataset`] and its [`Meta`],
//! - the [`FileCatalog`] of the local files,
//! - the three-slot cache of the previous/current/next windows used for padding,
//! - the [`CustomQueue`] applied on every load,
//! - the iteration [`Bounds`] walked by [`Instrument::next`] / [`Instrument::prev`],
//! - the orbit configuration used by [`Instrument::orbits`].
//!
//! ## Overview
//!
//! ```text
//! LoadRequest ──resolve──► LoadWindow ──► plugin.load (x1 or x3 with cache)
//!                                             │
//!                     pad assembly ◄──────────┘
//!                          │
//!            time index integrity check (strict or warning)
//!                          │
//!        preprocess ─► clean ─► custom functions ─► trim pad
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hifitime::Unit;
//! use satframe::instrument::{Instrument, LoadRequest};
//! use satframe::instruments::synthetic::SyntheticInstrument;
//!
//! let mut inst = Instrument::builder(SyntheticInstrument::new())
//!     .pad(Unit::Minute * 5)
//!     .build()
//!     .unwrap();
//! inst.load(&LoadRequest::by_doy(2009, 1)).unwrap();
//! println!("{}", inst.data());
//! ```
//!
//! ## See also
//! ------------
//! * [`load_request`] – addressing modes and their resolution.
//! * [`bounds`] – iteration bounds and window stepping.
//! * [`crate::orbits`] – orbit selection on top of the loaded data.
pub mod bounds;
mod cache;
pub mod iteration;
pub mod load_request;
mod loader;

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::{Duration, Epoch};

use crate::{
    custom::{CustomFunction, CustomQueue},
    dataset::Dataset,
    env_state::SatFrameEnv,
    files::FileCatalog,
    metadata::Meta,
    orbits::{params::OrbitParams, OrbitInfo, OrbitState, Orbits},
    plugin::{CleanLevel, InstrumentPlugin},
    satframe_errors::SatFrameError,
    time::{self, epoch_range, floor_day},
};

pub use bounds::Bounds;
pub use iteration::WindowResult;
pub use load_request::{LoadRequest, LoadWindow};

use cache::LoadCache;

pub struct Instrument {
    plugin: Box<dyn InstrumentPlugin>,
    tag: String,
    inst_id: String,
    data_path: Utf8PathBuf,
    env: SatFrameEnv,

    pad: Option<Duration>,
    multi_file_day: bool,
    clean_level: CleanLevel,
    strict_time_flag: bool,

    files: FileCatalog,
    bounds: Option<Bounds>,
    custom: CustomQueue,

    pub(crate) data: Dataset,
    meta: Meta,

    window: Option<LoadWindow>,
    date: Option<Epoch>,
    fid: Option<isize>,
    yr: Option<i32>,
    doy: Option<u16>,

    cache: LoadCache,
    load_messages: Vec<String>,

    orbit_info: Option<OrbitInfo>,
    orbit_params: OrbitParams,
    pub(crate) orbit_state: OrbitState,
}

impl Instrument {
    pub fn builder<P: InstrumentPlugin + 'static>(plugin: P) -> InstrumentBuilder {
        InstrumentBuilder::new(plugin)
    }

    pub fn platform(&self) -> &str {
        self.plugin.platform()
    }

    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn inst_id(&self) -> &str {
        &self.inst_id
    }

    pub fn data_path(&self) -> &Utf8Path {
        &self.data_path
    }

    pub fn env(&self) -> &SatFrameEnv {
        &self.env
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Mutable access to the loaded data. Any orbit selection is discarded.
    pub fn data_mut(&mut self) -> &mut Dataset {
        self.orbit_state.reset();
        &mut self.data
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn index(&self) -> &[Epoch] {
        self.data.index().as_slice()
    }

    pub fn variables(&self) -> Vec<&str> {
        self.data.variables()
    }

    /// Values of a loaded variable.
    pub fn get(&self, name: &str) -> Result<&[f64], SatFrameError> {
        self.data.get(name)
    }

    pub fn files(&self) -> &FileCatalog {
        &self.files
    }

    pub fn pad(&self) -> Option<Duration> {
        self.pad
    }

    pub fn multi_file_day(&self) -> bool {
        self.multi_file_day
    }

    pub fn clean_level(&self) -> CleanLevel {
        self.clean_level
    }

    pub fn set_clean_level(&mut self, level: CleanLevel) {
        self.clean_level = level;
    }

    pub fn strict_time_flag(&self) -> bool {
        self.strict_time_flag
    }

    pub fn set_strict_time_flag(&mut self, strict: bool) {
        self.strict_time_flag = strict;
    }

    /// Window of the last load.
    pub fn window(&self) -> Option<LoadWindow> {
        self.window
    }

    /// Date of the loaded data: the requested day in date mode, the day of the
    /// first sample in file mode.
    pub fn date(&self) -> Option<Epoch> {
        self.date
    }

    /// Position of the first loaded file, in file mode.
    pub fn fid(&self) -> Option<isize> {
        self.fid
    }

    pub fn yr(&self) -> Option<i32> {
        self.yr
    }

    pub fn doy(&self) -> Option<u16> {
        self.doy
    }

    /// Messages emitted by the plugin calls of the last load.
    pub fn load_messages(&self) -> &[String] {
        &self.load_messages
    }

    pub fn orbit_info(&self) -> Option<&OrbitInfo> {
        self.orbit_info.as_ref()
    }

    pub fn orbit_params(&self) -> &OrbitParams {
        &self.orbit_params
    }

    /// Orbit navigation over the loaded data.
    ///
    /// Return
    /// ----------
    /// * A handle borrowing the instrument, or [`SatFrameError::OrbitsNotConfigured`]
    ///   when the instrument was built without [`OrbitInfo`].
    pub fn orbits(&mut self) -> Result<Orbits<'_>, SatFrameError> {
        let info = self
            .orbit_info
            .clone()
            .ok_or(SatFrameError::OrbitsNotConfigured)?;
        let params = self.orbit_params.clone();
        Ok(Orbits::new(self, info, params))
    }

    /// Concatenate `other` before (`prepend = true`) or after the loaded data.
    ///
    /// The orbit breaks are recomputed on the next orbit access.
    pub fn concat_data(&mut self, other: Dataset, prepend: bool) {
        self.data.concat(other, prepend);
        self.orbit_state.reset();
    }

    /// Attach a custom function, applied on every non-empty load.
    pub fn custom_attach(&mut self, function: CustomFunction, position: Option<usize>) {
        self.custom.attach(function, position);
    }

    pub fn custom_clear(&mut self) {
        self.custom.clear();
    }

    /// Download the days `start..=stop` and refresh the file catalog.
    pub fn download(&mut self, start: Epoch, stop: Epoch) -> Result<(), SatFrameError> {
        let dates = epoch_range(floor_day(start), floor_day(stop), hifitime::Unit::Day * 1);
        if dates.is_empty() {
            return Err(SatFrameError::StopBeforeStart {
                start: time::format_day(start),
                stop: time::format_day(stop),
            });
        }
        log::info!(
            "Downloading data to: {} ({} days)",
            self.data_path,
            dates.len()
        );
        self.plugin
            .download(&dates, &self.tag, &self.inst_id, &self.data_path)?;
        self.refresh_files()
    }

    /// Re-list the local files. The load cache is emptied.
    pub fn refresh_files(&mut self) -> Result<(), SatFrameError> {
        let entries = self
            .plugin
            .list_files(&self.tag, &self.inst_id, &self.data_path)?;
        self.files = FileCatalog::new(self.data_path.clone(), entries, self.env.ignore_empty_files);
        self.cache.clear();
        log::debug!("{} files listed in {}", self.files.len(), self.data_path);
        Ok(())
    }

    /// Midnight of the current day (UTC).
    pub fn today(&self) -> Result<Epoch, SatFrameError> {
        time::today()
    }

    /// Midnight of the next day (UTC).
    pub fn tomorrow(&self) -> Result<Epoch, SatFrameError> {
        time::tomorrow()
    }

    /// Midnight of the previous day (UTC).
    pub fn yesterday(&self) -> Result<Epoch, SatFrameError> {
        time::yesterday()
    }

    /// Start and end of the loaded window, in date mode.
    pub(crate) fn date_window_bounds(&self) -> Option<(Epoch, Epoch)> {
        match self.window {
            Some(LoadWindow::Date { start, step }) => Some((start, start + step)),
            _ => None,
        }
    }
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrument")
            .field("platform", &self.platform())
            .field("name", &self.name())
            .field("tag", &self.tag)
            .field("inst_id", &self.inst_id)
            .field("data_path", &self.data_path)
            .field("window", &self.window)
            .field("rows", &self.data.len())
            .finish()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Instrument: {} {} {} {}",
            self.platform(),
            self.name(),
            self.tag,
            self.inst_id
        )?;
        writeln!(f, "--------------------------------")?;
        writeln!(f, "  clean level      = {}", self.clean_level)?;
        writeln!(f, "  pad              = {:?}", self.pad)?;
        writeln!(f, "  multi file day   = {}", self.multi_file_day)?;
        writeln!(f, "  files            = {}", self.files.len())?;
        match self.window {
            Some(window) => writeln!(f, "  loaded window    = {window}")?,
            None => writeln!(f, "  loaded window    = none")?,
        }
        write!(
            f,
            "  loaded data      = {} rows x {} variables",
            self.data.len(),
            self.data.variables().len()
        )
    }
}

/// Builder for [`Instrument`], with validation.
pub struct InstrumentBuilder {
    plugin: Box<dyn InstrumentPlugin>,
    tag: String,
    inst_id: String,
    env: SatFrameEnv,
    data_path: Option<Utf8PathBuf>,
    pad: Option<Duration>,
    multi_file_day: bool,
    clean_level: Option<CleanLevel>,
    strict_time_flag: Option<bool>,
    orbit_info: Option<OrbitInfo>,
    orbit_params: OrbitParams,
}

impl InstrumentBuilder {
    pub fn new<P: InstrumentPlugin + 'static>(plugin: P) -> Self {
        InstrumentBuilder {
            plugin: Box::new(plugin),
            tag: String::new(),
            inst_id: String::new(),
            env: SatFrameEnv::new(),
            data_path: None,
            pad: None,
            multi_file_day: false,
            clean_level: None,
            strict_time_flag: None,
            orbit_info: None,
            orbit_params: OrbitParams::default(),
        }
    }

    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tag = v.into();
        self
    }

    pub fn inst_id(mut self, v: impl Into<String>) -> Self {
        self.inst_id = v.into();
        self
    }

    pub fn env(mut self, v: SatFrameEnv) -> Self {
        self.env = v;
        self
    }

    /// Directory of the files, instead of the one derived from the environment.
    pub fn data_path(mut self, v: impl Into<Utf8PathBuf>) -> Self {
        self.data_path = Some(v.into());
        self
    }

    /// Time added before and after every loaded window while the hooks run.
    pub fn pad(mut self, v: Duration) -> Self {
        self.pad = Some(v);
        self
    }

    /// Files may hold data of more than one day.
    pub fn multi_file_day(mut self, v: bool) -> Self {
        self.multi_file_day = v;
        self
    }

    pub fn clean_level(mut self, v: CleanLevel) -> Self {
        self.clean_level = Some(v);
        self
    }

    pub fn strict_time_flag(mut self, v: bool) -> Self {
        self.strict_time_flag = Some(v);
        self
    }

    pub fn orbit_info(mut self, v: OrbitInfo) -> Self {
        self.orbit_info = Some(v);
        self
    }

    pub fn orbit_params(mut self, v: OrbitParams) -> Self {
        self.orbit_params = v;
        self
    }

    /// Validate the settings, list the local files and return the instrument.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(Instrument)` with nothing loaded.
    /// * `Err(SatFrameError::InvalidParameter)` for a non-positive pad.
    /// * Any error of the plugin `list_files` hook.
    pub fn build(self) -> Result<Instrument, SatFrameError> {
        if let Some(pad) = self.pad {
            if pad <= Duration::ZERO {
                return Err(SatFrameError::InvalidParameter(format!(
                    "pad must be positive, got {pad}"
                )));
            }
        }

        let data_path = self.data_path.unwrap_or_else(|| {
            self.env.instrument_data_path(
                self.plugin.platform(),
                self.plugin.name(),
                &self.tag,
                &self.inst_id,
            )
        });
        let entries = self
            .plugin
            .list_files(&self.tag, &self.inst_id, &data_path)?;
        let files = FileCatalog::new(data_path.clone(), entries, self.env.ignore_empty_files);
        log::debug!(
            "Built instrument {} {} with {} files in {}",
            self.plugin.platform(),
            self.plugin.name(),
            files.len(),
            data_path
        );

        let kind = self.plugin.table_kind();
        Ok(Instrument {
            clean_level: self.clean_level.unwrap_or(self.env.clean_level),
            strict_time_flag: self.strict_time_flag.unwrap_or(self.env.strict_time_flag),
            plugin: self.plugin,
            tag: self.tag,
            inst_id: self.inst_id,
            data_path,
            env: self.env,
            pad: self.pad,
            multi_file_day: self.multi_file_day,
            files,
            bounds: None,
            custom: CustomQueue::new(),
            data: Dataset::empty(kind),
            meta: Meta::new(),
            window: None,
            date: None,
            fid: None,
            yr: None,
            doy: None,
            cache: LoadCache::default(),
            load_messages: Vec::new(),
            orbit_info: self.orbit_info,
            orbit_params: self.orbit_params,
            orbit_state: OrbitState::default(),
        })
    }
}
