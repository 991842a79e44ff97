//! # satframe environment state
//!
//! This module defines [`SatFrameEnv`], the **configuration object** handed to
//! every [`Instrument`](crate::instrument::Instrument) at build time. There is
//! no global settings store: two instruments built from two different
//! environments never see each other's configuration.
//!
//! ## Overview
//!
//! `SatFrameEnv` carries:
//!
//! 1. the root data directory under which instrument files are searched,
//! 2. the directory template turning `(platform, name, tag, inst_id)` into a
//!    sub-directory of the data root,
//! 3. the default [`CleanLevel`] of new instruments,
//! 4. the default strictness of the time index checks,
//! 5. whether zero-length files are dropped from file catalogs.
//!
//! ## Structure
//!
//! ```text
//! SatFrameEnv
//! ├── data_dir           (camino::Utf8PathBuf)
//! ├── directory_format   ("{platform}/{name}/{tag}/{inst_id}")
//! ├── clean_level        (CleanLevel)
//! ├── strict_time_flag   (bool)
//! └── ignore_empty_files (bool)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use satframe::env_state::SatFrameEnv;
//! use satframe::plugin::CleanLevel;
//!
//! let env = SatFrameEnv::builder()
//!     .data_dir("/data/satellites")
//!     .clean_level(CleanLevel::Dusty)
//!     .build()
//!     .unwrap();
//! assert_eq!(
//!     env.instrument_data_path("cnofs", "ivm", "", ""),
//!     camino::Utf8PathBuf::from("/data/satellites/cnofs/ivm")
//! );
//! ```
//!
//! ## See also
//!
//! - [`directories::BaseDirs`] – Source of the default cache directory.
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::{plugin::CleanLevel, satframe_errors::SatFrameError};

/// Default layout of the instrument directories below the data root.
pub const DEFAULT_DIRECTORY_FORMAT: &str = "{platform}/{name}/{tag}/{inst_id}";

#[derive(Debug, Clone, PartialEq)]
pub struct SatFrameEnv {
    pub data_dir: Utf8PathBuf,
    pub directory_format: String,
    pub clean_level: CleanLevel,
    pub strict_time_flag: bool,
    pub ignore_empty_files: bool,
}

impl Default for SatFrameEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SatFrameEnv {
    /// Environment with the default settings.
    ///
    /// Return
    /// ------
    /// * A new environment
    ///     - data files are searched below `<user cache dir>/satframe`
    ///       (or `./satframe_data` when no home directory is available)
    ///     - the time index checks are strict
    pub fn new() -> Self {
        SatFrameEnv {
            data_dir: Self::default_data_dir(),
            directory_format: DEFAULT_DIRECTORY_FORMAT.to_string(),
            clean_level: CleanLevel::Clean,
            strict_time_flag: true,
            ignore_empty_files: false,
        }
    }

    pub fn builder() -> SatFrameEnvBuilder {
        SatFrameEnvBuilder::new()
    }

    fn default_data_dir() -> Utf8PathBuf {
        BaseDirs::new()
            .and_then(|dirs| Utf8Path::from_path(dirs.cache_dir()).map(|p| p.join("satframe")))
            .unwrap_or_else(|| Utf8PathBuf::from("satframe_data"))
    }

    /// Directory holding the files of one instrument.
    ///
    /// Arguments
    /// ---------
    /// * `platform`, `name`, `tag`, `inst_id`: the instrument identifiers substituted
    ///   into the directory template. Empty components are skipped.
    ///
    /// Return
    /// ------
    /// * `data_dir` joined with the expanded template
    pub fn instrument_data_path(
        &self,
        platform: &str,
        name: &str,
        tag: &str,
        inst_id: &str,
    ) -> Utf8PathBuf {
        let expanded = self
            .directory_format
            .replace("{platform}", platform)
            .replace("{name}", name)
            .replace("{tag}", tag)
            .replace("{inst_id}", inst_id);
        expanded
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.data_dir.clone(), |path, part| path.join(part))
    }
}

impl fmt::Display for SatFrameEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "satframe environment")?;
        writeln!(f, "--------------------")?;
        writeln!(f, "  data_dir           = {}", self.data_dir)?;
        writeln!(f, "  directory_format   = {}", self.directory_format)?;
        writeln!(f, "  clean_level        = {}", self.clean_level)?;
        writeln!(f, "  strict_time_flag   = {}", self.strict_time_flag)?;
        write!(f, "  ignore_empty_files = {}", self.ignore_empty_files)
    }
}

/// Builder for [`SatFrameEnv`], with validation.
#[derive(Debug, Clone)]
pub struct SatFrameEnvBuilder {
    env: SatFrameEnv,
}

impl Default for SatFrameEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SatFrameEnvBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            env: SatFrameEnv::new(),
        }
    }

    pub fn data_dir(mut self, v: impl Into<Utf8PathBuf>) -> Self {
        self.env.data_dir = v.into();
        self
    }

    pub fn directory_format(mut self, v: impl Into<String>) -> Self {
        self.env.directory_format = v.into();
        self
    }

    pub fn clean_level(mut self, v: CleanLevel) -> Self {
        self.env.clean_level = v;
        self
    }

    pub fn strict_time_flag(mut self, v: bool) -> Self {
        self.env.strict_time_flag = v;
        self
    }

    pub fn ignore_empty_files(mut self, v: bool) -> Self {
        self.env.ignore_empty_files = v;
        self
    }

    /// Validate and return the environment.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(SatFrameEnv)` if every setting is usable.
    /// * `Err(SatFrameError::InvalidParameter)` if the data directory is empty or
    ///   the directory template contains an unknown placeholder.
    pub fn build(self) -> Result<SatFrameEnv, SatFrameError> {
        let env = &self.env;

        if env.data_dir.as_str().is_empty() {
            return Err(SatFrameError::InvalidParameter(
                "data_dir must not be empty".into(),
            ));
        }

        let mut rest = env.directory_format.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                return Err(SatFrameError::InvalidParameter(format!(
                    "unclosed placeholder in directory_format `{}`",
                    env.directory_format
                )));
            };
            let key = &rest[open + 1..open + close];
            if !matches!(key, "platform" | "name" | "tag" | "inst_id") {
                return Err(SatFrameError::InvalidParameter(format!(
                    "unknown placeholder `{{{key}}}` in directory_format"
                )));
            }
            rest = &rest[open + close + 1..];
        }

        Ok(self.env)
    }
}
