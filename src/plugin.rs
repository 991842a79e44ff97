//! # Instrument plugin interface
//!
//! Every data source is described by a type implementing [`InstrumentPlugin`].
//! The [`Instrument`](crate::instrument::Instrument) resolves its plugin once,
//! at build time, and drives it through four capabilities:
//!
//! * `list_files` – enumerate the local files and the date each one starts at,
//! * `load` – read a list of files into a [`Dataset`] and its [`Meta`],
//! * `download` – fetch the files of a list of dates into the data directory,
//! * `clean` – mask or drop samples according to a [`CleanLevel`].
//!
//! `preprocess` is an optional hook run before `clean`.
//!
//! ## Contract of `load`
//! -----------------
//! * An empty file list must produce an empty dataset of the plugin's
//!   [`TableKind`].
//! * The returned dataset must have the plugin's [`TableKind`], otherwise the
//!   instrument refuses it.
//! * A file whose timestamps cannot be decoded is reported with
//!   [`SatFrameError::BadDatetime`]; the instrument turns it into an empty load.
use std::{fmt, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;

use crate::{
    dataset::{Dataset, TableKind},
    files::FileEntry,
    metadata::Meta,
    satframe_errors::SatFrameError,
};

/// Strictness of the cleaning applied after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanLevel {
    /// Only samples passing every quality check are kept
    #[default]
    Clean,
    /// Marginal samples are kept
    Dusty,
    /// Only egregiously bad samples are removed
    Dirty,
    /// No cleaning at all, the `clean` hook is not called
    None,
}

impl fmt::Display for CleanLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CleanLevel::Clean => "clean",
            CleanLevel::Dusty => "dusty",
            CleanLevel::Dirty => "dirty",
            CleanLevel::None => "none",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CleanLevel {
    type Err = SatFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clean" => Ok(CleanLevel::Clean),
            "dusty" => Ok(CleanLevel::Dusty),
            "dirty" => Ok(CleanLevel::Dirty),
            "none" => Ok(CleanLevel::None),
            other => Err(SatFrameError::InvalidParameter(format!(
                "unknown clean level `{other}`"
            ))),
        }
    }
}

pub trait InstrumentPlugin {
    /// Name of the platform carrying the instrument (e.g. a satellite).
    fn platform(&self) -> &str;

    /// Name of the instrument on its platform.
    fn name(&self) -> &str;

    /// Layout of the datasets returned by [`InstrumentPlugin::load`].
    fn table_kind(&self) -> TableKind {
        TableKind::Tabular
    }

    /// List the local files of a tag/inst_id pair.
    ///
    /// Arguments
    /// -----------------
    /// * `tag`, `inst_id`: data product selectors.
    /// * `data_path`: directory holding the files of this instrument.
    ///
    /// Return
    /// ----------
    /// * One entry per file, with the epoch its data starts at. Order and
    ///   duplicates are normalised by the [`FileCatalog`](crate::files::FileCatalog).
    fn list_files(
        &self,
        tag: &str,
        inst_id: &str,
        data_path: &Utf8Path,
    ) -> Result<Vec<FileEntry>, SatFrameError>;

    /// Read `files` into a dataset and its metadata.
    fn load(
        &self,
        files: &[Utf8PathBuf],
        tag: &str,
        inst_id: &str,
    ) -> Result<(Dataset, Meta), SatFrameError>;

    /// Fetch the files of `dates` into `data_path`.
    fn download(
        &self,
        dates: &[Epoch],
        tag: &str,
        inst_id: &str,
        data_path: &Utf8Path,
    ) -> Result<(), SatFrameError>;

    /// Remove or mask samples according to `level`. Never called with
    /// [`CleanLevel::None`].
    fn clean(
        &self,
        data: &mut Dataset,
        meta: &mut Meta,
        level: CleanLevel,
    ) -> Result<(), SatFrameError>;

    /// Hook run on every non-empty load, before `clean`.
    fn preprocess(&self, _data: &mut Dataset, _meta: &mut Meta) -> Result<(), SatFrameError> {
        Ok(())
    }
}

#[cfg(test)]
mod plugin_test {
    use super::*;

    #[test]
    fn test_clean_level_parse() {
        assert_eq!("Dusty".parse::<CleanLevel>().unwrap(), CleanLevel::Dusty);
        assert_eq!(" none ".parse::<CleanLevel>().unwrap(), CleanLevel::None);
        assert!("spotless".parse::<CleanLevel>().is_err());
        assert_eq!(CleanLevel::Dirty.to_string(), "dirty");
    }
}
