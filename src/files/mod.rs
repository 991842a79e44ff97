//! # File catalog of an instrument
//!
//! A [`FileCatalog`] is the time-ordered list of the local files of one
//! instrument, as reported by the plugin `list_files` hook. The loading engine
//! uses it to turn a date window or a file window into the list of paths handed
//! to the plugin `load` hook.
//!
//! ## Ordering and duplicates
//! -----------------
//! Entries are sorted by their start date. When two files claim the same date,
//! the one listed last wins and a warning is logged, so that a plugin listing
//! files in version order keeps the newest one.
//!
//! ## Slicing conventions
//! -----------------
//! * [`FileCatalog::by_date`] selects files with `start <= date < stop` (**end-exclusive**).
//! * [`FileCatalog::by_position`] selects the files at positions `start..stop`;
//!   the loading engine passes `fid..fid + step + 1`, which makes file windows
//!   **inclusive** of their last file.
//!
//! ## See also
//! ------------
//! * [`filename_parser`] – build a catalog from a directory listing and a filename template.
pub mod filename_parser;

use std::cmp::Ordering;

use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use itertools::Itertools;

use crate::{constants::FastHashMap, satframe_errors::SatFrameError};

/// A file and the epoch its data starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub date: Epoch,
    pub name: String,
}

impl FileEntry {
    pub fn new(date: Epoch, name: impl Into<String>) -> Self {
        FileEntry {
            date,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    data_path: Utf8PathBuf,
    entries: Vec<FileEntry>,
    positions: FastHashMap<String, usize>,
}

impl FileCatalog {
    /// Build a catalog from the entries listed by a plugin.
    ///
    /// Arguments
    /// -----------------
    /// * `data_path`: directory the file names are relative to.
    /// * `entries`: the files, in any order.
    /// * `ignore_empty_files`: drop the files with a size of zero on disk.
    ///
    /// Return
    /// ----------
    /// * The catalog, sorted by date with one file per date.
    pub fn new(
        data_path: impl Into<Utf8PathBuf>,
        entries: Vec<FileEntry>,
        ignore_empty_files: bool,
    ) -> Self {
        let data_path = data_path.into();

        let mut sorted: Vec<FileEntry> = entries
            .into_iter()
            .enumerate()
            .sorted_by(|(ia, a), (ib, b)| {
                a.date
                    .partial_cmp(&b.date)
                    .unwrap_or(Ordering::Equal)
                    .then(ia.cmp(ib))
            })
            .map(|(_, entry)| entry)
            .collect();

        let before = sorted.len();
        sorted = sorted
            .into_iter()
            .coalesce(|previous, current| {
                if previous.date == current.date {
                    Ok(current)
                } else {
                    Err((previous, current))
                }
            })
            .collect();
        if sorted.len() != before {
            log::warn!(
                "Duplicate file dates found in {data_path}, keeping the last listed file of each date ({} files dropped)",
                before - sorted.len()
            );
        }

        if ignore_empty_files {
            sorted.retain(|entry| {
                std::fs::metadata(data_path.join(&entry.name))
                    .map(|m| m.len() > 0)
                    .unwrap_or(false)
            });
        }

        let positions = sorted
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();

        FileCatalog {
            data_path,
            entries: sorted,
            positions,
        }
    }

    pub fn data_path(&self) -> &Utf8Path {
        &self.data_path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn dates(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.entries.iter().map(|entry| entry.date)
    }

    /// Date of the first file.
    pub fn start_date(&self) -> Option<Epoch> {
        self.entries.first().map(|entry| entry.date)
    }

    /// Date of the last file.
    pub fn stop_date(&self) -> Option<Epoch> {
        self.entries.last().map(|entry| entry.date)
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(|entry| entry.name.as_str())
    }

    /// Position of a file in the catalog.
    pub fn get_index(&self, name: &str) -> Result<usize, SatFrameError> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| SatFrameError::FileNotInCatalog(name.to_string()))
    }

    /// Names of the files with `start <= date < stop`.
    pub fn by_date(&self, start: Epoch, stop: Epoch) -> Vec<String> {
        let lo = self.entries.partition_point(|entry| entry.date < start);
        let hi = self.entries.partition_point(|entry| entry.date < stop);
        self.entries[lo..hi.max(lo)]
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Names of the files at positions `start..stop`.
    ///
    /// A negative `start` selects nothing; `stop` is clamped to the catalog length.
    pub fn by_position(&self, start: isize, stop: isize) -> Vec<String> {
        if start < 0 || stop <= start {
            return Vec::new();
        }
        let lo = (start as usize).min(self.entries.len());
        let hi = (stop as usize).min(self.entries.len());
        self.entries[lo..hi]
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Full paths of `names`, relative to the data path.
    pub fn full_paths(&self, names: &[String]) -> Vec<Utf8PathBuf> {
        names.iter().map(|name| self.data_path.join(name)).collect()
    }
}
