//! # Dataset: named variables over a time index
//!
//! A [`Dataset`] is the in-memory table every instrument plugin returns and every
//! cache slot of the loading engine holds. Rows are indexed by a [`TimeIndex`],
//! columns are named `f64` variables.
//!
//! ## Table kinds
//! -----------------
//! Instruments declare up front whether they produce row-oriented tables
//! ([`TableKind::Tabular`]) or labeled multi-dimensional arrays flattened along
//! time ([`TableKind::Gridded`]). The loading engine refuses a dataset whose
//! kind differs from the instrument declaration, before it reaches the cache.
//!
//! ## Slicing conventions
//! -----------------
//! * [`Dataset::slice_time`] is **inclusive** on both ends, like label slicing.
//! * [`Dataset::before`] / [`Dataset::after`] are **strict**.
//! * [`Dataset::slice_rows`] uses half-open row ranges.
//!
//! Every slicing operation returns an owned copy, so that handing a slice to
//! another cache slot or to an iteration snapshot never aliases the source.
//!
//! ## See also
//! ------------
//! * [`display`] – comfy-table rendering of a dataset.
//! * [`Instrument`](crate::instrument::Instrument) – owner of the loaded dataset.
pub mod display;
pub mod time_index;

use std::{collections::BTreeMap, fmt, ops::Range};

use hifitime::Epoch;

use crate::satframe_errors::SatFrameError;

pub use time_index::TimeIndex;

/// Container layout produced by an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// Row-oriented table, one record per timestamp
    #[default]
    Tabular,
    /// Labeled array data flattened along the time dimension
    Gridded,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Tabular => write!(f, "a tabular dataset"),
            TableKind::Gridded => write!(f, "a gridded dataset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    kind: TableKind,
    index: TimeIndex,
    columns: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    /// Empty dataset of the given kind.
    pub fn empty(kind: TableKind) -> Self {
        Dataset {
            kind,
            index: TimeIndex::default(),
            columns: BTreeMap::new(),
        }
    }

    /// Build a dataset from a time index and a set of named columns.
    ///
    /// Arguments
    /// -----------------
    /// * `kind`: the container layout.
    /// * `index`: one epoch per row.
    /// * `columns`: `(name, values)` pairs; every column must have one value per row.
    ///
    /// Return
    /// ----------
    /// * The dataset, or [`SatFrameError::ColumnLengthMismatch`] if a column length differs
    ///   from the index length.
    pub fn from_columns<I, S>(
        kind: TableKind,
        index: TimeIndex,
        columns: I,
    ) -> Result<Self, SatFrameError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut dataset = Dataset {
            kind,
            index,
            columns: BTreeMap::new(),
        };
        for (name, values) in columns {
            dataset.insert_column(name, values)?;
        }
        Ok(dataset)
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    pub fn first_time(&self) -> Option<Epoch> {
        self.index.first()
    }

    pub fn last_time(&self) -> Option<Epoch> {
        self.index.last()
    }

    /// Names of the variables, in sorted order.
    pub fn variables(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Values of a variable, or [`SatFrameError::UnknownVariable`].
    pub fn get(&self, name: &str) -> Result<&[f64], SatFrameError> {
        self.column(name)
            .ok_or_else(|| SatFrameError::UnknownVariable(name.to_string()))
    }

    /// Insert or replace a column. Its length must match the number of rows.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SatFrameError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(SatFrameError::ColumnLengthMismatch {
                name,
                expected: self.index.len(),
                found: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<f64>> {
        self.columns.remove(name)
    }

    /// Copy of the rows in the half-open position range.
    pub fn slice_rows(&self, range: Range<usize>) -> Dataset {
        let range = range.start.min(self.len())..range.end.min(self.len());
        let range = range.start..range.end.max(range.start);
        Dataset {
            kind: self.kind,
            index: self.index.slice(range.clone()),
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v[range.clone()].to_vec()))
                .collect(),
        }
    }

    /// Copy of the rows with `start <= t <= stop`.
    pub fn slice_time(&self, start: Epoch, stop: Epoch) -> Dataset {
        self.slice_rows(self.index.range_inclusive(start, stop))
    }

    /// Copy of the rows strictly before `stop`.
    pub fn before(&self, stop: Epoch) -> Dataset {
        self.slice_rows(self.index.range_before(stop))
    }

    /// Copy of the rows strictly after `start`.
    pub fn after(&self, start: Epoch) -> Dataset {
        self.slice_rows(self.index.range_after(start))
    }

    /// Copy of the rows at or after `start`.
    pub fn since(&self, start: Epoch) -> Dataset {
        self.slice_rows(self.index.range_from(start))
    }

    /// Remove the first row, if any.
    pub fn drop_first(&mut self) {
        if !self.is_empty() {
            *self = self.slice_rows(1..self.len());
        }
    }

    /// Remove the last row, if any.
    pub fn drop_last(&mut self) {
        if !self.is_empty() {
            *self = self.slice_rows(0..self.len() - 1);
        }
    }

    /// Concatenate `other` before (`prepend = true`) or after this dataset.
    ///
    /// Columns present on one side only are filled with `NaN` on the other side.
    /// The kind of `self` is kept.
    pub fn concat(&mut self, other: Dataset, prepend: bool) {
        if other.is_empty() && other.columns.keys().all(|k| self.columns.contains_key(k)) {
            return;
        }
        let (mut head, tail) = if prepend {
            (other, std::mem::take(self))
        } else {
            (std::mem::take(self), other)
        };
        let kind = if prepend { tail.kind } else { head.kind };

        let head_len = head.len();
        let tail_len = tail.len();
        let mut names: Vec<String> = head.columns.keys().cloned().collect();
        names.extend(
            tail.columns
                .keys()
                .filter(|k| !head.columns.contains_key(*k))
                .cloned(),
        );

        let mut columns = BTreeMap::new();
        for name in names {
            let mut values = head
                .columns
                .remove(&name)
                .unwrap_or_else(|| vec![f64::NAN; head_len]);
            match tail.columns.get(&name) {
                Some(v) => values.extend_from_slice(v),
                None => values.extend(std::iter::repeat(f64::NAN).take(tail_len)),
            }
            columns.insert(name, values);
        }

        let mut index = head.index;
        index.extend_from(&tail.index);
        *self = Dataset {
            kind,
            index,
            columns,
        };
    }

    /// Stable re-sort of the rows by time.
    pub fn sort_by_time(&mut self) {
        if self.index.is_monotonic_increasing() {
            return;
        }
        let order = self.index.argsort();
        self.index = self.index.select(&order);
        for values in self.columns.values_mut() {
            *values = order.iter().map(|&i| values[i]).collect();
        }
    }
}
