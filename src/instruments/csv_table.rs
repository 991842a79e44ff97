//! Generic instrument reading time series stored as CSV files.
//!
//! Every file has a header row. The first column holds the sample time as an
//! ISO 8601 string (`2009-01-01T00:00:00 UTC`), every other column is read as
//! `f64`; empty fields become `NaN`. Files are found with a
//! [`FilenameTemplate`](crate::files::filename_parser::FilenameTemplate).
//!
//! An optional `variables.csv` next to the data files describes the columns:
//!
//! ```text
//! name,units,long_name,min_val,max_val
//! density,cm^-3,Ion density,0,
//! ```
//!
//! Its limits drive [`InstrumentPlugin::clean`]: values outside
//! `[min_val, max_val]` are masked with `NaN` unless the level is
//! [`CleanLevel::Dirty`].
use camino::{Utf8Path, Utf8PathBuf};
use csv::StringRecord;
use hifitime::Epoch;
use serde::Deserialize;

use crate::{
    dataset::{Dataset, TableKind, TimeIndex},
    files::{filename_parser, FileEntry},
    metadata::{Meta, VarMeta},
    plugin::{CleanLevel, InstrumentPlugin},
    satframe_errors::SatFrameError,
    time::parse_date,
};

/// Name of the column description file.
pub const VARIABLES_FILE: &str = "variables.csv";

#[derive(Debug, Deserialize)]
struct VariableRow {
    name: String,
    #[serde(default)]
    units: String,
    #[serde(default)]
    long_name: String,
    min_val: Option<f64>,
    max_val: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CsvTableInstrument {
    platform: String,
    name: String,
    template: String,
    table_kind: TableKind,
}

impl CsvTableInstrument {
    /// Arguments
    /// -----------------
    /// * `platform`, `name`: identification of the instrument.
    /// * `template`: naming scheme of the files, e.g. `ivm_{year:4}{doy:3}.csv`.
    pub fn new(
        platform: impl Into<String>,
        name: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        CsvTableInstrument {
            platform: platform.into(),
            name: name.into(),
            template: template.into(),
            table_kind: TableKind::Tabular,
        }
    }

    pub fn with_table_kind(mut self, kind: TableKind) -> Self {
        self.table_kind = kind;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Read one file, appending its rows to `times` and `columns`.
    fn read_file(
        path: &Utf8Path,
        names: &mut Vec<String>,
        times: &mut Vec<Epoch>,
        columns: &mut Vec<Vec<f64>>,
    ) -> Result<(), SatFrameError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let file_names: Vec<String> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(str::to_string)
            .collect();
        if names.is_empty() && columns.is_empty() {
            *names = file_names;
            columns.resize(names.len(), Vec::new());
        } else if *names != file_names {
            return Err(SatFrameError::InvalidParameter(format!(
                "{path} has columns {}, expected {}",
                file_names.join(", "),
                names.join(", ")
            )));
        }

        for result in reader.records() {
            let record = result?;
            let time = record.get(0).unwrap_or_default();
            let epoch =
                parse_date(time).map_err(|_| SatFrameError::BadDatetime(format!("{path}: {time}")))?;
            let values: StringRecord = record.iter().skip(1).collect();
            let values: Vec<Option<f64>> = values.deserialize(None)?;
            if values.len() != columns.len() {
                return Err(SatFrameError::ColumnLengthMismatch {
                    name: format!("{path} row {}", times.len() + 1),
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            times.push(epoch);
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value.unwrap_or(f64::NAN));
            }
        }
        Ok(())
    }

    fn read_variables(dir: &Utf8Path) -> Result<Meta, SatFrameError> {
        let mut meta = Meta::new();
        let path = dir.join(VARIABLES_FILE);
        if !path.is_file() {
            return Ok(meta);
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)?;
        for row in reader.deserialize::<VariableRow>() {
            let row = row?;
            let long_name = if row.long_name.is_empty() {
                row.name.clone()
            } else {
                row.long_name
            };
            let record = VarMeta::new(row.units, long_name).with_limits(
                row.min_val.unwrap_or(f64::NAN),
                row.max_val.unwrap_or(f64::NAN),
            );
            meta.insert(row.name, record);
        }
        Ok(meta)
    }
}

impl InstrumentPlugin for CsvTableInstrument {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn table_kind(&self) -> TableKind {
        self.table_kind
    }

    fn list_files(
        &self,
        _tag: &str,
        _inst_id: &str,
        data_path: &Utf8Path,
    ) -> Result<Vec<FileEntry>, SatFrameError> {
        filename_parser::from_os(data_path, &self.template)
    }

    fn load(
        &self,
        files: &[Utf8PathBuf],
        _tag: &str,
        _inst_id: &str,
    ) -> Result<(Dataset, Meta), SatFrameError> {
        let mut names = Vec::new();
        let mut times = Vec::new();
        let mut columns = Vec::new();
        for path in files {
            Self::read_file(path, &mut names, &mut times, &mut columns)?;
        }

        let mut meta = match files.first().and_then(|p| p.parent()) {
            Some(dir) => Self::read_variables(dir)?,
            None => Meta::new(),
        };
        meta.set_header("platform", self.platform.as_str());
        meta.set_header("name", self.name.as_str());

        let data = Dataset::from_columns(
            self.table_kind,
            TimeIndex::new(times),
            names.into_iter().zip(columns),
        )?;
        Ok((data, meta))
    }

    fn download(
        &self,
        dates: &[Epoch],
        _tag: &str,
        _inst_id: &str,
        data_path: &Utf8Path,
    ) -> Result<(), SatFrameError> {
        log::warn!(
            "No download routine for {} {}, {} days must be copied to {data_path} by hand",
            self.platform,
            self.name,
            dates.len()
        );
        Ok(())
    }

    fn clean(
        &self,
        data: &mut Dataset,
        meta: &mut Meta,
        level: CleanLevel,
    ) -> Result<(), SatFrameError> {
        if level == CleanLevel::Dirty {
            return Ok(());
        }
        let names: Vec<String> = data.variables().into_iter().map(str::to_string).collect();
        for name in names {
            let Some(record) = meta.get(&name) else {
                continue;
            };
            let (min_val, max_val) = (record.min_val, record.max_val);
            if min_val.is_nan() && max_val.is_nan() {
                continue;
            }
            let Some(mut values) = data.remove_column(&name) else {
                continue;
            };
            let mut masked = 0;
            for value in values.iter_mut() {
                if *value < min_val || *value > max_val {
                    *value = f64::NAN;
                    masked += 1;
                }
            }
            if masked > 0 {
                log::debug!("{masked} values of `{name}` outside [{min_val}, {max_val}] masked");
            }
            data.insert_column(name, values)?;
        }
        Ok(())
    }
}
