//! Ready-made instrument plugins.
//!
//! * [`synthetic::SyntheticInstrument`] – deterministic virtual data, one file per day.
//! * [`csv_table::CsvTableInstrument`] – time series stored as CSV files.
pub mod csv_table;
pub mod synthetic;
