//! Table rendering of a [`Dataset`].
//!
//! [`DatasetDisplay`] renders the first and last rows of a dataset with
//! [`comfy-table`](https://docs.rs/comfy-table/latest/comfy_table/). The time
//! column is printed in ISO format (UTC), variables use a fixed precision.
//!
//! ```rust,no_run
//! # use satframe::dataset::{Dataset, TableKind};
//! # let data = Dataset::empty(TableKind::Tabular);
//! println!("{data}");                                // default: 5 head + 5 tail rows
//! println!("{}", data.display().max_rows(20).precision(2));
//! ```
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use super::Dataset;

pub struct DatasetDisplay<'a> {
    data: &'a Dataset,
    max_rows: usize,
    precision: usize,
}

impl<'a> DatasetDisplay<'a> {
    pub(crate) fn new(data: &'a Dataset) -> Self {
        DatasetDisplay {
            data,
            max_rows: 10,
            precision: 4,
        }
    }

    /// Maximum number of rows printed; longer datasets are elided in the middle.
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(2);
        self
    }

    /// Number of fractional digits printed for variables.
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn visible_rows(&self) -> (Vec<usize>, bool) {
        let n = self.data.len();
        if n <= self.max_rows {
            return ((0..n).collect(), false);
        }
        let head = self.max_rows / 2;
        let tail = self.max_rows - head;
        let rows = (0..head).chain(n - tail..n).collect();
        (rows, true)
    }

    fn build_table(&self) -> Table {
        let variables = self.data.variables();
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new("#"), Cell::new("Time (UTC)")];
        header.extend(variables.iter().map(Cell::new));
        table.set_header(header);

        let (rows, elided) = self.visible_rows();
        let head = self.max_rows / 2;
        for (k, &i) in rows.iter().enumerate() {
            if elided && k == head {
                let mut gap = vec![Cell::new("…"), Cell::new("…")];
                gap.extend(variables.iter().map(|_| Cell::new("…")));
                table.add_row(Row::from(gap));
            }
            let mut cells = vec![
                Cell::new(i).set_alignment(CellAlignment::Right),
                Cell::new(
                    self.data
                        .index()
                        .get(i)
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ),
            ];
            for name in &variables {
                let value = self.data.column(name).map(|v| v[i]).unwrap_or(f64::NAN);
                cells.push(
                    Cell::new(format!("{value:.prec$}", prec = self.precision))
                        .set_alignment(CellAlignment::Right),
                );
            }
            table.add_row(Row::from(cells));
        }
        table
    }
}

impl fmt::Display for DatasetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build_table())?;
        write!(
            f,
            "\n[{} rows x {} variables, {}]",
            self.data.len(),
            self.data.variables().len(),
            self.data.kind()
        )
    }
}

impl Dataset {
    /// Configurable table view of the dataset.
    pub fn display(&self) -> DatasetDisplay<'_> {
        DatasetDisplay::new(self)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod display_test {
    use hifitime::{Epoch, Unit};

    use crate::dataset::{Dataset, TableKind, TimeIndex};

    #[test]
    fn test_display_elides_middle_rows() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        let index = TimeIndex::new((0..50).map(|s| t0 + Unit::Second * s).collect());
        let values = (0..50).map(f64::from).collect();
        let data = Dataset::from_columns(TableKind::Tabular, index, [("mlt", values)]).unwrap();

        let rendered = data.display().max_rows(4).precision(1).to_string();
        assert!(rendered.contains("mlt"));
        assert!(rendered.contains("49.0"));
        assert!(!rendered.contains("25.0"));
        assert!(rendered.contains("[50 rows x 1 variables, a tabular dataset]"));
    }
}
