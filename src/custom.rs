//! # Custom function queue
//!
//! User code attached to an [`Instrument`](crate::instrument::Instrument) runs on
//! every non-empty load, after the plugin `preprocess` and `clean` hooks and
//! before the pad is trimmed off. Functions run in attachment order.
//!
//! Three shapes are supported, each with its own closure signature:
//!
//! * [`CustomFunction::Modify`] – edits the data and metadata in place.
//! * [`CustomFunction::Add`] – computes new columns from the data; the queue
//!   inserts them (and their metadata) into the dataset.
//! * [`CustomFunction::Pass`] – read-only inspection.
//!
//! Modify and pass functions cannot hand back a value: their closure types
//! return `Result<(), _>` only.
use std::fmt;

use crate::{
    dataset::Dataset,
    metadata::{Meta, VarMeta},
    satframe_errors::SatFrameError,
};

pub type ModifyFn = Box<dyn FnMut(&mut Dataset, &mut Meta) -> Result<(), SatFrameError>>;
pub type AddFn = Box<dyn FnMut(&Dataset) -> Result<Vec<NewColumn>, SatFrameError>>;
pub type PassFn = Box<dyn FnMut(&Dataset) -> Result<(), SatFrameError>>;

/// A column produced by an [`CustomFunction::Add`] function.
#[derive(Debug, Clone, PartialEq)]
pub struct NewColumn {
    pub name: String,
    pub values: Vec<f64>,
    pub meta: Option<VarMeta>,
}

impl NewColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        NewColumn {
            name: name.into(),
            values,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: VarMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

pub enum CustomFunction {
    Modify(ModifyFn),
    Add(AddFn),
    Pass(PassFn),
}

impl CustomFunction {
    pub fn modify<F>(f: F) -> Self
    where
        F: FnMut(&mut Dataset, &mut Meta) -> Result<(), SatFrameError> + 'static,
    {
        CustomFunction::Modify(Box::new(f))
    }

    pub fn add<F>(f: F) -> Self
    where
        F: FnMut(&Dataset) -> Result<Vec<NewColumn>, SatFrameError> + 'static,
    {
        CustomFunction::Add(Box::new(f))
    }

    pub fn pass<F>(f: F) -> Self
    where
        F: FnMut(&Dataset) -> Result<(), SatFrameError> + 'static,
    {
        CustomFunction::Pass(Box::new(f))
    }

    fn kind_name(&self) -> &'static str {
        match self {
            CustomFunction::Modify(_) => "modify",
            CustomFunction::Add(_) => "add",
            CustomFunction::Pass(_) => "pass",
        }
    }

    fn apply(&mut self, data: &mut Dataset, meta: &mut Meta) -> Result<(), SatFrameError> {
        match self {
            CustomFunction::Modify(f) => f(data, meta),
            CustomFunction::Pass(f) => f(&*data),
            CustomFunction::Add(f) => {
                let columns = f(&*data)?;
                if columns.is_empty() {
                    return Err(SatFrameError::CustomFunction(
                        "add function returned no column".into(),
                    ));
                }
                for column in columns {
                    if column.values.len() != data.len() {
                        return Err(SatFrameError::CustomFunction(format!(
                            "add function returned {} values for `{}`, dataset has {} rows",
                            column.values.len(),
                            column.name,
                            data.len()
                        )));
                    }
                    let record = column
                        .meta
                        .unwrap_or_else(|| VarMeta::default_for(&column.name));
                    meta.insert(column.name.clone(), record);
                    data.insert_column(column.name, column.values)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for CustomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomFunction::{}", self.kind_name())
    }
}

/// Ordered list of custom functions.
#[derive(Debug, Default)]
pub struct CustomQueue {
    functions: Vec<CustomFunction>,
}

impl CustomQueue {
    pub fn new() -> Self {
        CustomQueue::default()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Attach a function, at the end of the queue or at `position`.
    ///
    /// A position past the end appends.
    pub fn attach(&mut self, function: CustomFunction, position: Option<usize>) {
        match position {
            Some(at) if at < self.functions.len() => self.functions.insert(at, function),
            _ => self.functions.push(function),
        }
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Run every function, in order, on `data` and `meta`.
    ///
    /// The first failing function stops the queue and its error is returned.
    pub fn apply_all(&mut self, data: &mut Dataset, meta: &mut Meta) -> Result<(), SatFrameError> {
        for function in self.functions.iter_mut() {
            log::debug!("applying custom {:?}", function);
            function.apply(data, meta)?;
        }
        Ok(())
    }
}
