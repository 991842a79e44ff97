//! # Metadata attached to a dataset
//!
//! [`Meta`] stores one [`VarMeta`] record per variable (units, labels, limits,
//! fill value) plus free-form header attributes describing the whole
//! instrument. Plugins return a `Meta` next to every [`Dataset`](crate::dataset::Dataset)
//! they load; the loading engine completes it with default records for any
//! variable the plugin forgot to describe.
//!
//! ## Merging
//! -----------------
//! [`Meta::merge`] copies records by variable name. Records already present are
//! kept unless `overwrite` is set, which lets a custom function describe the
//! columns it adds without clobbering the plugin labels.
use std::collections::BTreeMap;

/// Notes attached to records created because a variable had no metadata.
pub const DEFAULT_META_NOTES: &str =
    "Metadata set to defaults, as they were missing in the Instrument";

/// Labels of a single variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarMeta {
    pub units: String,
    pub long_name: String,
    pub notes: String,
    pub desc: String,
    pub fill_val: f64,
    pub min_val: f64,
    pub max_val: f64,
}

impl VarMeta {
    /// Record with the given units and long name, other labels left to defaults.
    pub fn new(units: impl Into<String>, long_name: impl Into<String>) -> Self {
        VarMeta {
            units: units.into(),
            long_name: long_name.into(),
            ..VarMeta::default()
        }
    }

    /// Record with the given value limits.
    pub fn with_limits(mut self, min_val: f64, max_val: f64) -> Self {
        self.min_val = min_val;
        self.max_val = max_val;
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Default record of a variable named `name`.
    pub fn default_for(name: &str) -> Self {
        VarMeta {
            long_name: name.to_string(),
            notes: DEFAULT_META_NOTES.to_string(),
            ..VarMeta::default()
        }
    }
}

impl Default for VarMeta {
    fn default() -> Self {
        VarMeta {
            units: String::new(),
            long_name: String::new(),
            notes: String::new(),
            desc: String::new(),
            fill_val: f64::NAN,
            min_val: f64::NAN,
            max_val: f64::NAN,
        }
    }
}

/// Variable records and header attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    vars: BTreeMap<String, VarMeta>,
    header: BTreeMap<String, String>,
}

impl Meta {
    pub fn new() -> Self {
        Meta::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.header.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&VarMeta> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut VarMeta> {
        self.vars.get_mut(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, record: VarMeta) {
        self.vars.insert(name.into(), record);
    }

    pub fn remove(&mut self, name: &str) -> Option<VarMeta> {
        self.vars.remove(name)
    }

    /// Names of the described variables, in sorted order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.header.get(key).map(String::as_str)
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.header.insert(key.into(), value.into());
    }

    /// Copy the records of `other` into `self`.
    ///
    /// Arguments
    /// -----------------
    /// * `other`: the records to copy.
    /// * `overwrite`: replace the records (and header attributes) already present.
    pub fn merge(&mut self, other: &Meta, overwrite: bool) {
        for (name, record) in &other.vars {
            if overwrite || !self.vars.contains_key(name) {
                self.vars.insert(name.clone(), record.clone());
            }
        }
        for (key, value) in &other.header {
            if overwrite || !self.header.contains_key(key) {
                self.header.insert(key.clone(), value.clone());
            }
        }
    }

    /// Give a default record to every name in `names` that has none.
    ///
    /// Return
    /// ----------
    /// * The names that received a default record.
    pub fn fill_missing<'a, I>(&mut self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filled = Vec::new();
        for name in names {
            if !self.vars.contains_key(name) {
                self.vars
                    .insert(name.to_string(), VarMeta::default_for(name));
                filled.push(name.to_string());
            }
        }
        filled
    }
}
