pub mod constants;
pub mod custom;
pub mod dataset;
pub mod env_state;
pub mod files;
pub mod instrument;
pub mod instruments;
pub mod metadata;
pub mod orbits;
pub mod plugin;
pub mod satframe_errors;
pub mod time;

#[cfg(test)]
pub(crate) mod unit_test_global {
    use std::sync::LazyLock;

    use camino::Utf8PathBuf;

    use crate::{
        dataset::Dataset, instruments::synthetic::SyntheticInstrument, plugin::InstrumentPlugin,
    };

    /// One day (2009-01-01) of the synthetic instrument, 86400 samples.
    pub(crate) static SYNTHETIC_DAY: LazyLock<Dataset> = LazyLock::new(|| {
        let inst = SyntheticInstrument::new();
        let (data, _) = inst
            .load(&[Utf8PathBuf::from("2009-01-01.nofile")], "", "")
            .unwrap();
        data
    });
}
