use thiserror::Error;

#[derive(Error, Debug)]
pub enum SatFrameError {
    #[error("Conflicting load arguments: {0}")]
    ConflictingLoadArguments(String),

    #[error("Incomplete load arguments: {0}")]
    IncompleteLoadArguments(String),

    #[error("Day of year (doy) is only valid between and including 1-366, got {0}")]
    InvalidDayOfYear(u16),

    #[error("Stop before start: `{stop}` occurs before `{start}`")]
    StopBeforeStart { start: String, stop: String },

    #[error(
        "Data padding window ({pad}) must be shorter than data loading window ({step}). Load a greater range of data or shorten the padding."
    )]
    PadTooLong { pad: String, step: String },

    #[error("Unsupported load mode: {0}")]
    UnsupportedLoadMode(String),

    #[error("Data returned by instrument load routine must be {expected}, got {found}")]
    DataKindMismatch { expected: String, found: String },

    #[error("{0} To continue to use data, set strict_time_flag to false before loading data")]
    TimeIndexIntegrity(String),

    #[error("Unknown kind of orbit requested: {0}")]
    UnknownOrbitKind(String),

    #[error("Orbit index variable not available: {0}")]
    MissingOrbitIndex(String),

    #[error("Invalid orbit number: {0}")]
    InvalidOrbitNumber(String),

    #[error("Orbit information was not provided to the instrument")]
    OrbitsNotConfigured,

    #[error("{0}")]
    EndOfData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid iteration bounds: {0}")]
    InvalidBounds(String),

    #[error("File not found in the file catalog: {0}")]
    FileNotInCatalog(String),

    #[error("Bad datetime in {0}")]
    BadDatetime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid filename template: {0}")]
    InvalidFilenameTemplate(String),

    #[error("Column `{name}` has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Custom function error: {0}")]
    CustomFunction(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl SatFrameError {
    /// True for the exhaustion signal raised when stepping past the first or
    /// last available window or orbit.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, SatFrameError::EndOfData(_))
    }
}

impl PartialEq for SatFrameError {
    fn eq(&self, other: &Self) -> bool {
        use SatFrameError::*;
        match (self, other) {
            (ConflictingLoadArguments(a), ConflictingLoadArguments(b)) => a == b,
            (IncompleteLoadArguments(a), IncompleteLoadArguments(b)) => a == b,
            (InvalidDayOfYear(a), InvalidDayOfYear(b)) => a == b,
            (
                StopBeforeStart {
                    start: s1,
                    stop: e1,
                },
                StopBeforeStart {
                    start: s2,
                    stop: e2,
                },
            ) => s1 == s2 && e1 == e2,
            (PadTooLong { pad: p1, step: s1 }, PadTooLong { pad: p2, step: s2 }) => {
                p1 == p2 && s1 == s2
            }
            (UnsupportedLoadMode(a), UnsupportedLoadMode(b)) => a == b,
            (
                DataKindMismatch {
                    expected: e1,
                    found: f1,
                },
                DataKindMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (TimeIndexIntegrity(a), TimeIndexIntegrity(b)) => a == b,
            (UnknownOrbitKind(a), UnknownOrbitKind(b)) => a == b,
            (MissingOrbitIndex(a), MissingOrbitIndex(b)) => a == b,
            (InvalidOrbitNumber(a), InvalidOrbitNumber(b)) => a == b,
            (EndOfData(a), EndOfData(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (InvalidBounds(a), InvalidBounds(b)) => a == b,
            (FileNotInCatalog(a), FileNotInCatalog(b)) => a == b,
            (BadDatetime(a), BadDatetime(b)) => a == b,
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (InvalidFilenameTemplate(a), InvalidFilenameTemplate(b)) => a == b,
            (
                ColumnLengthMismatch {
                    name: n1,
                    expected: e1,
                    found: f1,
                },
                ColumnLengthMismatch {
                    name: n2,
                    expected: e2,
                    found: f2,
                },
            ) => n1 == n2 && e1 == e2 && f1 == f2,
            (UnknownVariable(a), UnknownVariable(b)) => a == b,
            (CustomFunction(a), CustomFunction(b)) => a == b,

            // Wrapped foreign errors: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (RegexError(_), RegexError(_)) => true,

            (OrbitsNotConfigured, OrbitsNotConfigured) => true,

            _ => false,
        }
    }
}
