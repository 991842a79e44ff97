//! # Filename templates
//!
//! Instruments whose files carry their date in the file name describe the
//! naming scheme with a template, e.g.
//!
//! ```text
//! cnofs_vefi_bfield_1sec_{year:04d}{month:02d}{day:02d}_v{version:02d}.cdf
//! ```
//!
//! A [`FilenameTemplate`] compiles such a template into an anchored regular
//! expression, extracts the date fields of matching names and builds the
//! [`FileEntry`] list of a directory with [`from_os`].
//!
//! ## Template syntax
//! -----------------
//! * `{field}` or `{field:N}` / `{field:0Nd}` – a numeric field, `N` digits wide
//!   when a width is given. Supported fields: `year`, `month`, `day`, `hour`,
//!   `minute`, `second`, `doy`, `version`, `revision`, `cycle`.
//! * `?` matches any single character and `*` any sequence of characters.
//! * Every other character matches itself.
//!
//! Two-digit years are mapped to 1950–2049.
use std::cmp::Ordering;

use camino::Utf8Path;
use hifitime::{Epoch, Unit};
use regex::Regex;
use smallvec::SmallVec;

use crate::{files::FileEntry, satframe_errors::SatFrameError, time::from_year_doy};

const DATE_FIELDS: [&str; 7] = ["year", "month", "day", "hour", "minute", "second", "doy"];
const VERSION_FIELDS: [&str; 3] = ["version", "revision", "cycle"];

/// Numeric fields read from a file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedFilename {
    pub year: Option<i32>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
    pub doy: Option<u16>,
    pub version: Option<u32>,
    pub revision: Option<u32>,
    pub cycle: Option<u32>,
}

impl ParsedFilename {
    /// Epoch encoded by the date fields, missing fields defaulting to the start
    /// of the period.
    pub fn date(&self) -> Result<Epoch, SatFrameError> {
        let year = self
            .year
            .ok_or_else(|| SatFrameError::InvalidDate("file name without a year".into()))?;
        let midnight = match self.doy {
            Some(doy) => from_year_doy(year, doy)?,
            None => {
                let month = self.month.unwrap_or(1);
                let day = self.day.unwrap_or(1);
                Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0).map_err(|e| {
                    SatFrameError::InvalidDate(format!("{year:04}-{month:02}-{day:02}: {e}"))
                })?
            }
        };
        let hour = i64::from(self.hour.unwrap_or(0));
        let minute = i64::from(self.minute.unwrap_or(0));
        let second = i64::from(self.second.unwrap_or(0));
        if hour > 23 || minute > 59 || second > 60 {
            return Err(SatFrameError::InvalidDate(format!(
                "{hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(midnight + Unit::Hour * hour + Unit::Minute * minute + Unit::Second * second)
    }

    /// Ordering key of the file versions, newest last.
    fn version_key(&self) -> (u32, u32, u32) {
        (
            self.version.unwrap_or(0),
            self.revision.unwrap_or(0),
            self.cycle.unwrap_or(0),
        )
    }
}

#[derive(Debug, Clone)]
pub struct FilenameTemplate {
    template: String,
    regex: Regex,
    fields: SmallVec<[(&'static str, usize); 8]>,
}

impl FilenameTemplate {
    /// Compile a filename template.
    ///
    /// Arguments
    /// -----------------
    /// * `template`: the naming scheme, see the module documentation.
    ///
    /// Return
    /// ----------
    /// * The compiled template, or [`SatFrameError::InvalidFilenameTemplate`] for an
    ///   unknown field, an unclosed brace, a repeated field or a template without
    ///   a year.
    pub fn parse(template: &str) -> Result<Self, SatFrameError> {
        let mut pattern = String::from("^");
        let mut fields: SmallVec<[(&'static str, usize); 8]> = SmallVec::new();
        let mut chars = template.char_indices();

        while let Some((start, c)) = chars.next() {
            match c {
                '{' => {
                    let rest = &template[start + 1..];
                    let close = rest.find('}').ok_or_else(|| {
                        SatFrameError::InvalidFilenameTemplate(format!(
                            "unclosed brace in `{template}`"
                        ))
                    })?;
                    let spec = &rest[..close];
                    let (field, width) = Self::parse_field(spec, template)?;
                    if fields.iter().any(|(f, _)| *f == field) {
                        return Err(SatFrameError::InvalidFilenameTemplate(format!(
                            "field `{field}` repeated in `{template}`"
                        )));
                    }
                    match width {
                        Some(n) => pattern.push_str(&format!(r"(?P<{field}>\d{{{n}}})")),
                        None => pattern.push_str(&format!(r"(?P<{field}>\d+)")),
                    }
                    fields.push((field, width.unwrap_or(0)));
                    for _ in 0..spec.chars().count() + 1 {
                        chars.next();
                    }
                }
                '?' => pattern.push('.'),
                '*' => pattern.push_str(".*"),
                other => pattern.push_str(&regex::escape(&other.to_string())),
            }
        }
        pattern.push('$');

        if !fields.iter().any(|(f, _)| *f == "year") {
            return Err(SatFrameError::InvalidFilenameTemplate(format!(
                "`{template}` has no year field"
            )));
        }

        Ok(FilenameTemplate {
            template: template.to_string(),
            regex: Regex::new(&pattern)?,
            fields,
        })
    }

    fn parse_field(spec: &str, template: &str) -> Result<(&'static str, Option<usize>), SatFrameError> {
        let (name, format) = match spec.split_once(':') {
            Some((name, format)) => (name, Some(format)),
            None => (spec, None),
        };
        let field = DATE_FIELDS
            .iter()
            .chain(VERSION_FIELDS.iter())
            .find(|f| **f == name)
            .copied()
            .ok_or_else(|| {
                SatFrameError::InvalidFilenameTemplate(format!(
                    "unknown field `{name}` in `{template}`"
                ))
            })?;
        let width = match format {
            None => None,
            Some(format) => {
                let digits = format.trim_end_matches('d');
                let width = digits.parse::<usize>().map_err(|_| {
                    SatFrameError::InvalidFilenameTemplate(format!(
                        "bad width `{format}` for `{name}` in `{template}`"
                    ))
                })?;
                (width > 0).then_some(width)
            }
        };
        Ok((field, width))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fields of `name`, or `None` when the name does not follow the template.
    pub fn parse_name(&self, name: &str) -> Option<ParsedFilename> {
        let captures = self.regex.captures(name)?;
        let mut parsed = ParsedFilename::default();
        for (field, width) in &self.fields {
            let value: u32 = captures.name(field)?.as_str().parse().ok()?;
            match *field {
                "year" => {
                    let year = value as i32;
                    parsed.year = Some(match (*width, year) {
                        (2, y) if y < 50 => 2000 + y,
                        (2, y) => 1900 + y,
                        (_, y) => y,
                    });
                }
                "month" => parsed.month = u8::try_from(value).ok(),
                "day" => parsed.day = u8::try_from(value).ok(),
                "hour" => parsed.hour = u8::try_from(value).ok(),
                "minute" => parsed.minute = u8::try_from(value).ok(),
                "second" => parsed.second = u8::try_from(value).ok(),
                "doy" => parsed.doy = u16::try_from(value).ok(),
                "version" => parsed.version = Some(value),
                "revision" => parsed.revision = Some(value),
                "cycle" => parsed.cycle = Some(value),
                _ => {}
            }
        }
        Some(parsed)
    }
}

/// List the files of `data_path` following `template`.
///
/// Names that do not match the template, or whose date fields are invalid,
/// are skipped. When several versions of a file share the same date, only the
/// highest `(version, revision, cycle)` is kept.
///
/// Arguments
/// -----------------
/// * `data_path`: the directory to scan (not recursive). A missing directory
///   yields an empty list.
/// * `template`: the naming scheme.
///
/// Return
/// ----------
/// * The entries, sorted by date.
pub fn from_os(data_path: &Utf8Path, template: &str) -> Result<Vec<FileEntry>, SatFrameError> {
    let template = FilenameTemplate::parse(template)?;
    if !data_path.is_dir() {
        log::debug!("{data_path} is not a directory, no files listed");
        return Ok(Vec::new());
    }

    let mut found: Vec<(Epoch, (u32, u32, u32), String)> = Vec::new();
    for entry in data_path.read_dir_utf8()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(parsed) = template.parse_name(name) else {
            continue;
        };
        match parsed.date() {
            Ok(date) => found.push((date, parsed.version_key(), name.to_string())),
            Err(e) => log::warn!("Skipping {name}: {e}"),
        }
    }

    found.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    let mut entries: Vec<FileEntry> = Vec::with_capacity(found.len());
    for (date, _, name) in found {
        match entries.last_mut() {
            Some(last) if last.date == date => last.name = name,
            _ => entries.push(FileEntry::new(date, name)),
        }
    }
    Ok(entries)
}
