//! The load state machine of [`Instrument`].
//!
//! A load runs in this order:
//!
//! 1. the request resolves into a [`LoadWindow`] and the window is checked
//!    against the padding settings,
//! 2. the plugin is called once (plain loads), or the three-slot cache is
//!    refreshed and the window is assembled with the padding taken from its
//!    neighbours (padded or multi-file-day loads),
//! 3. the time index of the assembled data is checked,
//! 4. the `preprocess`, `clean` and custom hooks run on the padded data,
//! 5. the pad is trimmed off and the load parameters are updated.
//!
//! Date windows cover `[date, date + step)`, file windows cover the first to the
//! last sample of the selected files, both included.
use hifitime::{Duration, Epoch, Unit};
use itertools::Itertools;

use crate::{
    dataset::Dataset,
    instrument::{
        cache::{CachePlan, CacheSlot},
        load_request::{LoadRequest, LoadWindow},
        Instrument,
    },
    metadata::Meta,
    plugin::CleanLevel,
    satframe_errors::SatFrameError,
    time::{floor_day, format_day, year_doy},
};

/// Part of the padded data that is kept once the hooks have run.
#[derive(Debug, Clone, Copy)]
struct TrimSpan {
    first_time: Epoch,
    last_time: Epoch,
    want_last_pad: bool,
}

impl Instrument {
    /// Load the data selected by `request`.
    ///
    /// Arguments
    /// -----------------
    /// * `request`: the window to load, see [`LoadRequest`].
    ///
    /// Return
    /// ----------
    /// * `Ok(())` once [`Instrument::data`] holds the new window (possibly empty).
    /// * Request errors ([`SatFrameError::ConflictingLoadArguments`],
    ///   [`SatFrameError::StopBeforeStart`], ...), [`SatFrameError::PadTooLong`],
    ///   [`SatFrameError::UnsupportedLoadMode`], [`SatFrameError::DataKindMismatch`],
    ///   or [`SatFrameError::TimeIndexIntegrity`] when the time index is not
    ///   strictly increasing and the instrument is strict. In that last case the
    ///   offending data is left in place for inspection.
    pub fn load(&mut self, request: &LoadRequest) -> Result<(), SatFrameError> {
        let window = request.resolve(&self.files)?;
        self.load_window(window, request.verify_pad)
    }

    pub(crate) fn load_window(
        &mut self,
        window: LoadWindow,
        verify_pad: bool,
    ) -> Result<(), SatFrameError> {
        self.check_load_mode(window)?;
        self.load_messages.clear();
        self.orbit_state.reset();

        let (data, meta, span) = if self.pad.is_some() || self.multi_file_day {
            self.load_padded(window)?
        } else {
            let (data, meta) = self.load_data(window)?;
            (data, meta, None)
        };
        self.set_load_parameters(window);
        self.data = data;
        self.meta = meta;

        self.check_time_index()?;

        if !self.data.is_empty() {
            self.plugin.preprocess(&mut self.data, &mut self.meta)?;
            if self.clean_level != CleanLevel::None {
                self.plugin
                    .clean(&mut self.data, &mut self.meta, self.clean_level)?;
            }
            self.custom.apply_all(&mut self.data, &mut self.meta)?;
        }

        if let Some(span) = span {
            if self.pad.is_some() && !verify_pad && !self.data.is_empty() {
                self.data = self.data.slice_time(span.first_time, span.last_time);
                if !span.want_last_pad && self.data.last_time() == Some(span.last_time) {
                    self.data.drop_last();
                }
            }
        }

        if window.is_files() {
            self.date = self.data.first_time().map(floor_day);
        }
        match self.date {
            Some(date) => {
                let (yr, doy) = year_doy(date);
                self.yr = Some(yr);
                self.doy = Some(doy);
            }
            None => {
                self.yr = None;
                self.doy = None;
            }
        }

        let filled = self.meta.fill_missing(self.data.variables());
        if !filled.is_empty() {
            log::warn!(
                "Metadata for {} set to defaults, as they were missing in the Instrument",
                filled.join(", ")
            );
        }
        Ok(())
    }

    fn check_load_mode(&self, window: LoadWindow) -> Result<(), SatFrameError> {
        match window {
            LoadWindow::All if self.pad.is_some() || self.multi_file_day => {
                Err(SatFrameError::UnsupportedLoadMode(
                    "loading all data at once is not supported with a pad or multi_file_day".into(),
                ))
            }
            LoadWindow::Files { .. } if self.multi_file_day => {
                Err(SatFrameError::UnsupportedLoadMode(
                    "multi_file_day is not supported when loading by file".into(),
                ))
            }
            LoadWindow::Date { step, .. } => match self.pad {
                Some(pad) if pad >= step => Err(SatFrameError::PadTooLong {
                    pad: pad.to_string(),
                    step: step.to_string(),
                }),
                _ => Ok(()),
            },
            LoadWindow::Files { .. } if self.pad.is_some() => {
                log::warn!(
                    "Padding is applied to a file based load, the pad is not checked against the data loaded per file"
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn set_load_parameters(&mut self, window: LoadWindow) {
        self.window = Some(window);
        match window {
            LoadWindow::Date { start, .. } => {
                self.date = Some(start);
                self.fid = None;
            }
            LoadWindow::Files { start, .. } => {
                self.date = None;
                self.fid = Some(start);
            }
            LoadWindow::All => {
                self.date = None;
                self.fid = None;
            }
        }
    }

    /// Refresh the cache for `window` and assemble the padded data.
    fn load_padded(
        &mut self,
        window: LoadWindow,
    ) -> Result<(Dataset, Meta, Option<TrimSpan>), SatFrameError> {
        match self.cache.plan(window) {
            CachePlan::Reset => {
                log::debug!("Reloading the cache around {window}");
                let prev = self.load_slot(window.preceding())?;
                let curr = self.load_slot(window)?;
                let next = self.load_slot(window.following())?;
                self.cache.reset(prev, curr, next);
            }
            CachePlan::ShiftForward => {
                let next = self.load_slot(window.following())?;
                self.cache.shift_forward(next);
            }
            CachePlan::ShiftBackward => {
                let prev = self.load_slot(window.preceding())?;
                self.cache.shift_backward(prev);
            }
        }

        let Some(curr) = self.cache.curr() else {
            return Ok((Dataset::empty(self.plugin.table_kind()), Meta::new(), None));
        };
        let mut data = curr.data.clone();
        let meta = curr.meta.clone();
        let (Some(curr_first), Some(curr_last)) = (data.first_time(), data.last_time()) else {
            return Ok((data, meta, None));
        };

        let pad = self.pad.unwrap_or(Duration::ZERO);
        let span = match window {
            LoadWindow::Date { start, step } => TrimSpan {
                first_time: start,
                last_time: start + step,
                want_last_pad: false,
            },
            _ => TrimSpan {
                first_time: curr_first,
                last_time: curr_last,
                want_last_pad: true,
            },
        };
        let first_pad = span.first_time - pad;
        let last_pad = span.last_time + pad;

        if let Some(prev) = self.cache.prev().filter(|s| !s.data.is_empty()) {
            let mut head = prev.data.slice_time(first_pad, curr_first);
            if head.last_time() == Some(curr_first) {
                head.drop_last();
            }
            data.concat(head, true);
        }
        if let Some(next) = self.cache.next().filter(|s| !s.data.is_empty()) {
            let mut tail = next.data.slice_time(curr_last, last_pad);
            if tail.first_time() == Some(curr_last) {
                tail.drop_first();
            }
            data.concat(tail, false);
        }

        let mut data = data.slice_time(first_pad, last_pad);
        if !span.want_last_pad && data.last_time() == Some(last_pad) {
            data.drop_last();
        }
        Ok((data, meta, Some(span)))
    }

    fn load_slot(&mut self, window: LoadWindow) -> Result<CacheSlot, SatFrameError> {
        let (data, meta) = self.load_data(window)?;
        Ok(CacheSlot::new(window, data, meta))
    }

    /// Call the plugin on the files of `window` and record what happened.
    fn load_data(&mut self, window: LoadWindow) -> Result<(Dataset, Meta), SatFrameError> {
        let ident = format!(
            "{} {} {} {}",
            self.plugin.platform(),
            self.plugin.name(),
            self.tag,
            self.inst_id
        );

        let (names, target) = match window {
            LoadWindow::Date { start, step } => {
                let names = self.files.by_date(start, start + step);
                let target = if step > Unit::Day * 1 {
                    format!(
                        "data for {} - {}",
                        format_day(start),
                        format_day(start + step - Unit::Day * 1)
                    )
                } else {
                    format!("data for {}", format_day(start))
                };
                (names, Some(target))
            }
            LoadWindow::Files { start, step } => {
                let stop = start + step as isize;
                if start < 0 || stop >= self.files.len() as isize {
                    (Vec::new(), None)
                } else {
                    let names = self.files.by_position(start, stop + 1);
                    let target = Self::file_target(&names);
                    (names, target)
                }
            }
            LoadWindow::All => {
                let names: Vec<String> = self.files.names().map(str::to_string).collect();
                let target = Self::file_target(&names);
                (names, target)
            }
        };

        let kind = self.plugin.table_kind();
        let result = if names.is_empty() {
            Ok((Dataset::empty(kind), Meta::new()))
        } else {
            let paths = self.files.full_paths(&names);
            self.plugin.load(&paths, &self.tag, &self.inst_id)
        };

        let (data, meta, message) = match (result, target) {
            (Ok((data, meta)), target) => {
                if data.kind() != kind {
                    return Err(SatFrameError::DataKindMismatch {
                        expected: kind.to_string(),
                        found: data.kind().to_string(),
                    });
                }
                let message = match target {
                    Some(target) if data.is_empty() => format!("No {ident} {target}"),
                    Some(target) => format!("Returning {ident} {target}"),
                    None => format!("No {ident} valid filenames found"),
                };
                (data, meta, message)
            }
            (Err(SatFrameError::BadDatetime(detail)), target) => {
                log::debug!("Bad datetime reported by the plugin: {detail}");
                let message = format!(
                    "Bad datetime for {ident} {}",
                    target.unwrap_or_else(|| "data".to_string())
                );
                (Dataset::empty(kind), Meta::new(), message)
            }
            (Err(e), _) => return Err(e),
        };

        let message = message.split_whitespace().join(" ");
        log::info!("{message}");
        self.load_messages.push(message);
        Ok((data, meta))
    }

    fn file_target(names: &[String]) -> Option<String> {
        match names {
            [] => None,
            [only] => Some(format!("data from {only}")),
            [first, .., last] => Some(format!("data from {first} :: {last}")),
        }
    }

    /// Check the time index of the loaded data: strictly increasing and unique.
    fn check_time_index(&self) -> Result<(), SatFrameError> {
        if self.data.is_empty() {
            return Ok(());
        }
        let mut problems = Vec::new();
        if !self.data.index().is_monotonic_increasing() {
            problems.push("Loaded data is not monotonic increasing.");
        }
        if !self.data.index().is_unique() {
            problems.push("Loaded data is not unique.");
        }
        if problems.is_empty() {
            return Ok(());
        }

        let message = problems.join(" ");
        if self.strict_time_flag {
            Err(SatFrameError::TimeIndexIntegrity(message))
        } else {
            log::warn!("{message}");
            Ok(())
        }
    }
}
