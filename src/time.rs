use std::str::FromStr;

use hifitime::{Duration, Epoch, Unit};

use crate::{constants::MONTH_NAMES, satframe_errors::SatFrameError};

/// Midnight (UTC) of the day containing `epoch`.
pub fn floor_day(epoch: Epoch) -> Epoch {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    Epoch::from_gregorian_utc_at_midnight(year, month, day)
}

/// Build the midnight epoch of a given year and day of year.
///
/// Arguments
/// ---------
/// * `year`: the calendar year
/// * `doy`: the day of year, 1-based, in `1..=366`
///
/// Return
/// ------
/// * the epoch at 00:00:00 UTC of that day, or [`SatFrameError::InvalidDayOfYear`]
pub fn from_year_doy(year: i32, doy: u16) -> Result<Epoch, SatFrameError> {
    if !(1..=366).contains(&doy) || doy > days_in_year(year) {
        return Err(SatFrameError::InvalidDayOfYear(doy));
    }
    let mut remaining = doy;
    let mut month = 1_u8;
    while remaining > days_in_month(year, month) {
        remaining -= days_in_month(year, month);
        month += 1;
    }
    Ok(Epoch::from_gregorian_utc_at_midnight(
        year,
        month,
        remaining as u8,
    ))
}

/// Year and 1-based day of year of the day containing `epoch`.
pub fn year_doy(epoch: Epoch) -> (i32, u16) {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    let before: u16 = (1..month).map(|m| days_in_month(year, m)).sum();
    (year, before + u16::from(day))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn days_in_month(year: i32, month: u8) -> u16 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parse a date or datetime string (ISO 8601, e.g. `2009-01-01T00:00:00 UTC`).
pub fn parse_date(value: &str) -> Result<Epoch, SatFrameError> {
    Epoch::from_str(value).map_err(|e| SatFrameError::InvalidDate(format!("{value}: {e}")))
}

/// Format the calendar day of `epoch` as `01 January 2009`.
pub fn format_day(epoch: Epoch) -> String {
    let (year, month, day, _, _, _, _) = epoch.to_gregorian_utc();
    format!("{day:02} {} {year}", MONTH_NAMES[usize::from(month) - 1])
}

/// Midnight of the current day (UTC).
pub fn today() -> Result<Epoch, SatFrameError> {
    let now = Epoch::now().map_err(|e| SatFrameError::InvalidDate(e.to_string()))?;
    Ok(floor_day(now))
}

/// Midnight of the next day (UTC).
pub fn tomorrow() -> Result<Epoch, SatFrameError> {
    Ok(today()? + Unit::Day * 1)
}

/// Midnight of the previous day (UTC).
pub fn yesterday() -> Result<Epoch, SatFrameError> {
    Ok(today()? - Unit::Day * 1)
}

/// Epochs `start, start + step, ...` up to and including `stop`.
///
/// Arguments
/// ---------
/// * `start`: first epoch of the range
/// * `stop`: last epoch allowed in the range (inclusive)
/// * `step`: spacing between two consecutive epochs, must be positive
///
/// Return
/// ------
/// * the list of epochs, empty when `stop < start`
pub fn epoch_range(start: Epoch, stop: Epoch, step: Duration) -> Vec<Epoch> {
    let mut out = Vec::new();
    if step <= Duration::ZERO {
        return out;
    }
    let mut current = start;
    while current <= stop {
        out.push(current);
        current = current + step;
    }
    out
}

#[cfg(test)]
mod time_test {
    use super::*;

    #[test]
    fn test_floor_day() {
        let epoch = Epoch::from_gregorian_utc(2009, 1, 1, 13, 45, 12, 500);
        assert_eq!(
            floor_day(epoch),
            Epoch::from_gregorian_utc_at_midnight(2009, 1, 1)
        );
    }

    #[test]
    fn test_year_doy_round_trip_leap_year() {
        let date = from_year_doy(2008, 366).unwrap();
        assert_eq!(date, Epoch::from_gregorian_utc_at_midnight(2008, 12, 31));
        assert_eq!(year_doy(date), (2008, 366));

        let date = Epoch::from_gregorian_utc(2009, 3, 1, 23, 59, 59, 0);
        assert_eq!(year_doy(date), (2009, 60));
    }

    #[test]
    fn test_invalid_doy() {
        assert_eq!(
            from_year_doy(2009, 0),
            Err(SatFrameError::InvalidDayOfYear(0))
        );
        assert_eq!(
            from_year_doy(2009, 367),
            Err(SatFrameError::InvalidDayOfYear(367))
        );
        assert_eq!(
            from_year_doy(2009, 366),
            Err(SatFrameError::InvalidDayOfYear(366))
        );
    }

    #[test]
    fn test_format_day() {
        let date = Epoch::from_gregorian_utc_at_midnight(2009, 1, 5);
        assert_eq!(format_day(date), "05 January 2009");
    }

    #[test]
    fn test_epoch_range_inclusive() {
        let start = Epoch::from_gregorian_utc_at_midnight(2009, 1, 1);
        let stop = Epoch::from_gregorian_utc_at_midnight(2009, 1, 3);
        let days = epoch_range(start, stop, Unit::Day * 1);
        assert_eq!(days.len(), 3);
        assert_eq!(days[2], stop);
        assert!(epoch_range(stop, start, Unit::Day * 1).is_empty());
    }
}
