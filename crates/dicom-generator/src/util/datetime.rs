//! DICOM date and time parsing and formatting utilities.
//!
//! Converts between DICOM character forms and plain numbers:
//! - DA: `YYYYMMDD` <-> days since Unix epoch (1970-01-01)
//! - TM: `HH[MM[SS[.F{1,6}]]]` <-> microseconds since midnight
//! - DT: `YYYYMMDDHHMMSS.FFF` formatting for generated values

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;

/// Error type for date/time parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl std::fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

fn invalid(kind: &str, value: &str) -> DateTimeParseError {
    DateTimeParseError {
        message: format!("Invalid {}: {:?}", kind, value),
    }
}

/// Returns true if the given year is a leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a given date.
pub fn date_to_days(year: i32, month: u32, day: u32) -> i32 {
    // Howard Hinnant's days_from_civil
    let y = if month <= 2 { year - 1 } else { year } as i64;

    let m = if month <= 2 {
        month as i64 + 9
    } else {
        month as i64 - 3
    };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era
    let doy = (153 * m as u32 + 2) / 5 + day - 1; // day of year
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era

    (era * 146097 + doe as i64 - 719468) as i32
}

/// Converts days since Unix epoch to (year, month, day).
pub fn days_to_date(days: i32) -> (i32, u32, u32) {
    let z = days as i64 + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32; // day of era
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year
    let mp = (5 * doy + 2) / 153; // month index
    let d = doy - (153 * mp + 2) / 5 + 1; // day
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // month

    let year = if m <= 2 { y + 1 } else { y } as i32;
    (year, m, d)
}

fn parse_digits<T: std::str::FromStr>(s: &str, kind: &str, whole: &str) -> Result<T, DateTimeParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(kind, whole));
    }
    s.parse().map_err(|_| invalid(kind, whole))
}

// =====================
// DA
// =====================

/// Parses a DA value (`YYYYMMDD`) to days since Unix epoch.
pub fn parse_da(value: &str) -> Result<i32, DateTimeParseError> {
    if value.len() != 8 || !value.is_ascii() {
        return Err(invalid("date", value));
    }
    let year: i32 = parse_digits(&value[0..4], "date", value)?;
    let month: u32 = parse_digits(&value[4..6], "date", value)?;
    let day: u32 = parse_digits(&value[6..8], "date", value)?;

    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(invalid("date", value));
    }
    Ok(date_to_days(year, month, day))
}

/// Formats days since Unix epoch as a DA value.
pub fn format_da(days: i32) -> String {
    let (year, month, day) = days_to_date(days);
    format!("{:04}{:02}{:02}", year, month, day)
}

// =====================
// TM
// =====================

/// Parses a TM value to microseconds since midnight.
///
/// Accepts `HH`, `HHMM`, `HHMMSS` and `HHMMSS.F` with one to six fraction
/// digits. Seconds may be 60 (leap second).
pub fn parse_tm(value: &str) -> Result<i64, DateTimeParseError> {
    if !value.is_ascii() {
        return Err(invalid("time", value));
    }
    let (clock, fraction) = match value.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (value, None),
    };
    if !matches!(clock.len(), 2 | 4 | 6) || (fraction.is_some() && clock.len() != 6) {
        return Err(invalid("time", value));
    }

    let hours: i64 = parse_digits(&clock[0..2], "time", value)?;
    let minutes: i64 = if clock.len() >= 4 {
        parse_digits(&clock[2..4], "time", value)?
    } else {
        0
    };
    let seconds: i64 = if clock.len() == 6 {
        parse_digits(&clock[4..6], "time", value)?
    } else {
        0
    };
    if hours > 23 || minutes > 59 || seconds > 60 {
        return Err(invalid("time", value));
    }

    let micros = match fraction {
        None => 0,
        Some(f) if (1..=6).contains(&f.len()) => {
            let digits: i64 = parse_digits(f, "time", value)?;
            digits * 10i64.pow(6 - f.len() as u32)
        }
        Some(_) => return Err(invalid("time", value)),
    };

    Ok(hours * MICROSECONDS_PER_HOUR + minutes * MICROSECONDS_PER_MINUTE + seconds * MICROSECONDS_PER_SECOND + micros)
}

/// Formats a time of day as `HHMMSS.mmm`.
pub fn format_tm(hours: u32, minutes: u32, seconds: u32, millis: u32) -> String {
    format!("{:02}{:02}{:02}.{:03}", hours, minutes, seconds, millis)
}

// =====================
// DT
// =====================

/// Formats a date and time of day as a DT value `YYYYMMDDHHMMSS.mmm`.
pub fn format_dt(days: i32, hours: u32, minutes: u32, seconds: u32, millis: u32) -> String {
    format!("{}{}", format_da(days), format_tm(hours, minutes, seconds, millis))
}
