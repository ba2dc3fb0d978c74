//! Spreadsheet serial dates
//!
//! A serial date counts days from the workbook epoch; the fractional part is the
//! time of day. The 1900 system reproduces Excel's historical bug of treating
//! 1900 as a leap year: serial 60 is the fictitious 1900-02-29 and every serial
//! from 61 on is one day ahead of the real calendar count.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use gridcalc_core::{DateOrder, DateSystem, ErrorCode, ValueLocale};
use lazy_regex::regex_captures;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_DAY: f64 = SECONDS_PER_DAY * 1000.0;

/// Offset added before extracting calendar fields, to absorb floating point drift
const CALENDAR_FIELD_ROUNDING: f64 = 0.4995 / SECONDS_PER_DAY;

/// Calendar fields of a serial date
///
/// Unlike a real calendar date this can hold Excel's pseudo-dates
/// 1900-01-00 (serial 0) and 1900-02-29 (serial 60).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

fn epoch_start(system: DateSystem) -> Option<NaiveDate> {
    match system {
        DateSystem::Excel1900 => NaiveDate::from_ymd_opt(1900, 1, 1),
        DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
    }
}

/// Convert a calendar date to its serial day number
///
/// Returns `None` for dates before the epoch.
pub fn date_to_serial(date: NaiveDate, system: DateSystem) -> Option<f64> {
    let start = epoch_start(system)?;
    if date < start {
        return None;
    }
    let days = (date - start).num_days();
    let serial = match system {
        DateSystem::Excel1900 if days + 1 >= 60 => days + 2,
        DateSystem::Excel1900 => days + 1,
        DateSystem::Excel1904 => days,
    };
    Some(serial as f64)
}

/// Convert a date and time to a serial number
pub fn datetime_to_serial(datetime: NaiveDateTime, system: DateSystem) -> Option<f64> {
    let days = date_to_serial(datetime.date(), system)?;
    Some(days + time_to_fraction(datetime.time()))
}

/// Fraction of a day represented by a time of day
pub fn time_to_fraction(time: NaiveTime) -> f64 {
    let millis = time.num_seconds_from_midnight() as f64 * 1000.0
        + (time.nanosecond() / 1_000_000) as f64;
    millis / MILLIS_PER_DAY
}

/// Convert a serial number to a real calendar date and time
///
/// Serial 0 maps to 1899-12-31 and serial 60 to 1900-03-01 in the 1900 system,
/// as no real calendar contains the pseudo-dates Excel shows for them. Negative
/// serials have no date.
pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let whole_days = serial.floor();
    let millis = ((serial - whole_days) * MILLIS_PER_DAY + 0.5) as i64;
    let whole_days = whole_days as i64;

    let day_adjust = match system {
        DateSystem::Excel1904 => 1,
        DateSystem::Excel1900 if whole_days < 61 => 0,
        DateSystem::Excel1900 => -1,
    };
    let start = epoch_start(system)?.and_hms_opt(0, 0, 0)?;
    start
        .checked_add_signed(Duration::try_days(whole_days + day_adjust - 1)?)?
        .checked_add_signed(Duration::try_milliseconds(millis)?)
}

/// Convert a serial number to a calendar date, dropping the time of day
pub fn serial_to_date(serial: f64, system: DateSystem) -> Option<NaiveDate> {
    serial_to_datetime(serial.floor(), system).map(|dt| dt.date())
}

/// Extract calendar fields the way YEAR, MONTH, DAY, HOUR, MINUTE and SECOND do
///
/// Negative serials are `#NUM!`.
pub fn calendar_fields(serial: f64, system: DateSystem) -> Result<DateParts, ErrorCode> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(ErrorCode::Num);
    }
    let rounded = serial + CALENDAR_FIELD_ROUNDING;
    let datetime = serial_to_datetime(rounded, system).ok_or(ErrorCode::Num)?;
    let mut parts = DateParts {
        year: datetime.year(),
        month: datetime.month(),
        day: datetime.day(),
        hour: datetime.hour(),
        minute: datetime.minute(),
        second: datetime.second(),
    };

    if system == DateSystem::Excel1900 {
        match rounded.trunc() as i64 {
            0 => {
                parts.year = 1900;
                parts.month = 1;
                parts.day = 0;
            }
            60 => {
                parts.year = 1900;
                parts.month = 2;
                parts.day = 29;
            }
            _ => {}
        }
    }
    Ok(parts)
}

/// Serial number for DATE(year, month, day)
///
/// Months and days outside their usual range roll over into neighbouring
/// months and years. Years below 1900 are offset by 1900 as Excel does.
pub fn serial_from_ymd(year: i64, month: i64, day: i64, system: DateSystem) -> Option<f64> {
    let year = if (0..1900).contains(&year) {
        year + 1900
    } else {
        year
    };
    if !(0..10_000).contains(&year) {
        return None;
    }

    let month_index = year * 12 + (month - 1);
    let (year, month0) = (month_index.div_euclid(12), month_index.rem_euclid(12));
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month0 as u32 + 1, 1)?;
    let serial = date_to_serial(first, system)? + (day - 1) as f64;
    (serial >= 0.0).then_some(serial)
}

/// Add whole months to a date, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

/// Last day of the month containing `date`
pub fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    add_months(first, 1)?.pred_opt()
}

/// True if `date` is the last day of its month
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.day() == 1).unwrap_or(true)
}

/// Parse a time of day in "HH:MM" or "HH:MM:SS" form into a fraction of a day
pub fn parse_time_fraction(text: &str) -> Option<f64> {
    let (_, hours, minutes, seconds) =
        regex_captures!(r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?$", text)?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = if seconds.is_empty() {
        0
    } else {
        seconds.parse().ok()?
    };
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(f64::from(seconds + (minutes + hours * 60) * 60) / SECONDS_PER_DAY)
}

/// Parse a time of day with an AM/PM marker ("3:04 PM", "11:30:15 am")
fn parse_twelve_hour_time(text: &str) -> Option<f64> {
    let (_, hours, minutes, seconds, meridiem) = regex_captures!(
        r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2}))? ?([AaPp][Mm])$",
        text
    )?;
    let hours: u32 = hours.parse().ok()?;
    if !(1..=12).contains(&hours) {
        return None;
    }
    let hours = match (hours, meridiem.to_ascii_uppercase().as_str()) {
        (12, "AM") => 0,
        (12, _) => 12,
        (h, "PM") => h + 12,
        (h, _) => h,
    };
    let plain = if seconds.is_empty() {
        format!("{}:{}", hours, minutes)
    } else {
        format!("{}:{}:{}", hours, minutes, seconds)
    };
    parse_time_fraction(&plain)
}

fn parse_time_part(text: &str) -> Option<f64> {
    parse_time_fraction(text).or_else(|| parse_twelve_hour_time(text))
}

/// Date formats that carry their own year
fn dated_formats(order: DateOrder) -> &'static [&'static str] {
    match order {
        DateOrder::Mdy => &[
            "%d %b %Y",
            "%d-%b-%Y",
            "%Y %d-%b",
            "%m/%d/%Y",
            "%Y/%m/%d",
            "%Y-%m-%d",
        ],
        DateOrder::Dmy => &[
            "%d %b %Y",
            "%d-%b-%Y",
            "%Y %d-%b",
            "%d/%m/%Y",
            "%Y/%m/%d",
            "%Y-%m-%d",
        ],
    }
}

/// Date formats without a year; the current year is appended before parsing
fn yearless_formats(order: DateOrder) -> &'static [&'static str] {
    match order {
        DateOrder::Mdy => &["%d %b %Y", "%d-%b %Y", "%m/%d %Y"],
        DateOrder::Dmy => &["%d %b %Y", "%d-%b %Y", "%d/%m %Y"],
    }
}

fn parse_date_part(text: &str, locale: &ValueLocale, current_year: i32) -> Option<NaiveDate> {
    dated_formats(locale.date_order)
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            let with_year = format!("{} {}", text, current_year);
            yearless_formats(locale.date_order)
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&with_year, fmt).ok())
        })
}

/// Parse a date and/or time literal ("2019/1/18", "18-Jan-2019", "15:43:09",
/// "18 Jan 2019 3:04 PM") into a serial number
///
/// Runs of whitespace are treated as a single space. A date without a year
/// takes `current_year`.
pub fn parse_date_time(text: &str, locale: &ValueLocale, current_year: i32) -> Option<f64> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    if let Some(fraction) = parse_time_part(&normalized) {
        return Some(fraction);
    }

    let (date_text, time_fraction) = match regex_captures!(
        r"^(.*?) (\d{1,2}:\d{1,2}(?::\d{1,2})?(?: ?[AaPp][Mm])?)$",
        &normalized
    ) {
        Some((_, date_text, time_text)) => (date_text, parse_time_part(time_text)?),
        None => (normalized.as_str(), 0.0),
    };

    let date = parse_date_part(date_text, locale, current_year)?;
    Some(date_to_serial(date, locale.date_system)? + time_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_to_serial_1900() {
        let sys = DateSystem::Excel1900;
        assert_eq!(date_to_serial(ymd(1900, 1, 1), sys), Some(1.0));
        assert_eq!(date_to_serial(ymd(1900, 2, 28), sys), Some(59.0));
        assert_eq!(date_to_serial(ymd(1900, 3, 1), sys), Some(61.0));
        assert_eq!(date_to_serial(ymd(2019, 1, 18), sys), Some(43483.0));
        assert_eq!(date_to_serial(ymd(1899, 12, 31), sys), None);
    }

    #[test]
    fn test_date_to_serial_1904() {
        let sys = DateSystem::Excel1904;
        assert_eq!(date_to_serial(ymd(1904, 1, 1), sys), Some(0.0));
        assert_eq!(date_to_serial(ymd(2019, 1, 18), sys), Some(42021.0));
    }

    #[test]
    fn test_serial_to_datetime() {
        let sys = DateSystem::Excel1900;
        assert_eq!(serial_to_date(1.0, sys), Some(ymd(1900, 1, 1)));
        assert_eq!(serial_to_date(59.0, sys), Some(ymd(1900, 2, 28)));
        assert_eq!(serial_to_date(61.0, sys), Some(ymd(1900, 3, 1)));
        assert_eq!(serial_to_date(43483.75, sys), Some(ymd(2019, 1, 18)));
        assert_eq!(
            serial_to_datetime(0.5, sys),
            ymd(1899, 12, 31).and_hms_opt(12, 0, 0)
        );
        assert_eq!(serial_to_datetime(-1.0, sys), None);
        assert_eq!(
            serial_to_date(0.0, DateSystem::Excel1904),
            Some(ymd(1904, 1, 1))
        );
    }

    #[test]
    fn test_calendar_fields_pseudo_dates() {
        let sys = DateSystem::Excel1900;
        let zero = calendar_fields(0.25, sys).unwrap();
        assert_eq!((zero.year, zero.month, zero.day, zero.hour), (1900, 1, 0, 6));

        let leap = calendar_fields(60.0, sys).unwrap();
        assert_eq!((leap.year, leap.month, leap.day), (1900, 2, 29));

        assert_eq!(calendar_fields(-0.5, sys), Err(ErrorCode::Num));
    }

    #[test]
    fn test_calendar_fields_rounding() {
        // 23:59:59.6 rounds up to the next day
        let serial = 43483.0 + (86_399.6 / SECONDS_PER_DAY);
        let parts = calendar_fields(serial, DateSystem::Excel1900).unwrap();
        assert_eq!((parts.month, parts.day, parts.hour), (1, 19, 0));

        let parts = calendar_fields(0.654965278, DateSystem::Excel1900).unwrap();
        assert_eq!((parts.hour, parts.minute, parts.second), (15, 43, 9));
    }

    #[test]
    fn test_rounding_crosses_pseudo_date_boundaries() {
        let sys = DateSystem::Excel1900;
        let just_before = |serial: f64| serial - 0.2 / SECONDS_PER_DAY;

        let parts = calendar_fields(just_before(1.0), sys).unwrap();
        assert_eq!((parts.year, parts.month, parts.day, parts.hour), (1900, 1, 1, 0));

        let parts = calendar_fields(just_before(60.0), sys).unwrap();
        assert_eq!((parts.year, parts.month, parts.day, parts.hour), (1900, 2, 29, 0));

        let parts = calendar_fields(just_before(61.0), sys).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (1900, 3, 1));
    }

    #[test]
    fn test_serial_from_ymd() {
        let sys = DateSystem::Excel1900;
        assert_eq!(serial_from_ymd(2019, 1, 18, sys), Some(43483.0));
        assert_eq!(serial_from_ymd(1900, 2, 29, sys), Some(60.0));
        assert_eq!(serial_from_ymd(1900, 1, 0, sys), Some(0.0));
        assert_eq!(serial_from_ymd(119, 1, 18, sys), Some(43483.0));
        assert_eq!(serial_from_ymd(2018, 13, 18, sys), Some(43483.0));
        assert_eq!(serial_from_ymd(2019, 2, -13, sys), Some(43483.0));
        assert_eq!(serial_from_ymd(10_000, 1, 1, sys), None);
        assert_eq!(serial_from_ymd(-1, 1, 1, sys), None);
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(add_months(ymd(2019, 1, 31), 1), Some(ymd(2019, 2, 28)));
        assert_eq!(add_months(ymd(2020, 3, 31), -1), Some(ymd(2020, 2, 29)));
        assert_eq!(end_of_month(ymd(2019, 2, 10)), Some(ymd(2019, 2, 28)));
        assert!(is_last_day_of_month(ymd(2018, 2, 28)));
        assert!(!is_last_day_of_month(ymd(2020, 2, 28)));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time_fraction("12:00"), Some(0.5));
        let t = parse_time_fraction("15:43:09").unwrap();
        assert!((t - 0.654965278).abs() < 1e-5);
        assert_eq!(parse_time_fraction("24:00"), None);
        assert_eq!(parse_time_fraction("1:2:3:4"), None);
    }

    #[test]
    fn test_parse_date_time() {
        let locale = ValueLocale::default();
        for text in ["2019/1/18", "18 Jan 2019", "18-Jan-2019", "1/18/2019", "2019-01-18"] {
            assert_eq!(parse_date_time(text, &locale, 2000), Some(43483.0), "{}", text);
        }
        assert_eq!(parse_date_time("12:00", &locale, 2000), Some(0.5));
        assert_eq!(parse_date_time("2019/1/18 12:00", &locale, 2000), Some(43483.5));
        assert_eq!(
            parse_date_time("18  Jan   2019  6:00 PM", &locale, 2000),
            Some(43483.75)
        );
        assert_eq!(parse_date_time("18 Jan", &locale, 2019), Some(43483.0));
        assert_eq!(parse_date_time("hello", &locale, 2019), None);
        assert_eq!(parse_date_time("", &locale, 2019), None);
    }

    #[test]
    fn test_parse_date_respects_date_order() {
        let dmy = ValueLocale::with_date_order(DateOrder::Dmy);
        assert_eq!(parse_date_time("18/1/2019", &dmy, 2000), Some(43483.0));
        assert_eq!(parse_date_time("18/1/2019", &ValueLocale::default(), 2000), None);
    }
}
