//! Canonical text forms for dates, times and datetimes, as written to the wire.

use crate::error::EncodeError;
use crate::options::Options;
use crate::value::{DateTime, Time, TzInfo};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc};

/// `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// `HH:MM:SS`, followed by `.ffffff` if the time has a non-zero microsecond and `OMIT_MICROSECONDS` is unset.
pub fn format_time(time: &NaiveTime, options: Options) -> String {
    let mut out = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second());
    // chrono encodes a leap second as a nanosecond value above one second
    let micros = time.nanosecond() % 1_000_000_000 / 1_000;
    if micros != 0 && !options.contains(Options::OMIT_MICROSECONDS) {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

/// `+HH:MM`, with `:SS` appended if the offset has seconds. UTC becomes `Z` under `UTC_Z`.
pub fn format_offset(offset: &FixedOffset, options: Options) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 && options.contains(Options::UTC_Z) {
        return "Z".to_owned();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let mut out = format!("{}{:02}:{:02}", sign, abs / 3600, abs % 3600 / 60);
    if abs % 60 != 0 {
        out.push_str(&format!(":{:02}", abs % 60));
    }
    out
}

/// The text form of a time. A time carrying a zone has no meaningful offset and is rejected.
pub fn format_time_value(time: &Time, options: Options) -> Result<String, EncodeError> {
    match time.tz {
        Some(_) => Err(EncodeError::TimeHasTzinfo),
        None => Ok(format_time(&time.time, options)),
    }
}

/// Date `T` time, then the offset. Naive datetimes have no offset unless `NAIVE_UTC` is set. Returns `None` for a
/// datetime in a named zone since its offset can't be known here.
pub fn format_datetime(value: &DateTime, options: Options) -> Option<String> {
    let mut out = format_date(&value.datetime.date());
    out.push('T');
    out.push_str(&format_time(&value.datetime.time(), options));
    match &value.tz {
        Some(TzInfo::Fixed(offset)) => out.push_str(&format_offset(offset, options)),
        Some(TzInfo::Named(_)) => return None,
        None if options.contains(Options::NAIVE_UTC) => out.push_str(&format_offset(&Utc.fix(), options)),
        None => {},
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn datetime(h: u32, min: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_micro_opt(h, min, s, micro).unwrap()
    }

    #[test]
    fn dates() {
        assert_eq!("1970-01-01", format_date(&NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()));
        assert_eq!("0001-02-03", format_date(&NaiveDate::from_ymd_opt(1, 2, 3).unwrap()));
    }

    #[test]
    fn times() {
        let time = NaiveTime::from_hms_micro_opt(12, 15, 59, 111).unwrap();
        assert_eq!("12:15:59.000111", format_time(&time, Options::empty()));
        assert_eq!("12:15:59", format_time(&time, Options::OMIT_MICROSECONDS));
        let time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!("00:00:00", format_time(&time, Options::empty()));
        let aware = Time::with_tz(time, TzInfo::utc());
        assert!(matches!(format_time_value(&aware, Options::empty()), Err(EncodeError::TimeHasTzinfo)));
    }

    #[test]
    fn naive_datetimes() {
        let value = DateTime::naive(datetime(2, 3, 4, 123));
        assert_eq!("2000-01-01T02:03:04.000123", format_datetime(&value, Options::empty()).unwrap());
        assert_eq!("2000-01-01T02:03:04.000123+00:00", format_datetime(&value, Options::NAIVE_UTC).unwrap());
        let options = Options::OMIT_MICROSECONDS | Options::NAIVE_UTC | Options::UTC_Z;
        assert_eq!("2000-01-01T02:03:04Z", format_datetime(&value, options).unwrap());
        // UTC_Z alone has no offset to replace
        assert_eq!("2000-01-01T02:03:04.000123", format_datetime(&value, Options::UTC_Z).unwrap());
    }

    #[test]
    fn offsets() {
        let value = |seconds| DateTime::with_offset(datetime(2, 3, 4, 0), FixedOffset::east_opt(seconds).unwrap());
        assert_eq!("2000-01-01T02:03:04+00:00", format_datetime(&value(0), Options::empty()).unwrap());
        assert_eq!("2000-01-01T02:03:04Z", format_datetime(&value(0), Options::UTC_Z).unwrap());
        assert_eq!("2000-01-01T02:03:04+05:30", format_datetime(&value(19800), Options::UTC_Z).unwrap());
        assert_eq!("2000-01-01T02:03:04-08:00", format_datetime(&value(-28800), Options::empty()).unwrap());
        assert_eq!("2000-01-01T02:03:04+00:00:30", format_datetime(&value(30), Options::empty()).unwrap());
        assert_eq!("2000-01-01T02:03:04-01:02:03", format_datetime(&value(-3723), Options::empty()).unwrap());
    }

    #[test]
    fn named_zone() {
        let value = DateTime::with_zone(datetime(2, 3, 4, 0), "Europe/Amsterdam");
        assert_eq!(None, format_datetime(&value, Options::NAIVE_UTC));
    }

}
