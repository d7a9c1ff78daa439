//! Day resolution for the day query.
//!
//! The `day` parameter is permissive: anything that does not parse as a date
//! or date-time falls back to today. Only the calendar date matters; a
//! timestamp with an offset keeps the date it was written with. That date
//! is then read in the configured zone: its bounds run from local midnight
//! to the next local midnight.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::config::DayZone;

const DATETIME_WITH_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a textual date or date-time into a calendar date.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_WITH_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    // An ISO date followed by a time part we could not read, e.g. an offset
    // whose '+' was decoded to a space in the query string.
    match NaiveDate::parse_and_remainder(raw, "%Y-%m-%d") {
        Ok((date, rest)) if rest.starts_with('T') || rest.starts_with(' ') => Some(date),
        _ => None,
    }
}

/// Today's date in the configured zone
pub fn today(zone: DayZone) -> NaiveDate {
    match zone {
        DayZone::Utc => Utc::now().date_naive(),
        DayZone::Local => Local::now().date_naive(),
    }
}

/// The day to query: the parsed parameter, or `today` when it is missing or unreadable.
pub fn resolve_day(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw.and_then(parse_day) {
        Some(day) => day,
        None => {
            if let Some(raw) = raw {
                tracing::debug!("Unreadable day parameter {:?}, using {}", raw, today);
            }
            today
        }
    }
}

/// Half-open UTC range `[start, end)` covering `day` in the configured zone.
pub fn day_bounds(day: NaiveDate, zone: DayZone) -> (DateTime<Utc>, DateTime<Utc>) {
    match zone {
        DayZone::Utc => bounds_in(&Utc, day),
        DayZone::Local => bounds_in(&Local, day),
    }
}

/// Half-open UTC range covering `day` as a calendar day of `tz`.
pub fn bounds_in<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(tz, day);
    let end = day
        .succ_opt()
        .map_or(start + Duration::days(1), |next| start_of_day(tz, next));
    (start, end)
}

/// First instant of `day` in `tz`. When a DST gap swallows midnight the day
/// starts at the first local time that exists.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=96)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
