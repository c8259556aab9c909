//! Day-sized sync windows.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CalMirrorError, CalMirrorResult};
use crate::event::Event;

/// One local calendar day, from 00:00:00.000 to 23:59:59.999 inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    /// The window covering `date` in time zone `tz`.
    pub fn for_day(date: NaiveDate, tz: Tz) -> CalMirrorResult<Self> {
        let next = date
            .succ_opt()
            .ok_or_else(|| CalMirrorError::Config(format!("No day after {date}")))?;

        let start = local_midnight(date, tz)?;
        let end = local_midnight(next, tz)? - Duration::milliseconds(1);

        Ok(SyncWindow { date, start, end })
    }

    /// Whether an event overlaps this window.
    pub fn overlaps(&self, event: &Event) -> bool {
        event.start <= self.end && event.end > self.start
    }

    pub fn from_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }
}

impl fmt::Display for SyncWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// `days` consecutive windows starting at `first`.
pub fn day_windows(first: NaiveDate, days: u32, tz: Tz) -> CalMirrorResult<Vec<SyncWindow>> {
    first
        .iter_days()
        .take(days as usize)
        .map(|date| SyncWindow::for_day(date, tz))
        .collect()
}

/// Today's date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse an IANA time zone name.
pub fn parse_timezone(name: &str) -> CalMirrorResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CalMirrorError::InvalidTimezone(name.to_string()))
}

/// Parse YYYY-MM-DD.
pub fn parse_date(s: &str) -> CalMirrorResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CalMirrorError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s)))
}

/// First instant of `date` in `tz`.
///
/// Where a DST change skips midnight, the day starts at the first local time
/// that exists.
fn local_midnight(date: NaiveDate, tz: Tz) -> CalMirrorResult<DateTime<Utc>> {
    let midnight = NaiveDateTime::new(date, NaiveTime::MIN);

    (0..=2)
        .map(|h| midnight + Duration::hours(h))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CalMirrorError::Config(format!("Could not resolve midnight of {date} in {tz}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: "e".into(),
            title: "e".into(),
            start,
            end,
            description: None,
            location: None,
            all_day: false,
            color: None,
        }
    }

    #[test]
    fn test_utc_window_bounds() {
        let w = SyncWindow::for_day(date(2025, 3, 20), Tz::UTC).unwrap();
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap());
        assert_eq!(w.end.hour(), 23);
        assert_eq!(w.end.minute(), 59);
        assert_eq!(w.end.second(), 59);
        assert_eq!(w.end.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn test_zoned_window_is_shifted() {
        let w = SyncWindow::for_day(date(2025, 1, 15), chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 1, 14, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_day_is_shorter() {
        let w = SyncWindow::for_day(date(2025, 3, 30), chrono_tz::Europe::Berlin).unwrap();
        let length = w.end - w.start + Duration::milliseconds(1);
        assert_eq!(length, Duration::hours(23));
    }

    #[test]
    fn test_day_windows_are_consecutive() {
        let windows = day_windows(date(2025, 12, 30), 3, Tz::UTC).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].date, date(2026, 1, 1));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end + Duration::milliseconds(1), pair[1].start);
        }
    }

    #[test]
    fn test_zero_days_is_empty() {
        assert!(day_windows(date(2025, 1, 1), 0, Tz::UTC).unwrap().is_empty());
    }

    #[test]
    fn test_overlap() {
        let w = SyncWindow::for_day(date(2025, 3, 20), Tz::UTC).unwrap();
        let at = |h: u32| Utc.with_ymd_and_hms(2025, 3, 20, h, 0, 0).unwrap();

        assert!(w.overlaps(&event_between(at(9), at(10))));
        // Spans midnight into the next day.
        assert!(w.overlaps(&event_between(at(23), at(23) + Duration::hours(2))));
        // Ends exactly at the window start.
        assert!(!w.overlaps(&event_between(at(0) - Duration::hours(1), at(0))));
        // Starts exactly at the next day.
        let next = at(0) + Duration::days(1);
        assert!(!w.overlaps(&event_between(next, next + Duration::hours(1))));
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(CalMirrorError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-20").unwrap(), date(2025, 3, 20));
        assert!(parse_date("20/03/2025").is_err());
    }
}
