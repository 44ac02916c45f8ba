//! The "yesterday" collection window.

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// An inclusive time range, `start <= t <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Whether `at` falls inside the window, both ends included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// The digest date label, e.g. `"14.03.2025"`.
    pub fn label(&self) -> String {
        self.start.format("%d.%m.%Y").to_string()
    }
}

/// Compute the previous calendar day relative to `now` in `now`'s zone.
///
/// Both bounds carry `now`'s UTC offset, so `end - start` is always exactly
/// 23:59:59.999999 even across a DST change.
pub fn yesterday_window(now: DateTime<Tz>) -> TimeWindow {
    let offset = now.offset().fix();
    let day = now
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap_or(chrono::NaiveDate::MIN);

    let start_time = NaiveTime::MIN;
    let end_time = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);

    // Fixed offsets have exactly one mapping for every local time.
    let start = offset.from_utc_datetime(&(day.and_time(start_time) - offset));
    let end = offset.from_utc_datetime(&(day.and_time(end_time) - offset));
    TimeWindow { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};
    use chrono_tz::Europe::Kyiv;

    fn kyiv(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Kyiv.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn test_window_is_previous_day() {
        let w = yesterday_window(kyiv(2025, 3, 14, 0, 1));
        assert_eq!(w.start.day(), 13);
        assert_eq!(w.start.month(), 3);
        assert_eq!((w.start.hour(), w.start.minute(), w.start.second()), (0, 0, 0));
        assert_eq!(w.end.day(), 13);
        assert_eq!((w.end.hour(), w.end.minute(), w.end.second()), (23, 59, 59));
        assert_eq!(w.end.nanosecond(), 999_999_000);
        assert_eq!(w.label(), "13.03.2025");
    }

    #[test]
    fn test_window_crosses_month_and_year() {
        let w = yesterday_window(kyiv(2025, 1, 1, 12, 0));
        assert_eq!(w.label(), "31.12.2024");
    }

    #[test]
    fn test_window_length_is_constant() {
        let expected = Duration::hours(23)
            + Duration::minutes(59)
            + Duration::seconds(59)
            + Duration::microseconds(999_999);
        // Includes the spring-forward and fall-back days in Kyiv.
        for now in [
            kyiv(2025, 3, 14, 0, 1),
            kyiv(2025, 3, 31, 0, 1),
            kyiv(2025, 10, 27, 0, 1),
            kyiv(2025, 7, 1, 23, 59),
        ] {
            let w = yesterday_window(now);
            assert_eq!(w.end - w.start, expected, "now = {now}");
        }
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let w = yesterday_window(kyiv(2025, 3, 14, 9, 30));
        assert!(w.contains(w.start_utc()));
        assert!(w.contains(w.end_utc()));
        assert!(!w.contains(w.start_utc() - Duration::microseconds(1)));
        assert!(!w.contains(w.end_utc() + Duration::microseconds(1)));
    }

    #[test]
    fn test_window_uses_zone_not_utc() {
        // 00:30 in Kyiv is still the previous day in UTC.
        let w = yesterday_window(kyiv(2025, 6, 10, 0, 30));
        assert_eq!(w.label(), "09.06.2025");
        assert_eq!(w.start_utc().hour(), 21);
    }
}
