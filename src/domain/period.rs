/// Period key calculation
///
/// A period key is the canonical `YYYY-MM-DD` identifier for "today" (daily
/// habits) or "this week" (weekly habits, anchored to the most recent Sunday
/// in the local timezone). A habit whose stored key differs from the current
/// one is due for a rollover.

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::domain::Frequency;

/// Today's date in the local timezone as `YYYY-MM-DD`
pub fn today_key() -> String {
    format_key(Local::now().date_naive())
}

/// The most recent Sunday (inclusive) in the local timezone as `YYYY-MM-DD`
pub fn week_key() -> String {
    format_key(week_start(Local::now().date_naive()))
}

/// Current period key for the given frequency
pub fn key_for(frequency: Frequency) -> String {
    match frequency {
        Frequency::Daily => today_key(),
        Frequency::Weekly => week_key(),
    }
}

/// Sunday on or before the given date
fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_sunday = date.weekday().num_days_from_sunday() as u64;
    // Subtracting at most 6 days can't leave the calendar's supported range
    date.checked_sub_days(Days::new(days_from_sunday))
        .unwrap_or(date)
}

fn format_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_today_key_format() {
        let key = today_key();
        assert!(NaiveDate::parse_from_str(&key, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn test_week_start_is_sunday_on_or_before() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(); // a Wednesday
        let start = week_start(date);
        assert_eq!(start.weekday(), Weekday::Sun);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 8, 23).unwrap());
    }

    #[test]
    fn test_week_start_of_sunday_is_itself() {
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn test_week_key_not_after_today_key() {
        assert!(week_key() <= today_key());
    }

    #[test]
    fn test_key_for_dispatches_on_frequency() {
        assert_eq!(key_for(Frequency::Daily), today_key());
        assert_eq!(key_for(Frequency::Weekly), week_key());
    }
}
