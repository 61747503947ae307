// src/utils/dates.rs

//! Best-effort publication date parsing.
//!
//! Every job board prints dates its own way. The parsers here never fail:
//! anything they cannot make sense of becomes an empty string. Relative
//! expressions are anchored on the `now` passed in by the caller.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;

use crate::models::DateFormat;

/// Output format for dates with a time of day.
pub const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Output format for dates without a time of day.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Ukrainian month names in the genitive case, as printed after a day number.
const MONTHS: [(&str, u32); 12] = [
    ("січня", 1),
    ("лютого", 2),
    ("березня", 3),
    ("квітня", 4),
    ("травня", 5),
    ("червня", 6),
    ("липня", 7),
    ("серпня", 8),
    ("вересня", 9),
    ("жовтня", 10),
    ("листопада", 11),
    ("грудня", 12),
];

/// Parse a raw date string according to a source's convention.
pub fn parse_date(raw: &str, format: DateFormat, now: NaiveDateTime) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    match format {
        DateFormat::IsoDateTime => iso_date_time(raw),
        DateFormat::RelativeAgo => relative_ago(raw, now),
        DateFormat::TodayYesterdayOrDate => today_yesterday_or_date(raw, now),
        DateFormat::DayMonth => day_month(raw, now),
        DateFormat::SecondToken => raw
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Month number for a genitive Ukrainian month name.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

fn iso_date_time(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// `"2 дні"` → now minus two days. A non-numeric count counts as one.
fn relative_ago(raw: &str, now: NaiveDateTime) -> String {
    let mut parts = raw.split_whitespace();
    let (Some(count), Some(unit)) = (parts.next(), parts.next()) else {
        return String::new();
    };

    let count = i64::from(count.parse::<u32>().unwrap_or(1));
    let unit = unit.to_lowercase();

    // "тиждень" contains "день", so weeks are matched before days.
    let delta = if unit.contains("хв") {
        TimeDelta::try_minutes(count)
    } else if unit.contains("год") {
        TimeDelta::try_hours(count)
    } else if unit.contains("тиж") {
        TimeDelta::try_weeks(count)
    } else if unit.contains("дн") || unit.contains("день") {
        TimeDelta::try_days(count)
    } else if unit.contains("міс") {
        TimeDelta::try_days(30 * count)
    } else if unit.contains("рік") || unit.contains("рок") {
        TimeDelta::try_days(365 * count)
    } else {
        Some(TimeDelta::zero())
    };

    delta
        .and_then(|delta| now.checked_sub_signed(delta))
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// `"Сьогодні о 12:30"`, `"Вчора о 09:15"` or `"5 січня 2024 р."`.
fn today_yesterday_or_date(raw: &str, now: NaiveDateTime) -> String {
    // Listing cards may prefix the date with a location: "Київ - Сьогодні о 12:30".
    let raw = raw.rsplit(" - ").next().unwrap_or(raw).trim();
    let lower = raw.to_lowercase();

    let day = if lower.contains("сьогодні") {
        Some(now.date())
    } else if lower.contains("вчора") {
        now.date().pred_opt()
    } else {
        None
    };

    if let Some(day) = day {
        return day
            .and_time(time_of_day(raw))
            .format(DATE_TIME_FORMAT)
            .to_string();
    }

    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() < 3 {
        return String::new();
    }
    let year = parts[2].trim_end_matches("р.").trim_end_matches('.');
    calendar_date(parts[0], parts[1], year.parse().ok())
}

/// `"12 січня"` (current year implied) or `"12 січня 2023"`.
fn day_month(raw: &str, now: NaiveDateTime) -> String {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    match parts.as_slice() {
        [day, month] => calendar_date(day, month, Some(now.year())),
        [day, month, year] => calendar_date(day, month, year.parse().ok()),
        _ => String::new(),
    }
}

fn calendar_date(day: &str, month: &str, year: Option<i32>) -> String {
    let (Ok(day), Some(month), Some(year)) = (day.parse::<u32>(), month_number(month), year)
    else {
        return String::new();
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// First `HH:MM` in the text, midnight when absent or invalid.
fn time_of_day(raw: &str) -> NaiveTime {
    static TIME_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = TIME_RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").ok());

    re.as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| {
            let hour = caps.get(1)?.as_str().parse().ok()?;
            let minute = caps.get(2)?.as_str().parse().ok()?;
            NaiveTime::from_hms_opt(hour, minute, 0)
        })
        .unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(
            parse_date("2 дні", DateFormat::RelativeAgo, now()),
            "08.01.2024 12:00"
        );
        assert_eq!(
            parse_date("5 днів тому", DateFormat::RelativeAgo, now()),
            "05.01.2024 12:00"
        );
    }

    #[test]
    fn test_relative_other_units() {
        assert_eq!(
            parse_date("3 години", DateFormat::RelativeAgo, now()),
            "10.01.2024 09:00"
        );
        assert_eq!(
            parse_date("1 тиждень", DateFormat::RelativeAgo, now()),
            "03.01.2024 12:00"
        );
        assert_eq!(
            parse_date("2 місяці", DateFormat::RelativeAgo, now()),
            "11.11.2023 12:00"
        );
        assert_eq!(
            parse_date("15 хвилин", DateFormat::RelativeAgo, now()),
            "10.01.2024 11:45"
        );
    }

    #[test]
    fn test_relative_non_numeric_count_is_one() {
        assert_eq!(
            parse_date("кілька днів", DateFormat::RelativeAgo, now()),
            "09.01.2024 12:00"
        );
    }

    #[test]
    fn test_relative_unparseable_is_empty() {
        assert_eq!(parse_date("нещодавно", DateFormat::RelativeAgo, now()), "");
        assert_eq!(parse_date("", DateFormat::RelativeAgo, now()), "");
    }

    #[test]
    fn test_iso_date_time() {
        assert_eq!(
            parse_date("2024-01-09 18:45:00", DateFormat::IsoDateTime, now()),
            "09.01.2024 18:45"
        );
        assert_eq!(parse_date("09/01/2024", DateFormat::IsoDateTime, now()), "");
    }

    #[test]
    fn test_today_and_yesterday() {
        assert_eq!(
            parse_date("Сьогодні о 09:30", DateFormat::TodayYesterdayOrDate, now()),
            "10.01.2024 09:30"
        );
        assert_eq!(
            parse_date("Вчора о 23:05", DateFormat::TodayYesterdayOrDate, now()),
            "09.01.2024 23:05"
        );
        assert_eq!(
            parse_date("Львів - Сьогодні", DateFormat::TodayYesterdayOrDate, now()),
            "10.01.2024 00:00"
        );
    }

    #[test]
    fn test_full_ukrainian_date() {
        assert_eq!(
            parse_date("5 січня 2024 р.", DateFormat::TodayYesterdayOrDate, now()),
            "05.01.2024"
        );
        assert_eq!(
            parse_date("5 брюмера 2024 р.", DateFormat::TodayYesterdayOrDate, now()),
            ""
        );
        assert_eq!(
            parse_date("незабаром", DateFormat::TodayYesterdayOrDate, now()),
            ""
        );
    }

    #[test]
    fn test_day_month_uses_current_year() {
        assert_eq!(
            parse_date("7 січня", DateFormat::DayMonth, now()),
            "07.01.2024"
        );
        assert_eq!(
            parse_date("28 грудня 2023", DateFormat::DayMonth, now()),
            "28.12.2023"
        );
        assert_eq!(parse_date("31 лютого", DateFormat::DayMonth, now()), "");
        assert_eq!(parse_date("січня", DateFormat::DayMonth, now()), "");
    }

    #[test]
    fn test_second_token() {
        assert_eq!(
            parse_date("Опубліковано 09.01.2024", DateFormat::SecondToken, now()),
            "09.01.2024"
        );
        assert_eq!(parse_date("one", DateFormat::SecondToken, now()), "");
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Грудня"), Some(12));
        assert_eq!(month_number("december"), None);
    }
}
