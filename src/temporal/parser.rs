//! Natural-language date/time parsing for short chat clauses.
//!
//! Supports:
//! - relative days: "today", "tonight", "tomorrow", "day after tomorrow", "in 3 days"
//! - weekday names: "friday", "fri"
//! - explicit dates: "2026-10-23", "23.10.", "23.10.2026", "october 23", "23rd of october"
//! - clock times: "20:00", "8pm", "8:30 pm", "20h", "at 8", "noon", "midnight"
//! - offsets: "in 2 hours", "in an hour", "in 45 minutes"
//!
//! Surrounding words are ignored; the first date and the first time found win.

use crate::error::{Result, RollcallError};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use regex::{Captures, Regex};

/// A clause reduced to a local wall-clock instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedClause {
    /// Local date and time. Midnight when the clause named no time.
    pub local: NaiveDateTime,
    /// Whether a time of day was present in the clause.
    pub has_time: bool,
    /// Step to add once if `local` is not after the reference instant.
    pub roll_forward: Option<Duration>,
}

/// How a date was anchored, which decides how it rolls forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateAnchor {
    Weekday,
    Fixed,
}

/// Compiled patterns for clause parsing.
#[derive(Debug, Clone)]
pub struct TemporalParser {
    offset: Regex,
    iso_date: Regex,
    dotted_date: Regex,
    month_day: Regex,
    day_month: Regex,
    in_days: Regex,
    weekday: Regex,
    clock: Regex,
    meridiem: Regex,
    hour_suffix: Regex,
    bare_at: Regex,
}

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|\
                      november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday|\
                        mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun";

impl TemporalParser {
    /// Compile the clause patterns.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| RollcallError::Config(format!("time pattern: {e}")))
        };
        Ok(Self {
            offset: compile(r"\bin\s+(an|a|\d+)\s+(minutes?|mins?|hours?|hrs?)\b")?,
            iso_date: compile(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")?,
            dotted_date: compile(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})?")?,
            month_day: compile(&format!(r"\b({MONTHS})\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"))?,
            day_month: compile(&format!(
                r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b"
            ))?,
            in_days: compile(r"\bin\s+(a|\d+)\s+(days?|weeks?)\b")?,
            weekday: compile(&format!(r"\b({WEEKDAYS})\b"))?,
            clock: compile(r"\b(\d{1,2}):(\d{2})(?:\s*(am|pm))?\b")?,
            meridiem: compile(r"\b(\d{1,2})\s*(am|pm)\b")?,
            hour_suffix: compile(r"\b(\d{1,2})h\b")?,
            bare_at: compile(r"\bat\s+(\d{1,2})(?:\s|$)")?,
        })
    }

    /// Parse `text` relative to the local reference instant.
    ///
    /// Returns `None` when neither a date nor a time is found.
    #[must_use]
    pub fn parse(&self, text: &str, reference: NaiveDateTime) -> Option<ParsedClause> {
        let text = text.to_lowercase();
        let reference = reference.with_second(0)?.with_nanosecond(0)?;

        if let Some(caps) = self.offset.captures(&text) {
            let local = reference.checked_add_signed(offset_from(&caps)?)?;
            return Some(ParsedClause {
                local,
                has_time: true,
                roll_forward: None,
            });
        }

        let date = self.parse_date(&text, reference.date());
        let time = self.parse_time(&text);

        match (date, time) {
            (Some((date, anchor)), time) => Some(ParsedClause {
                local: date.and_time(time.unwrap_or(NaiveTime::MIN)),
                has_time: time.is_some(),
                roll_forward: (anchor == DateAnchor::Weekday).then(|| Duration::days(7)),
            }),
            (None, Some(time)) => Some(ParsedClause {
                local: reference.date().and_time(time),
                has_time: true,
                roll_forward: Some(Duration::days(1)),
            }),
            (None, None) => None,
        }
    }

    fn parse_date(&self, text: &str, today: NaiveDate) -> Option<(NaiveDate, DateAnchor)> {
        if let Some(caps) = self.iso_date.captures(text) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            return Some((date, DateAnchor::Fixed));
        }
        if let Some(caps) = self.dotted_date.captures(text) {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let date = match caps.get(3) {
                Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day)?,
                None => upcoming_month_day(today, month, day)?,
            };
            return Some((date, DateAnchor::Fixed));
        }
        if let Some(caps) = self.month_day.captures(text) {
            let date = upcoming_month_day(today, month_number(&caps[1])?, caps[2].parse().ok()?)?;
            return Some((date, DateAnchor::Fixed));
        }
        if let Some(caps) = self.day_month.captures(text) {
            let date = upcoming_month_day(today, month_number(&caps[2])?, caps[1].parse().ok()?)?;
            return Some((date, DateAnchor::Fixed));
        }
        if text.contains("day after tomorrow") {
            return Some((days_after(today, 2)?, DateAnchor::Fixed));
        }
        if text.contains("tomorrow") {
            return Some((days_after(today, 1)?, DateAnchor::Fixed));
        }
        if text.contains("today") || text.contains("tonight") {
            return Some((today, DateAnchor::Fixed));
        }
        if let Some(caps) = self.in_days.captures(text) {
            let amount = count(&caps[1])?;
            let days = if caps[2].starts_with('w') {
                amount.checked_mul(7)?
            } else {
                amount
            };
            return Some((days_after(today, days)?, DateAnchor::Fixed));
        }
        if let Some(caps) = self.weekday.captures(text) {
            let weekday = weekday_from_name(&caps[1])?;
            return Some((upcoming_weekday(today, weekday)?, DateAnchor::Weekday));
        }
        None
    }

    fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        if let Some(caps) = self.clock.captures(text) {
            let hour = caps[1].parse().ok()?;
            let minute = caps[2].parse().ok()?;
            return clock_time(hour, minute, caps.get(3).map(|m| m.as_str()));
        }
        if let Some(caps) = self.meridiem.captures(text) {
            return clock_time(caps[1].parse().ok()?, 0, Some(&caps[2]));
        }
        if let Some(caps) = self.hour_suffix.captures(text) {
            return hour_only(&caps);
        }
        if text.contains("noon") {
            return NaiveTime::from_hms_opt(12, 0, 0);
        }
        if text.contains("midnight") {
            return Some(NaiveTime::MIN);
        }
        if let Some(caps) = self.bare_at.captures(text) {
            return hour_only(&caps);
        }
        None
    }
}

fn count(raw: &str) -> Option<i64> {
    match raw {
        "a" | "an" => Some(1),
        digits => digits.parse().ok(),
    }
}

/// `in N minutes/hours` as a delta; `None` when N is out of range.
fn offset_from(caps: &Captures<'_>) -> Option<Duration> {
    let amount = count(&caps[1])?;
    if caps[2].starts_with('m') {
        Duration::try_minutes(amount)
    } else {
        Duration::try_hours(amount)
    }
}

fn days_after(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

fn hour_only(caps: &Captures<'_>) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(caps[1].parse().ok()?, 0, 0)
}

fn clock_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some("pm") if (1..12).contains(&hour) => hour + 12,
        Some("am") if hour == 12 => 0,
        Some(_) if hour == 0 || hour > 12 => return None,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// This year's `month/day`, or next year's if it already passed.
fn upcoming_month_day(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

/// The next date falling on `weekday`, counting today.
fn upcoming_weekday(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    days_after(today, i64::from(ahead))
}

fn month_number(name: &str) -> Option<u32> {
    let month = match &name[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match &name[..3] {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Lowercase English weekday name, as the parser accepts it.
#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
