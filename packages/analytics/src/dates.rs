//! Timestamp normalization.
//!
//! The incident export carries two differently shaped timestamps:
//!
//! * the report timestamp, `MM/dd/yyyy hh:mm:ss AM|PM` (12-hour clock);
//! * the crime date-time *range*, `"<start> - <end>"`, where only the start
//!   (`MM/dd/yyyy HH:mm`, 24-hour clock) is used.
//!
//! Both reduce to a calendar date. Every parse failure yields `None`; no
//! function here returns an error.
//!
//! Parsing is lenient in the same places a legacy date parser is: text
//! after a complete match is ignored and month/day may be a single digit.
//! Two-digit years are expanded against [`TWO_DIGIT_YEAR_PIVOT`] instead of
//! the current date so results do not depend on when the pipeline runs.
//! Out-of-range values (month 13, February 30) are rejected rather than
//! rolled over.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// First year of the 100-year window two-digit years map into.
///
/// `69..=99` become `1969..=1999` and `00..=68` become `2000..=2068`.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 1969;

/// Report timestamp layouts, tried in order.
const REPORT_DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Crime range start layouts, tried in order.
const CRIME_DATE_TIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M"];

/// Bare date, accepted only when it is the whole string.
const DATE_FORMAT: &str = "%m/%d/%Y";

/// Time-of-day layouts for hour extraction, tried in order.
const TIME_OF_DAY_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];

/// Parses the date part of a raw report timestamp.
#[must_use]
pub fn parse_report_date(raw: Option<&str>) -> Option<NaiveDate> {
    parse_date_with(raw?, REPORT_DATE_TIME_FORMATS)
}

/// Parses the date part of the start of a raw crime date-time range.
///
/// Only the text before the first `delimiter` is considered; without a
/// delimiter the whole string is the start.
#[must_use]
pub fn parse_crime_date(raw: Option<&str>, delimiter: &str) -> Option<NaiveDate> {
    parse_date_with(crime_range_start(raw?, delimiter), CRIME_DATE_TIME_FORMATS)
}

/// Returns the start of a crime date-time range.
#[must_use]
pub fn crime_range_start<'a>(raw: &'a str, delimiter: &str) -> &'a str {
    raw.split_once(delimiter).map_or(raw, |(start, _)| start)
}

/// Parses the time-of-day portion (everything after the date) of a raw
/// report timestamp.
///
/// The leading token must be shaped like a `M/D/Y` date (digits and
/// slashes) but need not be a valid calendar date.
#[must_use]
pub fn parse_time_of_day(raw: Option<&str>) -> Option<NaiveTime> {
    let (date, time) = raw?.trim().split_once(char::is_whitespace)?;
    if !is_date_shaped(date) {
        return None;
    }
    let time = time.trim();

    TIME_OF_DAY_FORMATS.iter().find_map(|fmt| {
        NaiveTime::parse_and_remainder(time, fmt)
            .ok()
            .map(|(t, _)| t)
    })
}

fn is_date_shaped(token: &str) -> bool {
    token.split('/').count() == 3
        && token
            .split('/')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_date_with(raw: &str, formats: &[&str]) -> Option<NaiveDate> {
    let text = expand_two_digit_year(raw.trim());
    let text = text.as_ref();
    if text.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_and_remainder(text, fmt)
                .ok()
                .map(|(dt, _)| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
}

/// Maps a two-digit year into the fixed window starting at
/// [`TWO_DIGIT_YEAR_PIVOT`].
#[must_use]
pub const fn expand_year(two_digit: i32) -> i32 {
    let candidate = TWO_DIGIT_YEAR_PIVOT / 100 * 100 + two_digit;
    if candidate < TWO_DIGIT_YEAR_PIVOT {
        candidate + 100
    } else {
        candidate
    }
}

/// Rewrites `M/D/YY ...` to `M/D/YYYY ...`. Years of any other width are
/// left alone and parse literally.
fn expand_two_digit_year(text: &str) -> Cow<'_, str> {
    let date_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let (date, rest) = text.split_at(date_end);

    let Some((month_day, year)) = date.rsplit_once('/') else {
        return Cow::Borrowed(text);
    };
    if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Cow::Borrowed(text);
    }
    let Ok(two_digit) = year.parse::<i32>() else {
        return Cow::Borrowed(text);
    };

    Cow::Owned(format!("{month_day}/{}{rest}", expand_year(two_digit)))
}
