//! Date normalization for post timestamps
//!
//! Posts carry human-readable dates ("13 May 2008 at 10:02", "Yesterday at
//! 18:40", "5 hrs"). Relative forms are resolved against a reference time so
//! normalization stays a pure function of its input.

use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rendering used for every normalized timestamp; sorts chronologically as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Turns raw date text into a timestamp
pub trait DateNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> ParsingResult<NaiveDateTime>;
}

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s*(min|mins|minute|minutes|hr|hrs|hour|hours)$")
        .unwrap_or_else(|e| panic!("relative date pattern: {e}"))
});

/// Default normalizer built on chrono's format parsers
#[derive(Debug, Clone)]
pub struct ChronoDateNormalizer {
    reference: NaiveDateTime,
}

impl ChronoDateNormalizer {
    /// Relative dates resolve against the current local time
    pub fn new() -> Self {
        Self {
            reference: Local::now().naive_local(),
        }
    }

    pub const fn with_reference(reference: NaiveDateTime) -> Self {
        Self { reference }
    }

    fn parse_time(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%I:%M %p"))
            .ok()
    }

    fn parse_absolute(raw: &str) -> Option<NaiveDateTime> {
        ["%d %B %Y at %H:%M", "%B %d, %Y at %H:%M", "%B %d, %Y at %I:%M %p", "%d %B %Y"]
            .iter()
            .find_map(|format| {
                NaiveDateTime::parse_from_str(raw, format).ok().or_else(|| {
                    NaiveDate::parse_from_str(raw, format)
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
            })
    }

    fn parse_without_year(&self, raw: &str) -> Option<NaiveDateTime> {
        let (date_part, time_part) = raw.split_once(" at ")?;
        let time = Self::parse_time(time_part)?;
        let with_year = format!("{} {}", date_part.trim(), self.reference.year());
        ["%d %B %Y", "%B %d %Y"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&with_year, format).ok())
            .map(|date| date.and_time(time))
    }

    fn parse_relative(&self, raw: &str) -> Option<NaiveDateTime> {
        let lowered = raw.to_lowercase();
        if lowered == "just now" {
            return Some(self.reference);
        }

        if let Some((day, time_part)) = lowered.split_once(" at ") {
            let time = Self::parse_time(time_part)?;
            let date = match day.trim() {
                "today" => self.reference.date(),
                "yesterday" => self.reference.date() - Duration::days(1),
                _ => return None,
            };
            return Some(date.and_time(time));
        }

        let captures = RELATIVE.captures(&lowered)?;
        let amount: i64 = captures[1].parse().ok()?;
        let delta = if captures[2].starts_with('m') {
            Duration::try_minutes(amount)
        } else {
            Duration::try_hours(amount)
        }?;
        self.reference.checked_sub_signed(delta)
    }
}

impl Default for ChronoDateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateNormalizer for ChronoDateNormalizer {
    fn normalize(&self, raw: &str) -> ParsingResult<NaiveDateTime> {
        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            return Err(ParsingError::date_normalization_failed(raw, "empty date text"));
        }

        Self::parse_absolute(&cleaned)
            .or_else(|| self.parse_relative(&cleaned))
            .or_else(|| self.parse_without_year(&cleaned))
            .ok_or_else(|| ParsingError::date_normalization_failed(raw, "unrecognized date format"))
    }
}
