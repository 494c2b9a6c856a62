// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

use crate::interval::{Interval, IntervalUnit};

pub const MESSAGE_CONSTRAINTS: &str = "Housekeeping details should be in the format: \
     yyyy-mm-dd n (days|weeks|months|years) \
     where n is an integer quantity of days, weeks, months or years.";
pub const MESSAGE_CONSTRAINTS_STORAGE: &str = "Housekeeping details should be in the format: \
     yyyy-mm-dd P?Y?M?W?D? \
     where P is the period designator, Y is years, M is months, W is weeks and D is days. \
     YMWD must be in that order and at least one must be non-zero.";
pub const NO_DETAILS_PROVIDED: &str = "No housekeeping details provided";
pub const INVALID_DETAILS_FORMAT: &str = "Invalid housekeeping details format";
pub const INVALID_UNIT: &str = "Invalid unit";

/// The two textual dialects details can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsFormat {
    /// `yyyy-mm-dd n (days|weeks|months|years)`, typed by a person.
    User,
    /// `yyyy-mm-dd P[nY][nM][nW][nD]`, written to the client book.
    Storage,
}

impl DetailsFormat {
    pub const fn constraints(self) -> &'static str {
        match self {
            Self::User => MESSAGE_CONSTRAINTS,
            Self::Storage => MESSAGE_CONSTRAINTS_STORAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsError {
    /// The text does not match the grammar.
    MalformedInput(DetailsFormat),
    /// The text matches the grammar but the interval is zero.
    SemanticallyInvalid(DetailsFormat),
}

impl DetailsError {
    pub const fn format(self) -> DetailsFormat {
        match self {
            Self::MalformedInput(format) | Self::SemanticallyInvalid(format) => format,
        }
    }

    pub const fn constraints(self) -> &'static str {
        self.format().constraints()
    }
}

impl fmt::Display for DetailsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constraints())
    }
}

impl std::error::Error for DetailsError {}

/// When a client was last serviced and how often they want the service.
///
/// Equality is structural: `P2W` and `P14D` are different values. Ordering is
/// only available through [`HousekeepingDetails::cmp_next_due`], under which
/// those two compare equal when they share a last service date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HousekeepingDetails {
    last_service_date: Date,
    preferred_interval: Interval,
}

impl HousekeepingDetails {
    pub const fn new(last_service_date: Date, preferred_interval: Interval) -> Self {
        Self {
            last_service_date,
            preferred_interval,
        }
    }

    /// Parses the storage form, for example `2023-06-01 P1Y2M`.
    pub fn parse_storage(details: &str) -> Result<Self, DetailsError> {
        let malformed = DetailsError::MalformedInput(DetailsFormat::Storage);
        let (date, interval) = details.split_once(' ').ok_or(malformed)?;
        let date = parse_date(date).ok_or(malformed)?;
        let interval = Interval::parse_compact(interval)?;
        Ok(Self::new(date, interval))
    }

    /// Parses the user form, for example `2023-06-01 3 months`.
    pub fn parse_user(details: &str) -> Result<Self, DetailsError> {
        let malformed = DetailsError::MalformedInput(DetailsFormat::User);
        let mut tokens = details.split(' ');
        let (Some(date), Some(quantity), Some(unit), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(malformed);
        };

        let date = parse_date(date).ok_or(malformed)?;
        if !is_ascii_digits(quantity) {
            return Err(malformed);
        }
        let amount = quantity.parse::<u32>().map_err(|_| malformed)?;
        let unit = IntervalUnit::from_plural(unit).ok_or(malformed)?;
        let interval = Interval::of(unit, amount)
            .ok_or(DetailsError::SemanticallyInvalid(DetailsFormat::User))?;
        Ok(Self::new(date, interval))
    }

    pub fn is_valid_user_format(details: &str) -> bool {
        Self::parse_user(details).is_ok()
    }

    pub fn is_valid_storage_format(details: &str) -> bool {
        Self::parse_storage(details).is_ok()
    }

    pub const fn last_service_date(&self) -> Date {
        self.last_service_date
    }

    pub const fn preferred_interval(&self) -> Interval {
        self.preferred_interval
    }

    /// Same interval, restarted from a new service date.
    pub const fn serviced_on(&self, date: Date) -> Self {
        Self::new(date, self.preferred_interval)
    }

    /// Saturates at `Date::MAX` if the interval runs past the calendar.
    pub fn next_due_date(&self) -> Date {
        self.preferred_interval
            .add_to(self.last_service_date)
            .unwrap_or(Date::MAX)
    }

    pub fn cmp_next_due(&self, other: &Self) -> Ordering {
        self.next_due_date().cmp(&other.next_due_date())
    }

    /// Formats a raw storage string for display. Never fails: missing or
    /// invalid input yields a fixed message, and an unknown unit letter
    /// yields [`INVALID_UNIT`] in place of the unit word.
    pub fn render_human_readable(details: Option<&str>) -> String {
        let Some(details) = details else {
            return NO_DETAILS_PROVIDED.to_owned();
        };
        if !Self::is_valid_storage_format(details) {
            return INVALID_DETAILS_FORMAT.to_owned();
        }
        let Some((date, period)) = details.split_once(' ') else {
            return INVALID_DETAILS_FORMAT.to_owned();
        };

        let body = period.strip_prefix('P').unwrap_or(period);
        let mut parts = Vec::new();
        let mut start = 0usize;
        for (index, ch) in body.char_indices() {
            if ch.is_ascii_digit() {
                continue;
            }
            let amount = &body[start..index];
            start = index + ch.len_utf8();
            // `P0Y1D` is valid input, but zero components are never shown.
            if amount.bytes().all(|byte| byte == b'0') {
                continue;
            }
            let unit = IntervalUnit::from_letter(ch).map_or(INVALID_UNIT, IntervalUnit::plural);
            parts.push(format!("{amount} {unit}"));
        }

        format!(
            "Last housekeeping date: {date}\nPreferred interval: {}",
            parts.join(", ")
        )
    }
}

impl fmt::Display for HousekeepingDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = format_date(self.last_service_date).ok_or(fmt::Error)?;
        write!(f, "{date} {}", self.preferred_interval)
    }
}

impl FromStr for HousekeepingDetails {
    type Err = DetailsError;

    fn from_str(details: &str) -> Result<Self, Self::Err> {
        Self::parse_storage(details)
    }
}

/// Strict `dddd-dd-dd` calendar date. Years before 0000 carry a leading
/// `-`, exactly as [`format_date`] writes them, so every `Date` round-trips.
pub fn parse_date(input: &str) -> Option<Date> {
    let bytes = input.strip_prefix('-').unwrap_or(input).as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    let date = Date::parse(input, &format_description!("[year]-[month]-[day]")).ok()?;
    // Rejects `-0000-..`, which parses but is never written.
    (format_date(date)?.as_str() == input).then_some(date)
}

/// Canonical `yyyy-mm-dd` text, signed for years before 0000.
pub fn format_date(date: Date) -> Option<String> {
    date.format(&format_description!("[year]-[month]-[day]")).ok()
}

fn is_ascii_digits(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|byte| byte.is_ascii_digit())
}
