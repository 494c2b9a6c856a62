// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::str::FromStr;
use time::{Date, Duration, Month};

use crate::details::{DetailsError, DetailsFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Years,
    Months,
    Weeks,
    Days,
}

impl IntervalUnit {
    /// Units in the order they must appear in a compact period token.
    pub const ALL: [Self; 4] = [Self::Years, Self::Months, Self::Weeks, Self::Days];

    pub const fn letter(self) -> char {
        match self {
            Self::Years => 'Y',
            Self::Months => 'M',
            Self::Weeks => 'W',
            Self::Days => 'D',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'Y' => Some(Self::Years),
            'M' => Some(Self::Months),
            'W' => Some(Self::Weeks),
            'D' => Some(Self::Days),
            _ => None,
        }
    }

    pub const fn plural(self) -> &'static str {
        match self {
            Self::Years => "years",
            Self::Months => "months",
            Self::Weeks => "weeks",
            Self::Days => "days",
        }
    }

    pub fn from_plural(word: &str) -> Option<Self> {
        match word {
            "years" => Some(Self::Years),
            "months" => Some(Self::Months),
            "weeks" => Some(Self::Weeks),
            "days" => Some(Self::Days),
            _ => None,
        }
    }

    const fn rank(self) -> usize {
        match self {
            Self::Years => 0,
            Self::Months => 1,
            Self::Weeks => 2,
            Self::Days => 3,
        }
    }
}

/// A preferred time between services, kept as four independent calendar
/// components. At least one component is always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
}

impl Interval {
    pub fn new(years: u32, months: u32, weeks: u32, days: u32) -> Option<Self> {
        if years == 0 && months == 0 && weeks == 0 && days == 0 {
            return None;
        }
        Some(Self {
            years,
            months,
            weeks,
            days,
        })
    }

    pub fn of(unit: IntervalUnit, amount: u32) -> Option<Self> {
        match unit {
            IntervalUnit::Years => Self::new(amount, 0, 0, 0),
            IntervalUnit::Months => Self::new(0, amount, 0, 0),
            IntervalUnit::Weeks => Self::new(0, 0, amount, 0),
            IntervalUnit::Days => Self::new(0, 0, 0, amount),
        }
    }

    pub const fn years(self) -> u32 {
        self.years
    }

    pub const fn months(self) -> u32 {
        self.months
    }

    pub const fn weeks(self) -> u32 {
        self.weeks
    }

    pub const fn days(self) -> u32 {
        self.days
    }

    pub const fn component(self, unit: IntervalUnit) -> u32 {
        match unit {
            IntervalUnit::Years => self.years,
            IntervalUnit::Months => self.months,
            IntervalUnit::Weeks => self.weeks,
            IntervalUnit::Days => self.days,
        }
    }

    /// Non-zero components in token order.
    pub fn components(self) -> impl Iterator<Item = (IntervalUnit, u32)> {
        IntervalUnit::ALL
            .into_iter()
            .map(move |unit| (unit, self.component(unit)))
            .filter(|(_, amount)| *amount > 0)
    }

    /// Parses a compact period token such as `P1Y2M` or `P3W`.
    pub fn parse_compact(token: &str) -> Result<Self, DetailsError> {
        let malformed = DetailsError::MalformedInput(DetailsFormat::Storage);
        let body = token.strip_prefix('P').ok_or(malformed)?;
        let bytes = body.as_bytes();

        let mut parts = [0u32; 4];
        let mut next_rank = 0usize;
        let mut index = 0usize;
        while index < bytes.len() {
            let start = index;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
            if index == start || index >= bytes.len() {
                return Err(malformed);
            }
            let unit = IntervalUnit::from_letter(char::from(bytes[index])).ok_or(malformed)?;
            if unit.rank() < next_rank {
                return Err(malformed);
            }
            parts[unit.rank()] = body[start..index].parse().map_err(|_| malformed)?;
            next_rank = unit.rank() + 1;
            index += 1;
        }

        if next_rank == 0 {
            return Err(malformed);
        }
        let [years, months, weeks, days] = parts;
        Self::new(years, months, weeks, days)
            .ok_or(DetailsError::SemanticallyInvalid(DetailsFormat::Storage))
    }

    /// Advances `date` by years, then months, then weeks, then days. Year and
    /// month steps clamp to the last day of the target month. Returns `None`
    /// when the result leaves the representable date range.
    pub fn add_to(self, date: Date) -> Option<Date> {
        let date = add_months(date, i64::from(self.years) * 12)?;
        let date = add_months(date, i64::from(self.months))?;
        let days = i64::from(self.weeks) * 7 + i64::from(self.days);
        date.checked_add(Duration::days(days))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        for (unit, amount) in self.components() {
            write!(f, "{amount}{}", unit.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Interval {
    type Err = DetailsError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::parse_compact(token)
    }
}

pub fn add_months(date: Date, months: i64) -> Option<Date> {
    let total_month = i64::from(date.month() as u8) - 1 + months;
    let year = i32::try_from(i64::from(date.year()) + total_month.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(total_month.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(last_day_of_month(year, month)?);
    Date::from_calendar_date(year, month, day).ok()
}

fn last_day_of_month(year: i32, month: Month) -> Option<u8> {
    let (next_year, next_month) = if month == Month::December {
        (year.checked_add(1)?, Month::January)
    } else {
        (year, month.next())
    };
    match Date::from_calendar_date(next_year, next_month, 1) {
        Ok(first_next) => first_next.previous_day().map(Date::day),
        // December of the last representable year.
        Err(_) => Some(31),
    }
}
