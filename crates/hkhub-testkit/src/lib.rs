// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use hkhub_app::{Client, ClientBook, HousekeepingDetails, Interval, IntervalUnit};
use std::path::PathBuf;
use time::{Date, Duration, Month};

const REFERENCE_YEAR: i32 = 2023;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

/// Typical requests, used as-is by [`DetailsFaker::common_interval`].
const COMMON_INTERVALS: [(u32, u32, u32, u32); 8] = [
    (0, 0, 1, 0),
    (0, 0, 2, 0),
    (0, 1, 0, 0),
    (0, 3, 0, 0),
    (0, 6, 0, 0),
    (1, 0, 0, 0),
    (0, 0, 0, 10),
    (1, 6, 0, 0),
];

/// Boundaries of the `time::Date` range and the sign change at year 0000.
const EDGE_DATES: [(i32, Month, u8); 8] = [
    (-9999, Month::January, 1),
    (-9999, Month::January, 2),
    (-1, Month::December, 31),
    (0, Month::January, 1),
    (0, Month::February, 29),
    (1, Month::January, 1),
    (9999, Month::December, 30),
    (9999, Month::December, 31),
];

/// SplitMix64 stream.
#[derive(Debug, Clone)]
struct SplitMix {
    state: u64,
}

impl SplitMix {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform-ish index in `0..n`; zero when `n` is 0 or 1.
    fn below(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % n as u64) as usize
    }

    fn one_in(&mut self, n: u64) -> bool {
        self.next_u64() % n.max(1) == 0
    }
}

/// Seeded generator for housekeeping fixtures. The same seed always yields
/// the same sequence.
#[derive(Debug, Clone)]
pub struct DetailsFaker {
    rng: SplitMix,
    seed: u64,
}

impl DetailsFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: SplitMix::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.below(n)
    }

    pub fn date_in_year(&mut self, year: i32) -> Date {
        let start = calendar_date(year, Month::January, 1);
        let length = if time::util::is_leap_year(year) { 366 } else { 365 };
        start + Duration::days(self.int_n(length) as i64)
    }

    pub fn date_between_years(&mut self, first: i32, last: i32) -> Date {
        let year = self.int_range_u32(0, last.saturating_sub(first).max(0) as u32) as i32;
        self.date_in_year(first + year)
    }

    pub fn reference_date(&mut self) -> Date {
        self.date_in_year(REFERENCE_YEAR)
    }

    /// One to four non-zero components, each kept small.
    pub fn interval(&mut self) -> Interval {
        let mut parts = [0u32; 4];
        let first = self.int_n(parts.len());
        parts[first] = self.int_range_u32(1, 12);
        for part in &mut parts {
            if *part == 0 && self.rng.one_in(4) {
                *part = self.int_range_u32(1, 12);
            }
        }
        let [years, months, weeks, days] = parts;
        Interval::new(years, months, weeks, days).unwrap_or_else(fallback_interval)
    }

    pub fn common_interval(&mut self) -> Interval {
        let (years, months, weeks, days) = COMMON_INTERVALS[self.int_n(COMMON_INTERVALS.len())];
        Interval::new(years, months, weeks, days).unwrap_or_else(fallback_interval)
    }

    pub fn single_unit_interval(&mut self) -> (IntervalUnit, u32) {
        let unit = IntervalUnit::ALL[self.int_n(IntervalUnit::ALL.len())];
        (unit, self.int_range_u32(1, 30))
    }

    pub fn details(&mut self) -> HousekeepingDetails {
        let date = self.date_between_years(1990, 2040);
        let interval = self.interval();
        HousekeepingDetails::new(date, interval)
    }

    /// A date at or next to the ends of the calendar, or around year 0000.
    pub fn edge_date(&mut self) -> Date {
        let (year, month, day) = EDGE_DATES[self.int_n(EDGE_DATES.len())];
        calendar_date(year, month, day)
    }

    /// Details serviced on an [`edge_date`](Self::edge_date).
    pub fn edge_details(&mut self) -> HousekeepingDetails {
        let date = self.edge_date();
        let interval = self.interval();
        HousekeepingDetails::new(date, interval)
    }

    /// A `yyyy-mm-dd n unit` string accepted by the user grammar.
    pub fn user_input(&mut self) -> String {
        let date = self.reference_date();
        let (unit, amount) = self.single_unit_interval();
        format!("{date} {amount} {}", unit.plural())
    }

    pub fn client_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    pub fn client(&mut self) -> Client {
        let name = self.client_name();
        let details = if self.int_n(5) == 0 {
            None
        } else {
            Some(HousekeepingDetails::new(
                self.reference_date(),
                self.common_interval(),
            ))
        };
        Client::new(&name, details)
    }

    /// Up to `count` clients; generated names that collide are skipped.
    pub fn client_book(&mut self, count: usize) -> ClientBook {
        let mut book = ClientBook::new();
        for _ in 0..count {
            let client = self.client();
            if book.get(&client.name).is_none() {
                let _ = book.add(client);
            }
        }
        book
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.below(items.len())]
    }

    fn int_range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = u64::from(max - min) + 1;
        min + (self.rng.next_u64() % span) as u32
    }
}

pub fn temp_book_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let book_path = dir.path().join("clients.json");
    Ok((dir, book_path))
}

pub fn fixture_storage_details() -> &'static str {
    "2023-06-01 P1Y2M"
}

pub fn fixture_user_details() -> &'static str {
    "2023-06-01 3 months"
}

fn calendar_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid calendar date")
}

fn fallback_interval() -> Interval {
    Interval::of(IntervalUnit::Months, 1).expect("one month is non-zero")
}

#[cfg(test)]
mod tests {
    use super::{DetailsFaker, fixture_storage_details, fixture_user_details};
    use hkhub_app::HousekeepingDetails;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_sequence() {
        let mut left = DetailsFaker::new(42);
        let mut right = DetailsFaker::new(42);
        for _ in 0..50 {
            assert_eq!(left.details(), right.details());
        }
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(DetailsFaker::new(0).seed(), 1);
    }

    #[test]
    fn generated_details_are_storage_valid() {
        let mut faker = DetailsFaker::new(7);
        for _ in 0..200 {
            let text = faker.details().to_string();
            assert!(
                HousekeepingDetails::is_valid_storage_format(&text),
                "text={text}"
            );
        }
    }

    #[test]
    fn generated_user_input_is_user_valid() {
        let mut faker = DetailsFaker::new(11);
        for _ in 0..100 {
            let input = faker.user_input();
            assert!(
                HousekeepingDetails::is_valid_user_format(&input),
                "input={input}"
            );
        }
    }

    #[test]
    fn edge_details_are_storage_valid() {
        let mut faker = DetailsFaker::new(13);
        for _ in 0..100 {
            let details = faker.edge_details();
            let text = details.to_string();
            assert_eq!(
                HousekeepingDetails::parse_storage(&text),
                Ok(details),
                "text={text}"
            );
        }
    }

    #[test]
    fn dates_stay_in_requested_years() {
        let mut faker = DetailsFaker::new(3);
        for _ in 0..200 {
            let date = faker.date_between_years(2000, 2002);
            assert!((2000..=2002).contains(&date.year()), "date={date}");
        }
    }

    #[test]
    fn intervals_vary_across_draws() {
        let mut faker = DetailsFaker::new(9);
        let distinct = (0..100)
            .map(|_| faker.interval().to_string())
            .collect::<BTreeSet<_>>();
        assert!(distinct.len() >= 20, "got {}", distinct.len());
    }

    #[test]
    fn client_book_has_unique_names() {
        let mut faker = DetailsFaker::new(5);
        let book = faker.client_book(30);
        let names = book
            .clients()
            .iter()
            .map(|client| client.name.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(names.len(), book.len());
        assert!(!book.is_empty());
    }

    #[test]
    fn fixtures_are_valid() {
        assert!(HousekeepingDetails::is_valid_storage_format(
            fixture_storage_details()
        ));
        assert!(HousekeepingDetails::is_valid_user_format(
            fixture_user_details()
        ));
    }
}
