use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

pub const MINUTES_PER_DAY: i64 = 1440;

/// Absolute schedule time in minutes since 1970-01-01 00:00.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, Hash, Serialize, Deserialize, PartialOrd)]
pub struct Time(pub i64);

impl Time {
    fn epoch() -> NaiveDate {
        NaiveDate::default()
    }

    /// `minutes` may run past midnight (or be negative) and carries into the
    /// neighbouring days.
    pub fn at(date: NaiveDate, minutes: i64) -> Time {
        let days = date.signed_duration_since(Self::epoch()).num_days();
        Time(days * MINUTES_PER_DAY + minutes)
    }

    pub fn date(self) -> NaiveDate {
        let days = self.0.div_euclid(MINUTES_PER_DAY);
        Self::epoch() + chrono::Duration::days(days)
    }

    pub fn minute_of_day(self) -> i64 {
        self.0.rem_euclid(MINUTES_PER_DAY)
    }

    /// ISO weekday of the calendar day this instant falls on, Monday = 1.
    pub fn iso_weekday(self) -> u32 {
        self.date().weekday().number_from_monday()
    }

    pub(crate) fn is_overlapping(time: &(Time, Time), window: &(Time, Time)) -> bool {
        time.0 < window.1 && time.1 > window.0
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let remaining = self.minute_of_day();
        let hours = remaining / 60;
        let mins = remaining % 60;
        write!(f, "{} {:02}:{:02}", self.date(), hours, mins)
    }
}

impl Add<i64> for Time {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        Time(self.0 + rhs)
    }
}

impl Sub<i64> for Time {
    type Output = Self;

    fn sub(self, rhs: i64) -> Self::Output {
        Time(self.0 - rhs)
    }
}

impl Sub<Time> for Time {
    type Output = i64;

    fn sub(self, rhs: Time) -> Self::Output {
        self.0 - rhs.0
    }
}

impl AddAssign<i64> for Time {
    fn add_assign(&mut self, rhs: i64) {
        self.0 += rhs;
    }
}
