//! Helper functions and utilities
//!
//! Calendar helpers (month keys, epoch milliseconds, local "today") and the
//! attendance token generator.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use crate::utils::errors::DashboardError;

/// Alphabet used for attendance tokens; O, I, 0 and 1 are left out
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A calendar month in `YYYY-MM` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, DashboardError> {
        if !(1..=12).contains(&month) {
            return Err(DashboardError::InvalidInput(format!("Invalid month: {}", month)));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `months` before this one
    pub fn minus_months(&self, months: u32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) - months as i32;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DashboardError::InvalidInput(format!("Invalid month key: {}", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Deserialize a present field as `Some`, so an explicit `null` becomes `Some(None)`
///
/// Pair with `#[serde(default)]` on `Option<Option<T>>` fields of partial updates:
/// a missing field leaves the column alone, `null` clears it.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current instant as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Month an epoch-millisecond instant falls into, seen from `tz`
pub fn month_key_of_millis<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<MonthKey> {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(MonthKey::from_date(utc.with_timezone(tz).date_naive()))
}

/// Generate a random attendance token of the given length
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_ALPHABET.len());
            TOKEN_ALPHABET[idx] as char
        })
        .collect()
}

/// Format an amount of rupiah with dot thousands separators
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}
