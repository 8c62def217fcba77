// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar-month arithmetic in UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Error, Result};

/// Years accepted from user input and configuration. Stepping a few thousand
/// months past either end stays well inside chrono's ±262,143-year range,
/// which is what lets [`YearMonth::on_day`] stay infallible.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

pub fn check_year(year: i32) -> Result<()> {
    if !SUPPORTED_YEARS.contains(&year) {
        return Err(Error::validation(format!(
            "Year {} is outside {}..={}",
            year,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!("Invalid month number {}", month)));
        }
        check_year(year)?;
        Ok(YearMonth { year, month })
    }

    /// Unchecked constructor for literals.
    pub(crate) const fn at(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn of<T: Datelike>(d: &T) -> Self {
        YearMonth {
            year: d.year(),
            month: d.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            YearMonth {
                year: self.year - 1,
                month: 12,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days_in_month(self) -> u32 {
        match self.month {
            2 if is_leap(self.year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Day `day` of this month, clamped to the month's last day (31 in
    /// February lands on the 28th/29th).
    ///
    /// Months come from dates inside [`SUPPORTED_YEARS`] and are stepped a
    /// bounded number of times, so the date always exists in chrono's range.
    /// Should that ever not hold, the result saturates at chrono's bounds.
    pub fn on_day(self, day: u32) -> NaiveDate {
        let d = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, d).unwrap_or(if self.year < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
    }

    /// Day 1, 00:00:00.000 UTC.
    pub fn start(self) -> DateTime<Utc> {
        midnight(self.on_day(1))
    }

    /// Last day, 23:59:59.999 UTC.
    pub fn end(self) -> DateTime<Utc> {
        self.next().start() - chrono::Duration::milliseconds(1)
    }

    /// Inclusive iterator over `self..=last`. Empty when `last < self`.
    pub fn through(self, last: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), move |m| Some(m.next())).take_while(move |m| *m <= last)
    }
}

fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn midnight(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("Invalid month '{}', expected YYYY-MM", s)))?;
        YearMonth::new(d.year(), d.month())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_year_both_ways() {
        let dec = YearMonth::new(2026, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2027, 1).unwrap());
        assert_eq!(YearMonth::new(2026, 1).unwrap().prev(), YearMonth::new(2025, 12).unwrap());
    }

    #[test]
    fn month_boundaries_are_inclusive_millis() {
        let feb = YearMonth::new(2028, 2).unwrap();
        assert_eq!(feb.start().to_rfc3339(), "2028-02-01T00:00:00+00:00");
        assert_eq!(feb.end().timestamp_millis(), feb.next().start().timestamp_millis() - 1);
        assert_eq!(feb.days_in_month(), 29);
        assert_eq!(YearMonth::new(2100, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2026, 11).unwrap().days_in_month(), 30);
    }

    #[test]
    fn day_is_clamped_to_month_length() {
        let feb = YearMonth::new(2026, 2).unwrap();
        assert_eq!(feb.on_day(31).to_string(), "2026-02-28");
        assert_eq!(feb.on_day(15).to_string(), "2026-02-15");
    }

    #[test]
    fn through_is_inclusive_and_empty_when_reversed() {
        let from = YearMonth::new(2029, 11).unwrap();
        let to = YearMonth::new(2030, 2).unwrap();
        let months: Vec<String> = from.through(to).map(|m| m.to_string()).collect();
        assert_eq!(months, ["2029-11", "2029-12", "2030-01", "2030-02"]);
        assert_eq!(to.through(from).count(), 0);
    }

    #[test]
    fn parses_and_rejects() {
        assert_eq!("2026-03".parse::<YearMonth>().unwrap().to_string(), "2026-03");
        assert!(" 2026-3 ".parse::<YearMonth>().is_ok());
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn years_outside_the_supported_range_are_rejected() {
        assert!(YearMonth::new(0, 5).is_err());
        assert!(YearMonth::new(10000, 1).is_err());
        assert!(YearMonth::new(9999, 12).is_ok());
        assert!(check_year(2026).is_ok());
    }
}
