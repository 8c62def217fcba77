// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result as AnyResult;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{Error, Result};
use crate::month::{YearMonth, check_year, midnight};

/// Amounts fit `decimal(15,2)`: anything from 10^13 up is refused.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1316134912, 2328, 0, false, 0);

pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    let d = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))?;
    check_year(d.year())?;
    Ok(midnight(d))
}

pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.parse()
}

/// Non-negative amount with at most two decimal places.
pub fn parse_money(s: &str) -> Result<Decimal> {
    let s = s.trim();
    let d = s
        .parse::<Decimal>()
        .map_err(|_| Error::validation(format!("Invalid amount '{}'", s)))?;
    check_money(d)?;
    Ok(d)
}

pub fn check_money(d: Decimal) -> Result<()> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(Error::validation(format!("Amount {} must not be negative", d)));
    }
    if d >= MAX_MONEY {
        return Err(Error::validation(format!(
            "Amount {} is too large, the limit is {}",
            d,
            MAX_MONEY - Decimal::new(1, 2)
        )));
    }
    if d.normalize().scale() > 2 {
        return Err(Error::validation(format!(
            "Amount {} has more than two decimal places",
            d
        )));
    }
    Ok(())
}

pub fn check_percentage(d: Decimal) -> Result<()> {
    if d < Decimal::ZERO || d > Decimal::ONE_HUNDRED {
        return Err(Error::validation(format!(
            "Percentage {} must be between 0 and 100",
            d
        )));
    }
    Ok(())
}

pub fn check_day(day: u32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(Error::validation(format!(
            "Day of month {} must be between 1 and 31",
            day
        )));
    }
    Ok(())
}

pub fn parse_day(s: &str) -> Result<u32> {
    let s = s.trim();
    let day = s
        .parse::<u32>()
        .map_err(|_| Error::validation(format!("Invalid day of month '{}'", s)))?;
    check_day(day)?;
    Ok(day)
}

/// Rounds half away from zero, like the two-decimal amounts users type.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn money_text(d: Decimal) -> String {
    format!("{:.2}", round_money(d))
}

pub fn decimal_from_db(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| Error::Corrupt(format!("Invalid {} '{}'", what, s)))
}

pub fn fmt_money(d: Decimal, symbol: &str) -> String {
    format!("{} {}", symbol, money_text(d))
}

pub fn fmt_date(d: &DateTime<Utc>) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> AnyResult<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rejects_negative_and_extra_precision() {
        assert!(parse_money("12.50").is_ok());
        assert!(parse_money(" 7 ").is_ok());
        assert!(parse_money("12.500").is_ok());
        assert!(parse_money("-1.00").is_err());
        assert!(parse_money("1.234").is_err());
        assert!(parse_money("abc").is_err());
    }

    #[test]
    fn money_is_capped_below_ten_trillion() {
        assert_eq!(MAX_MONEY, Decimal::from(10_000_000_000_000_i64));
        assert!(parse_money("9999999999999.99").is_ok());
        assert!(parse_money("10000000000000").is_err());
        assert!(parse_money("79228162514264337593543950335").is_err());
    }

    #[test]
    fn dates_outside_supported_years_are_rejected() {
        assert!(parse_date("2026-02-28").is_ok());
        assert!(parse_date("0000-01-01").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(money_text("2.345".parse().unwrap()), "2.35");
        assert_eq!(money_text("-2.345".parse().unwrap()), "-2.35");
        assert_eq!(money_text(Decimal::from(100)), "100.00");
    }

    #[test]
    fn day_and_percentage_ranges() {
        assert!(parse_day("31").is_ok());
        assert!(parse_day("0").is_err());
        assert!(parse_day("32").is_err());
        assert!(check_percentage(Decimal::from(40)).is_ok());
        assert!(check_percentage(Decimal::from(101)).is_err());
    }
}
