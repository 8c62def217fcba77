// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Billing-cycle calendar.
//!
//! A cycle is named by the month of its closing date. Days past the end of a
//! short month fall on that month's last day.

use chrono::NaiveDate;

use crate::month::YearMonth;

pub fn closing_date(cycle: YearMonth, closing_day: u32) -> NaiveDate {
    cycle.on_day(closing_day)
}

/// The due date trails closing into the next month when `due_day < closing_day`.
pub fn due_date(cycle: YearMonth, closing_day: u32, due_day: u32) -> NaiveDate {
    let due_month = if due_day < closing_day {
        cycle.next()
    } else {
        cycle
    };
    due_month.on_day(due_day)
}

/// The cycle still accepting spend on `today`: this month's while its closing
/// date has not passed, otherwise next month's.
pub fn active_cycle(closing_day: u32, today: NaiveDate) -> YearMonth {
    let this = YearMonth::of(&today);
    if today <= closing_date(this, closing_day) {
        this
    } else {
        this.next()
    }
}

/// Spend is locked once the closing date is behind us.
pub fn is_closed(cycle: YearMonth, closing_day: u32, today: NaiveDate) -> bool {
    today > closing_date(cycle, closing_day)
}

/// Inverse of [`due_date`] for rows keyed by due date.
pub fn cycle_of_due_date(due: NaiveDate, closing_day: u32, due_day: u32) -> YearMonth {
    let m = YearMonth::of(&due);
    if due_day < closing_day { m.prev() } else { m }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn active_cycle_includes_closing_day() {
        assert_eq!(active_cycle(15, d("2026-03-10")), ym("2026-03"));
        assert_eq!(active_cycle(15, d("2026-03-15")), ym("2026-03"));
        assert_eq!(active_cycle(15, d("2026-03-16")), ym("2026-04"));
        assert_eq!(active_cycle(20, d("2026-12-21")), ym("2027-01"));
    }

    #[test]
    fn short_month_closing_is_clamped() {
        assert_eq!(closing_date(ym("2026-02"), 31), d("2026-02-28"));
        assert_eq!(active_cycle(31, d("2026-02-28")), ym("2026-02"));
        assert_eq!(active_cycle(31, d("2026-03-01")), ym("2026-03"));
    }

    #[test]
    fn due_date_follows_closing_order() {
        assert_eq!(due_date(ym("2026-03"), 15, 25), d("2026-03-25"));
        assert_eq!(due_date(ym("2026-03"), 25, 5), d("2026-04-05"));
        assert_eq!(due_date(ym("2026-12"), 25, 5), d("2027-01-05"));
        assert_eq!(due_date(ym("2026-01"), 10, 31), d("2026-01-31"));
        assert_eq!(cycle_of_due_date(d("2027-01-05"), 25, 5), ym("2026-12"));
    }

    #[test]
    fn closed_after_closing_date_only() {
        assert!(!is_closed(ym("2026-03"), 15, d("2026-03-15")));
        assert!(is_closed(ym("2026-03"), 15, d("2026-03-16")));
        assert!(!is_closed(ym("2026-04"), 15, d("2026-03-16")));
    }
}
