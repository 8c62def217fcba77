// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::transactions;
use crate::errors::Result;
use crate::month::{YearMonth, midnight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaidFilter {
    PaidOnly,
    All,
}

/// Net of a calendar month (income minus expense) over its UTC boundaries.
/// A month without rows nets to zero.
pub fn month_end_delta(
    conn: &Connection,
    user_id: i64,
    month: YearMonth,
    filter: PaidFilter,
) -> Result<Decimal> {
    transactions::sum_net(
        conn,
        user_id,
        month.start(),
        month.end(),
        filter == PaidFilter::PaidOnly,
    )
}

/// Balance at the end of `now`'s day: the month's opening balance plus every
/// paid movement dated from the first of the month up to today.
pub fn current_balance(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<Decimal> {
    let end_of_day = midnight(now.date_naive()) + chrono::Duration::days(1)
        - chrono::Duration::milliseconds(1);
    transactions::sum_net(
        conn,
        user_id,
        YearMonth::of(&now).start(),
        end_of_day,
        true,
    )
}
