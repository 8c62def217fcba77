// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-end invoice projection from partial-cycle spend.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::invoice::cycle::{active_cycle, closing_date, due_date};
use crate::models::CreditCard;
use crate::month::YearMonth;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub variable_amount: Decimal,
    pub projected_variable: Decimal,
    /// Run-rate extrapolation plus the recurring charge, before the floor.
    pub raw_projection: Decimal,
    /// `max(raw_projection, expected_amount)`.
    pub final_amount: Decimal,
    /// The user's share of `final_amount`.
    pub my_amount: Decimal,
    pub days_since_closing: i64,
    pub total_days_in_cycle: i64,
    pub cycle_start: NaiveDate,
    pub next_closing: NaiveDate,
    pub next_due_date: NaiveDate,
    /// Due date of the cycle still open for spend. On a closing day this is
    /// the cycle closing that day, one before `next_due_date`.
    pub active_due_date: NaiveDate,
}

/// The user's part of an invoice total on a shared card.
pub fn my_share(card: &CreditCard, total: Decimal) -> Decimal {
    if card.is_shared {
        total * card.my_percentage / Decimal::ONE_HUNDRED
    } else {
        total
    }
}

/// Projects the invoice of the cycle running at `now`. Nothing is rounded
/// here; callers round when they write an amount.
pub fn project(card: &CreditCard, now: DateTime<Utc>) -> Projection {
    let today = now.date_naive();
    let this = YearMonth::of(&today);
    // Most recent closing at or before today.
    let start_cycle = if closing_date(this, card.closing_day) <= today {
        this
    } else {
        this.prev()
    };
    let cycle_start = closing_date(start_cycle, card.closing_day);
    let next_cycle = start_cycle.next();
    let next_closing = closing_date(next_cycle, card.closing_day);

    let days_since_closing = (today - cycle_start).num_days();
    let total_days_in_cycle = (next_closing - cycle_start).num_days();

    let variable_amount = card.current_total_amount - card.recurring_amount;
    let projected_variable = if days_since_closing > 0 {
        variable_amount / Decimal::from(days_since_closing) * Decimal::from(total_days_in_cycle)
    } else {
        variable_amount
    };
    let raw_projection = projected_variable + card.recurring_amount;
    let final_amount = raw_projection.max(card.expected_amount);
    let my_amount = my_share(card, final_amount);

    Projection {
        variable_amount,
        projected_variable,
        raw_projection,
        final_amount,
        my_amount,
        days_since_closing,
        total_days_in_cycle,
        cycle_start,
        next_closing,
        next_due_date: due_date(next_cycle, card.closing_day, card.due_day),
        active_due_date: due_date(
            active_cycle(card.closing_day, today),
            card.closing_day,
            card.due_day,
        ),
    }
}
