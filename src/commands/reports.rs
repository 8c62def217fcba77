// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::balance::PaidFilter;
use crate::commands::{optional, user_id};
use crate::config::Settings;
use crate::db::transactions;
use crate::errors;
use crate::models::Nature;
use crate::month::YearMonth;
use crate::utils::{maybe_print_json, parse_month, pretty_table};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("months", sub)) => months(conn, settings, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: YearMonth,
    pub opening: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    /// Income minus expense, opening balance excluded.
    pub net: Decimal,
    pub ending: Decimal,
}

/// Per-month totals over `from..=to`. The opening balance is reported on its
/// own line and kept out of `income`.
pub fn month_summaries(
    conn: &Connection,
    user: i64,
    from: YearMonth,
    to: YearMonth,
    filter: PaidFilter,
) -> errors::Result<Vec<MonthSummary>> {
    let mut out = Vec::new();
    for month in from.through(to) {
        let mut s = MonthSummary {
            month,
            opening: Decimal::ZERO,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            net: Decimal::ZERO,
            ending: Decimal::ZERO,
        };
        for t in transactions::list(conn, user, Some((month.start(), month.end())))? {
            if filter == PaidFilter::PaidOnly && !t.is_paid {
                continue;
            }
            if t.is_opening_balance() {
                s.opening += t.signed_amount();
            } else if t.nature == Nature::Income {
                s.income += t.amount;
            } else {
                s.expense += t.amount;
            }
        }
        s.net = s.income - s.expense;
        s.ending = s.opening + s.net;
        out.push(s);
    }
    Ok(out)
}

fn months(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let this = YearMonth::of(&Utc::now());
    let to = optional(sub, "to", parse_month)?.unwrap_or(this);
    let from = optional(sub, "from", parse_month)?.unwrap_or_else(|| settings.ledger_start.max(to.prev().prev()));
    let filter = if sub.get_flag("all") {
        PaidFilter::All
    } else {
        PaidFilter::PaidOnly
    };
    let data = month_summaries(conn, user_id(settings, sub), from, to, filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.month.to_string(),
                    format!("{:.2}", s.opening),
                    format!("{:.2}", s.income),
                    format!("{:.2}", s.expense),
                    format!("{:.2}", s.net),
                    format!("{:.2}", s.ending),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Opening", "Income", "Expense", "Net", "Ending"], rows)
        );
    }
    Ok(())
}
