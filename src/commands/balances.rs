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

use crate::balance::{CascadeReport, current_balance, recalculate_from};
use crate::commands::{required, user_id};
use crate::config::Settings;
use crate::db::transactions;
use crate::errors;
use crate::month::YearMonth;
use crate::service;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("init", sub)) => {
            let r = service::initialize_balances(conn, settings, user_id(settings, sub))?;
            print_report(&r, settings);
        }
        Some(("recalc", sub)) => {
            let from = parse_month(required(sub, "from")?)?;
            let r = recalculate_from(conn, settings, user_id(settings, sub), from)?;
            print_report(&r, settings);
        }
        Some(("show", sub)) => show(conn, settings, sub)?,
        _ => {}
    }
    Ok(())
}

fn print_report(r: &CascadeReport, settings: &Settings) {
    match r.from {
        Some(from) => println!(
            "Opening balances {}..{}: {} created, {} updated, {} unchanged (closing {})",
            from,
            settings.horizon,
            r.created,
            r.updated,
            r.unchanged,
            fmt_money(r.closing_balance, &settings.labels.currency_symbol)
        ),
        None => println!("Nothing to recalculate before {}", settings.horizon),
    }
}

#[derive(Debug, Serialize)]
pub struct OpeningBalance {
    pub month: YearMonth,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
struct BalanceView {
    current: Decimal,
    openings: Vec<OpeningBalance>,
}

/// The stored opening balances of one user, oldest first.
pub fn opening_balances(conn: &Connection, user: i64) -> errors::Result<Vec<OpeningBalance>> {
    Ok(transactions::list(conn, user, None)?
        .into_iter()
        .filter(|t| t.is_opening_balance())
        .map(|t| OpeningBalance {
            month: YearMonth::of(&t.date),
            amount: t.signed_amount(),
        })
        .collect())
}

fn show(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let view = BalanceView {
        current: current_balance(conn, user, Utc::now())?,
        openings: opening_balances(conn, user)?,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    let sym = &settings.labels.currency_symbol;
    println!("Current balance: {}", fmt_money(view.current, sym));
    let rows = view
        .openings
        .iter()
        .map(|o| vec![o.month.to_string(), fmt_money(o.amount, sym)])
        .collect();
    println!("{}", pretty_table(&["Month", "Opening balance"], rows));
    Ok(())
}
