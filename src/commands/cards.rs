// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

use crate::commands::{optional, required, user_id};
use crate::config::Settings;
use crate::db::{cards, transactions};
use crate::invoice::project;
use crate::models::{CreditCardPatch, Division, NewCreditCard, SpendType};
use crate::service;
use crate::utils::{fmt_date, fmt_money, maybe_print_json, parse_day, parse_money, pretty_table};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, settings, sub)?,
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("update", sub)) => update(conn, settings, sub)?,
        Some(("rm", sub)) => {
            let user = user_id(settings, sub);
            let id = card_id(sub)?;
            let removed = service::delete_card(conn, user, id)?;
            println!("Deleted card {} ({} projected invoices removed)", id, removed);
        }
        Some(("set-total", sub)) => set_total(conn, settings, sub)?,
        Some(("project", sub)) => preview(conn, settings, sub)?,
        Some(("invoices", sub)) => invoices(conn, settings, sub)?,
        _ => {}
    }
    Ok(())
}

fn card_id(sub: &clap::ArgMatches) -> Result<i64> {
    sub.get_one::<i64>("id").copied().context("Missing card id")
}

/// Builds the insert request for `card add`.
pub fn new_card_from_args(user: i64, sub: &clap::ArgMatches) -> Result<NewCreditCard> {
    Ok(NewCreditCard {
        user_id: user,
        name: required(sub, "name")?.to_string(),
        brand: required(sub, "brand")?.to_string(),
        limit: parse_money(required(sub, "limit")?)?,
        closing_day: parse_day(required(sub, "closing-day")?)?,
        due_day: parse_day(required(sub, "due-day")?)?,
        recurring_amount: parse_money(required(sub, "recurring")?)?,
        expected_amount: parse_money(required(sub, "expected")?)?,
        division: optional(sub, "division", |s| s.parse::<Division>())?.unwrap_or(Division::Personal),
        r#type: optional(sub, "type", |s| s.parse::<SpendType>())?.unwrap_or(SpendType::Essential),
        is_shared: sub.get_flag("shared"),
        my_percentage: parse_money(required(sub, "my-percentage")?)?,
    })
}

fn add(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_card_from_args(user_id(settings, sub), sub)?;
    let (card, report) = service::create_card(conn, settings, &new, Utc::now())?;
    println!(
        "Added card #{} '{} {}' ({} invoices projected through {})",
        card.id, card.name, card.brand, report.created, settings.horizon
    );
    Ok(())
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let data = cards::list(conn, user_id(settings, sub))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let sym = &settings.labels.currency_symbol;
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    format!("{} {}", c.name, c.brand),
                    c.closing_day.to_string(),
                    c.due_day.to_string(),
                    fmt_money(c.expected_amount, sym),
                    fmt_money(c.current_total_amount, sym),
                    if c.is_shared {
                        format!("{}%", c.my_percentage.normalize())
                    } else {
                        "-".into()
                    },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Card", "Closing", "Due", "Expected", "Current", "Share"],
                rows
            )
        );
    }
    Ok(())
}

fn update(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let id = card_id(sub)?;
    let patch = CreditCardPatch {
        name: sub.get_one::<String>("name").cloned(),
        brand: sub.get_one::<String>("brand").cloned(),
        limit: optional(sub, "limit", parse_money)?,
        closing_day: optional(sub, "closing-day", parse_day)?,
        due_day: optional(sub, "due-day", parse_day)?,
        recurring_amount: optional(sub, "recurring", parse_money)?,
        expected_amount: optional(sub, "expected", parse_money)?,
        current_total_amount: None,
        division: optional(sub, "division", |s| s.parse::<Division>())?,
        r#type: optional(sub, "type", |s| s.parse::<SpendType>())?,
        is_shared: sub.get_one::<bool>("shared").copied(),
        my_percentage: optional(sub, "my-percentage", parse_money)?,
    };
    let (card, report) = service::update_card(conn, settings, user, id, &patch, Utc::now())?;
    match report {
        Some(r) => println!(
            "Updated card #{}: {} invoices created, {} updated, {} pruned",
            card.id, r.created, r.updated, r.pruned
        ),
        None => println!("Updated card #{}", card.id),
    }
    Ok(())
}

fn set_total(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let id = card_id(sub)?;
    let amount = parse_money(required(sub, "amount")?)?;
    let p = service::set_current_total(conn, settings, user, id, amount, Utc::now())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        println!(
            "Invoice due {} projected at {}",
            p.active_due_date,
            fmt_money(p.my_amount, &settings.labels.currency_symbol)
        );
    }
    Ok(())
}

fn preview(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let mut card = cards::get(conn, card_id(sub)?, user_id(settings, sub))?;
    if let Some(current) = optional(sub, "current", parse_money)? {
        card.current_total_amount = current;
    }
    let p = project(&card, Utc::now());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
        return Ok(());
    }
    let sym = &settings.labels.currency_symbol;
    let rows = vec![
        vec!["Cycle".into(), format!("{} .. {}", p.cycle_start, p.next_closing)],
        vec![
            "Days".into(),
            format!("{} of {}", p.days_since_closing, p.total_days_in_cycle),
        ],
        vec!["Variable".into(), fmt_money(p.variable_amount, sym)],
        vec!["Projected variable".into(), fmt_money(p.projected_variable, sym)],
        vec!["Raw projection".into(), fmt_money(p.raw_projection, sym)],
        vec!["Final (floored)".into(), fmt_money(p.final_amount, sym)],
        vec!["My amount".into(), fmt_money(p.my_amount, sym)],
        vec!["Due".into(), p.active_due_date.to_string()],
    ];
    println!("{}", pretty_table(&["", "Projection"], rows));
    Ok(())
}

fn invoices(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let card = cards::get(conn, card_id(sub)?, user)?;
    let data = transactions::list_projections(conn, user, card.id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    fmt_date(&t.date),
                    fmt_money(t.amount, &settings.labels.currency_symbol),
                    if t.is_paid { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Due", "Amount", "Paid"], rows));
    }
    Ok(())
}
