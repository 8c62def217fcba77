// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;

use crate::commands::{optional, required, user_id};
use crate::config::Settings;
use crate::db::{categories, transactions as store};
use crate::models::{Division, Nature, NewTransaction, SpendType, Transaction, TransactionPatch};
use crate::service::{self, TransactionInput};
use crate::utils::{fmt_date, maybe_print_json, parse_date, parse_money, parse_month, pretty_table};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, settings, sub)?,
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("update", sub)) => update(conn, settings, sub)?,
        Some(("rm", sub)) => {
            let user = user_id(settings, sub);
            let id = *sub.get_one::<i64>("id").context("Missing transaction id")?;
            service::delete_transaction(conn, settings, user, id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn category_id(conn: &Connection, user: i64, name: Option<&String>) -> Result<Option<i64>> {
    match name {
        None => Ok(None),
        Some(name) => match categories::id_for_name(conn, user, name)? {
            Some(id) => Ok(Some(id)),
            None => bail!("Unknown category '{}'", name),
        },
    }
}

/// Builds the insert request for `tx add` without touching the ledger.
pub fn input_from_args(conn: &Connection, user: i64, sub: &clap::ArgMatches) -> Result<TransactionInput> {
    let mut tx = NewTransaction::user(
        user,
        required(sub, "description")?,
        parse_money(required(sub, "amount")?)?,
        required(sub, "nature")?.parse::<Nature>()?,
        parse_date(required(sub, "date")?)?,
    );
    tx.division = optional(sub, "division", |s| s.parse::<Division>())?;
    tx.r#type = optional(sub, "type", |s| s.parse::<SpendType>())?;
    tx.category_id = category_id(conn, user, sub.get_one::<String>("category"))?;
    tx.is_paid = !sub.get_flag("unpaid");
    tx.notes = sub.get_one::<String>("note").cloned();
    Ok(TransactionInput {
        tx,
        installments: sub.get_one::<u32>("installments").copied(),
    })
}

fn add(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let input = input_from_args(conn, user, sub)?;
    let created = service::create_transaction(conn, settings, input)?;
    for t in &created {
        println!(
            "Recorded #{} {} {} on {} ('{}')",
            t.id,
            t.nature,
            t.amount,
            fmt_date(&t.date),
            t.description
        );
    }
    Ok(())
}

fn update(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(settings, sub);
    let id = *sub.get_one::<i64>("id").context("Missing transaction id")?;
    let patch = TransactionPatch {
        description: sub.get_one::<String>("description").cloned(),
        amount: optional(sub, "amount", parse_money)?,
        nature: optional(sub, "nature", |s| s.parse::<Nature>())?,
        date: optional(sub, "date", parse_date)?,
        division: optional(sub, "division", |s| s.parse::<Division>())?,
        r#type: optional(sub, "type", |s| s.parse::<SpendType>())?,
        category_id: category_id(conn, user, sub.get_one::<String>("category"))?,
        is_paid: sub.get_one::<bool>("paid").copied(),
        notes: sub.get_one::<String>("note").cloned(),
    };
    if patch.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }
    let t = service::update_transaction(conn, settings, user, id, &patch)?;
    println!("Updated #{} ({} {} on {})", t.id, t.nature, t.amount, fmt_date(&t.date));
    Ok(())
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, user_id(settings, sub), sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.description.clone(),
                    r.nature.clone(),
                    r.amount.clone(),
                    if r.paid { "yes".into() } else { "no".into() },
                    r.kind.clone(),
                    r.notes.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Nature", "Amount", "Paid", "Kind", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub nature: String,
    pub amount: String,
    pub paid: bool,
    pub kind: String,
    pub notes: String,
}

impl From<Transaction> for TransactionRow {
    fn from(t: Transaction) -> Self {
        TransactionRow {
            id: t.id,
            date: fmt_date(&t.date),
            nature: t.nature.to_string(),
            amount: format!("{:.2}", t.amount),
            paid: t.is_paid,
            kind: t
                .system_kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "user".into()),
            notes: t.notes.unwrap_or_default(),
            description: t.description,
        }
    }
}

/// Newest first; `--month`, `--system` and `--limit` narrow the list.
pub fn query_rows(conn: &Connection, user: i64, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let range = optional(sub, "month", parse_month)?.map(|m| (m.start(), m.end()));
    let system_only = sub.get_flag("system");
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let mut txs = store::list(conn, user, range)?;
    txs.reverse();
    Ok(txs
        .into_iter()
        .filter(|t| !system_only || t.is_system_generated)
        .take(limit)
        .map(TransactionRow::from)
        .collect())
}
