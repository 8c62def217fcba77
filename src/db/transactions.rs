// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: the `transactions` table.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use rust_decimal::Decimal;

use crate::errors::{Error, Result};
use crate::models::{NewTransaction, SystemKind, Transaction, TransactionPatch};
use crate::utils::{decimal_from_db, money_text};

const COLUMNS: &str = "id, user_id, description, amount, nature, date_ms, division, type, \
     category_id, is_paid, is_system_generated, system_kind, source_card_id, notes";

struct TransactionRow {
    id: i64,
    user_id: i64,
    description: String,
    amount: String,
    nature: String,
    date_ms: i64,
    division: Option<String>,
    r#type: Option<String>,
    category_id: Option<i64>,
    is_paid: bool,
    is_system_generated: bool,
    system_kind: Option<String>,
    source_card_id: Option<i64>,
    notes: Option<String>,
}

fn read_row(r: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        description: r.get(2)?,
        amount: r.get(3)?,
        nature: r.get(4)?,
        date_ms: r.get(5)?,
        division: r.get(6)?,
        r#type: r.get(7)?,
        category_id: r.get(8)?,
        is_paid: r.get(9)?,
        is_system_generated: r.get(10)?,
        system_kind: r.get(11)?,
        source_card_id: r.get(12)?,
        notes: r.get(13)?,
    })
}

fn corrupt<T, E>(res: std::result::Result<T, E>, what: &str, id: i64) -> Result<T> {
    res.map_err(|_| Error::Corrupt(format!("{} of transaction {}", what, id)))
}

impl TransactionRow {
    fn into_model(self) -> Result<Transaction> {
        let id = self.id;
        Ok(Transaction {
            id,
            user_id: self.user_id,
            description: self.description,
            amount: decimal_from_db(&self.amount, "amount")?,
            nature: corrupt(self.nature.parse(), "nature", id)?,
            date: from_millis(self.date_ms)?,
            division: corrupt(self.division.map(|s| s.parse()).transpose(), "division", id)?,
            r#type: corrupt(self.r#type.map(|s| s.parse()).transpose(), "type", id)?,
            category_id: self.category_id,
            is_paid: self.is_paid,
            is_system_generated: self.is_system_generated,
            system_kind: corrupt(
                self.system_kind.map(|s| s.parse()).transpose(),
                "system_kind",
                id,
            )?,
            source_card_id: self.source_card_id,
            notes: self.notes,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| Error::Corrupt(format!("Invalid timestamp {}", ms)))
}

fn collect(rows: impl Iterator<Item = rusqlite::Result<TransactionRow>>) -> Result<Vec<Transaction>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_model()?);
    }
    Ok(out)
}

pub fn insert(conn: &Connection, t: &NewTransaction) -> Result<Transaction> {
    conn.execute(
        "INSERT INTO transactions(user_id, description, amount, nature, date_ms, division, type,
            category_id, is_paid, is_system_generated, system_kind, source_card_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            t.user_id,
            t.description,
            money_text(t.amount),
            t.nature.as_str(),
            t.date.timestamp_millis(),
            t.division.map(|d| d.as_str()),
            t.r#type.map(|k| k.as_str()),
            t.category_id,
            t.is_paid,
            t.is_system_generated,
            t.system_kind.map(|k| k.as_str()),
            t.source_card_id,
            t.notes,
        ],
    )?;
    get(conn, conn.last_insert_rowid(), t.user_id)
}

/// Fetches a transaction owned by `user_id`; someone else's row is `NotFound`.
pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1 AND user_id=?2", COLUMNS);
    let row = conn
        .query_row(&sql, params![id, user_id], read_row)
        .optional()?;
    match row {
        Some(r) => r.into_model(),
        None => Err(Error::not_found("Transaction", id)),
    }
}

pub fn update(conn: &Connection, id: i64, user_id: i64, patch: &TransactionPatch) -> Result<()> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(v) = &patch.description {
        sets.push("description=?");
        values.push(Box::new(v.clone()));
    }
    if let Some(v) = patch.amount {
        sets.push("amount=?");
        values.push(Box::new(money_text(v)));
    }
    if let Some(v) = patch.nature {
        sets.push("nature=?");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.date {
        sets.push("date_ms=?");
        values.push(Box::new(v.timestamp_millis()));
    }
    if let Some(v) = patch.division {
        sets.push("division=?");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.r#type {
        sets.push("type=?");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.category_id {
        sets.push("category_id=?");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.is_paid {
        sets.push("is_paid=?");
        values.push(Box::new(v));
    }
    if let Some(v) = &patch.notes {
        sets.push("notes=?");
        values.push(Box::new(v.clone()));
    }
    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "UPDATE transactions SET {} WHERE id=? AND user_id=?",
        sets.join(", ")
    );
    values.push(Box::new(id));
    values.push(Box::new(user_id));
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(Error::not_found("Transaction", id));
    }
    Ok(())
}

/// Amount-only write used by the balance cascade.
pub fn set_amount(conn: &Connection, id: i64, amount: Decimal) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET amount=?1 WHERE id=?2",
        params![money_text(amount), id],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(Error::not_found("Transaction", id));
    }
    Ok(())
}

/// All of a user's transactions, optionally within `[from, to]`, oldest first.
pub fn list(
    conn: &Connection,
    user_id: i64,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<Vec<Transaction>> {
    let (from, to) = match range {
        Some((a, b)) => (Some(a.timestamp_millis()), Some(b.timestamp_millis())),
        None => (None, None),
    };
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM transactions
         WHERE user_id=?1 AND (?2 IS NULL OR date_ms BETWEEN ?2 AND ?3)
         ORDER BY date_ms, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id, from, to], read_row)?;
    collect(rows)
}

/// Income minus expense over `[from, to]`, optionally restricted to paid rows.
pub fn sum_net(
    conn: &Connection,
    user_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    paid_only: bool,
) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT amount, nature FROM transactions
         WHERE user_id=?1 AND date_ms BETWEEN ?2 AND ?3 AND (?4 = 0 OR is_paid = 1)",
    )?;
    let mut rows = stmt.query(params![
        user_id,
        from.timestamp_millis(),
        to.timestamp_millis(),
        paid_only
    ])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let amount: String = r.get(0)?;
        let nature: String = r.get(1)?;
        let value = decimal_from_db(&amount, "amount")?;
        match nature.as_str() {
            "income" => total += value,
            "expense" => total -= value,
            other => return Err(Error::Corrupt(format!("Invalid nature '{}'", other))),
        }
    }
    Ok(total)
}

/// The synthetic row of `kind` at exactly `date`, scoped to `card_id` for projections.
pub fn find_system(
    conn: &Connection,
    user_id: i64,
    kind: SystemKind,
    date: DateTime<Utc>,
    card_id: Option<i64>,
) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions
         WHERE user_id=?1 AND system_kind=?2 AND date_ms=?3 AND source_card_id IS ?4
         LIMIT 1",
        COLUMNS
    );
    let row = conn
        .query_row(
            &sql,
            params![user_id, kind.as_str(), date.timestamp_millis(), card_id],
            read_row,
        )
        .optional()?;
    row.map(TransactionRow::into_model).transpose()
}

pub fn list_projections(conn: &Connection, user_id: i64, card_id: i64) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM transactions
         WHERE user_id=?1 AND system_kind='invoice_projection' AND source_card_id=?2
         ORDER BY date_ms",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id, card_id], read_row)?;
    collect(rows)
}

/// Drops a card's projections that were never paid; paid ones stay as history.
pub fn delete_unpaid_projections(conn: &Connection, user_id: i64, card_id: i64) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM transactions
         WHERE user_id=?1 AND system_kind='invoice_projection' AND source_card_id=?2 AND is_paid=0",
        params![user_id, card_id],
    )?;
    Ok(n)
}
