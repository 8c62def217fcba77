// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Credit card store.

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};

use crate::errors::{Error, Result};
use crate::models::{CreditCard, CreditCardPatch, NewCreditCard};
use crate::utils::{decimal_from_db, money_text};

const COLUMNS: &str = "id, user_id, name, brand, card_limit, closing_day, due_day, \
     recurring_amount, expected_amount, current_total_amount, division, type, is_shared, my_percentage";

struct CardRow {
    id: i64,
    user_id: i64,
    name: String,
    brand: String,
    limit: String,
    closing_day: u32,
    due_day: u32,
    recurring_amount: String,
    expected_amount: String,
    current_total_amount: String,
    division: String,
    r#type: String,
    is_shared: bool,
    my_percentage: String,
}

fn read_row(r: &Row<'_>) -> rusqlite::Result<CardRow> {
    Ok(CardRow {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        brand: r.get(3)?,
        limit: r.get(4)?,
        closing_day: r.get(5)?,
        due_day: r.get(6)?,
        recurring_amount: r.get(7)?,
        expected_amount: r.get(8)?,
        current_total_amount: r.get(9)?,
        division: r.get(10)?,
        r#type: r.get(11)?,
        is_shared: r.get(12)?,
        my_percentage: r.get(13)?,
    })
}

impl CardRow {
    fn into_model(self) -> Result<CreditCard> {
        let id = self.id;
        Ok(CreditCard {
            id,
            user_id: self.user_id,
            name: self.name,
            brand: self.brand,
            limit: decimal_from_db(&self.limit, "limit")?,
            closing_day: self.closing_day,
            due_day: self.due_day,
            recurring_amount: decimal_from_db(&self.recurring_amount, "recurring amount")?,
            expected_amount: decimal_from_db(&self.expected_amount, "expected amount")?,
            current_total_amount: decimal_from_db(&self.current_total_amount, "current total")?,
            division: self
                .division
                .parse()
                .map_err(|_| Error::Corrupt(format!("division of card {}", id)))?,
            r#type: self
                .r#type
                .parse()
                .map_err(|_| Error::Corrupt(format!("type of card {}", id)))?,
            is_shared: self.is_shared,
            my_percentage: decimal_from_db(&self.my_percentage, "percentage")?,
        })
    }
}

pub fn insert(conn: &Connection, c: &NewCreditCard) -> Result<CreditCard> {
    conn.execute(
        "INSERT INTO credit_cards(user_id, name, brand, card_limit, closing_day, due_day,
            recurring_amount, expected_amount, current_total_amount, division, type, is_shared, my_percentage)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '0.00', ?9, ?10, ?11, ?12)",
        params![
            c.user_id,
            c.name,
            c.brand,
            money_text(c.limit),
            c.closing_day,
            c.due_day,
            money_text(c.recurring_amount),
            money_text(c.expected_amount),
            c.division.as_str(),
            c.r#type.as_str(),
            c.is_shared,
            money_text(c.my_percentage),
        ],
    )?;
    get(conn, conn.last_insert_rowid(), c.user_id)
}

pub fn get(conn: &Connection, id: i64, user_id: i64) -> Result<CreditCard> {
    let sql = format!("SELECT {} FROM credit_cards WHERE id=?1 AND user_id=?2", COLUMNS);
    let row = conn
        .query_row(&sql, params![id, user_id], read_row)
        .optional()?;
    match row {
        Some(r) => r.into_model(),
        None => Err(Error::not_found("Credit card", id)),
    }
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<CreditCard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM credit_cards WHERE user_id=?1 ORDER BY name, id",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], read_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_model()?);
    }
    Ok(out)
}

pub fn update(conn: &Connection, id: i64, user_id: i64, patch: &CreditCardPatch) -> Result<()> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    let money = [
        ("card_limit=?", patch.limit),
        ("recurring_amount=?", patch.recurring_amount),
        ("expected_amount=?", patch.expected_amount),
        ("current_total_amount=?", patch.current_total_amount),
        ("my_percentage=?", patch.my_percentage),
    ];
    for (col, v) in money {
        if let Some(v) = v {
            sets.push(col);
            values.push(Box::new(money_text(v)));
        }
    }
    if let Some(v) = &patch.name {
        sets.push("name=?");
        values.push(Box::new(v.clone()));
    }
    if let Some(v) = &patch.brand {
        sets.push("brand=?");
        values.push(Box::new(v.clone()));
    }
    if let Some(v) = patch.closing_day {
        sets.push("closing_day=?");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.due_day {
        sets.push("due_day=?");
        values.push(Box::new(v));
    }
    if let Some(v) = patch.division {
        sets.push("division=?");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.r#type {
        sets.push("type=?");
        values.push(Box::new(v.as_str()));
    }
    if let Some(v) = patch.is_shared {
        sets.push("is_shared=?");
        values.push(Box::new(v));
    }
    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "UPDATE credit_cards SET {} WHERE id=? AND user_id=?",
        sets.join(", ")
    );
    values.push(Box::new(id));
    values.push(Box::new(user_id));
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(Error::not_found("Credit card", id));
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64, user_id: i64) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM credit_cards WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(Error::not_found("Credit card", id));
    }
    Ok(())
}
