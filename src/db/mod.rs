// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cards;
pub mod categories;
pub mod transactions;

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::Result;

pub fn open_or_init(path: &Path) -> Result<Connection> {
    debug!("Opening ledger at {}", path.display());
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Ledger ready at {}", path.display());
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        division TEXT NOT NULL,
        type TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(user_id, name)
    );

    CREATE TABLE IF NOT EXISTS credit_cards(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        brand TEXT NOT NULL,
        card_limit TEXT NOT NULL,
        closing_day INTEGER NOT NULL CHECK(closing_day BETWEEN 1 AND 31),
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        recurring_amount TEXT NOT NULL DEFAULT '0.00',
        expected_amount TEXT NOT NULL DEFAULT '0.00',
        current_total_amount TEXT NOT NULL DEFAULT '0.00',
        division TEXT NOT NULL,
        type TEXT NOT NULL,
        is_shared INTEGER NOT NULL DEFAULT 0,
        my_percentage TEXT NOT NULL DEFAULT '100.00',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        nature TEXT NOT NULL CHECK(nature IN ('income','expense')),
        date_ms INTEGER NOT NULL,
        division TEXT,
        type TEXT,
        category_id INTEGER,
        is_paid INTEGER NOT NULL DEFAULT 1,
        is_system_generated INTEGER NOT NULL DEFAULT 0,
        system_kind TEXT CHECK(system_kind IN ('opening_balance','invoice_projection')),
        source_card_id INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date_ms);

    -- one opening balance per user and month start
    CREATE UNIQUE INDEX IF NOT EXISTS idx_opening_balance
        ON transactions(user_id, date_ms)
        WHERE system_kind = 'opening_balance';

    -- one projected invoice per user, card and due date
    CREATE UNIQUE INDEX IF NOT EXISTS idx_invoice_projection
        ON transactions(user_id, source_card_id, date_ms)
        WHERE system_kind = 'invoice_projection';
    "#,
    )?;
    Ok(())
}
