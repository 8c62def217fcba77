// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writes projected invoices into the ledger as unpaid expense rows, one per
//! card per due month, keyed by `(source_card_id, date)`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::balance::locks::with_user_lock;
use crate::config::{Labels, Settings};
use crate::db::{cards, transactions};
use crate::errors::{Error, Result};
use crate::invoice::cycle::{active_cycle, cycle_of_due_date, due_date, is_closed};
use crate::invoice::projection::{Projection, my_share, project};
use crate::models::{
    CreditCard, CreditCardPatch, NewTransaction, Nature, SystemKind, Transaction, TransactionPatch,
};
use crate::month::midnight;
use crate::utils::{check_money, fmt_money, round_money};

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceReport {
    pub card_id: i64,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Existing rows left alone because they were already paid.
    pub skipped_paid: usize,
    /// Unpaid rows of still-open cycles whose due date is no longer generated.
    pub pruned: usize,
}

/// Ledger description of a card's invoice rows.
pub fn description(card: &CreditCard, labels: &Labels) -> String {
    let base = format!("{} {} {}", labels.invoice_prefix, card.name, card.brand);
    if card.is_shared {
        format!(
            "{} ({}: {})",
            base,
            labels.invoice_total,
            fmt_money(card.expected_amount, &labels.currency_symbol)
        )
    } else {
        base
    }
}

fn expected_note(card: &CreditCard, labels: &Labels) -> String {
    let base = format!("Automatic projection - expected invoice of {} {}", card.name, card.brand);
    if card.is_shared {
        format!(
            "{} ({}% of {})",
            base,
            card.my_percentage.normalize(),
            fmt_money(card.expected_amount, &labels.currency_symbol)
        )
    } else {
        base
    }
}

fn live_note(current_total: Decimal, labels: &Labels) -> String {
    format!(
        "Automatic projection based on current spend of {}",
        fmt_money(current_total, &labels.currency_symbol)
    )
}

fn projection_row(
    card: &CreditCard,
    description: String,
    date: DateTime<Utc>,
    amount: Decimal,
    notes: String,
) -> NewTransaction {
    NewTransaction {
        user_id: card.user_id,
        description,
        amount,
        nature: Nature::Expense,
        date,
        division: Some(card.division),
        r#type: Some(card.r#type),
        category_id: None,
        is_paid: false,
        is_system_generated: true,
        system_kind: Some(SystemKind::InvoiceProjection),
        source_card_id: Some(card.id),
        notes: Some(notes),
    }
}

fn differs(existing: &Transaction, row: &NewTransaction) -> bool {
    existing.amount != row.amount
        || existing.description != row.description
        || existing.division != row.division
        || existing.r#type != row.r#type
        || existing.notes != row.notes
}

fn refresh(conn: &Connection, existing: &Transaction, row: NewTransaction) -> Result<()> {
    let patch = TransactionPatch {
        description: Some(row.description),
        amount: Some(row.amount),
        division: row.division,
        r#type: row.r#type,
        notes: row.notes,
        ..TransactionPatch::default()
    };
    transactions::update(conn, existing.id, existing.user_id, &patch)
}

/// Seeds every open cycle from the active one through the horizon with the
/// card's expected amount (the user's share of it on shared cards).
///
/// Cycles whose closing date has passed are never rewritten, and neither is
/// any row the user already marked paid.
#[instrument(skip(conn, settings, card), fields(card_id = card.id, user_id = card.user_id))]
pub fn regenerate_all(
    conn: &Connection,
    settings: &Settings,
    card: &CreditCard,
    now: DateTime<Utc>,
) -> Result<InvoiceReport> {
    let today = now.date_naive();
    let desc = description(card, &settings.labels);
    let notes = expected_note(card, &settings.labels);
    let amount = round_money(my_share(card, card.expected_amount));
    let mut report = InvoiceReport {
        card_id: card.id,
        ..InvoiceReport::default()
    };

    with_user_lock(card.user_id, || {
        let mut generated = HashSet::new();
        for cycle in active_cycle(card.closing_day, today).through(settings.horizon) {
            let date = midnight(due_date(cycle, card.closing_day, card.due_day));
            generated.insert(date);
            let row = projection_row(card, desc.clone(), date, amount, notes.clone());

            match transactions::find_system(
                conn,
                card.user_id,
                SystemKind::InvoiceProjection,
                date,
                Some(card.id),
            )? {
                None => {
                    transactions::insert(conn, &row)?;
                    report.created += 1;
                }
                Some(existing) if existing.is_paid => {
                    debug!(%cycle, id = existing.id, "paid invoice left as is");
                    report.skipped_paid += 1;
                }
                Some(existing) if differs(&existing, &row) => {
                    refresh(conn, &existing, row)?;
                    report.updated += 1;
                }
                Some(_) => report.unchanged += 1,
            }
        }

        for stale in transactions::list_projections(conn, card.user_id, card.id)? {
            if stale.is_paid || generated.contains(&stale.date) {
                continue;
            }
            let cycle = cycle_of_due_date(stale.date.date_naive(), card.closing_day, card.due_day);
            if is_closed(cycle, card.closing_day, today) {
                debug!(%cycle, id = stale.id, "closed cycle protected");
                continue;
            }
            transactions::delete(conn, stale.id, card.user_id)?;
            report.pruned += 1;
        }
        Ok::<_, Error>(())
    })?;

    info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped_paid,
        pruned = report.pruned,
        "invoice projections regenerated"
    );
    Ok(report)
}

/// Stores the live running total of the open cycle and rewrites that cycle's
/// projected invoice, the same row [`regenerate_all`] treats as active. No
/// other row is touched.
#[instrument(skip(conn, settings))]
pub fn update_active_cycle(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    card_id: i64,
    current_total: Decimal,
    now: DateTime<Utc>,
) -> Result<Projection> {
    check_money(current_total)?;

    with_user_lock(user_id, || {
        let mut card = cards::get(conn, card_id, user_id)?;
        cards::update(
            conn,
            card_id,
            user_id,
            &CreditCardPatch {
                current_total_amount: Some(current_total),
                ..CreditCardPatch::default()
            },
        )?;
        card.current_total_amount = current_total;

        let projection = project(&card, now);
        let date = midnight(projection.active_due_date);
        let row = projection_row(
            &card,
            description(&card, &settings.labels),
            date,
            round_money(projection.my_amount),
            live_note(current_total, &settings.labels),
        );

        match transactions::find_system(
            conn,
            user_id,
            SystemKind::InvoiceProjection,
            date,
            Some(card_id),
        )? {
            Some(existing) if existing.is_paid => {
                debug!(id = existing.id, "active invoice already paid");
            }
            Some(existing) => {
                refresh(conn, &existing, row)?;
                debug!(id = existing.id, "active invoice updated");
            }
            None => {
                let created = transactions::insert(conn, &row)?;
                debug!(id = created.id, "active invoice created");
            }
        }

        info!(
            card_id,
            due = %projection.active_due_date,
            amount = %round_money(projection.my_amount),
            "active cycle projected"
        );
        Ok(projection)
    })
}
