// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Mutation entry points. Each one validates its input, applies the change
//! and then runs the cascade the change calls for.

use chrono::{DateTime, Datelike, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{error, info, instrument};

use crate::balance::cascade::{CascadeReport, recalculate_from, trigger_month};
use crate::config::Settings;
use crate::db::{cards, categories, transactions};
use crate::errors::{Error, Result};
use crate::invoice::{InvoiceReport, Projection, regenerate_all, update_active_cycle};
use crate::models::{
    CreditCard, CreditCardPatch, NewCreditCard, NewTransaction, Transaction, TransactionPatch,
};
use crate::month::{YearMonth, midnight};
use crate::utils::{check_day, check_money, check_percentage, round_money};

/// Longest installment plan accepted, in months.
pub const MAX_INSTALLMENTS: u32 = 360;

/// A user-entered transaction, optionally split into monthly installments.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub tx: NewTransaction,
    /// `None` or `Some(1)` for a single transaction.
    pub installments: Option<u32>,
}

impl From<NewTransaction> for TransactionInput {
    fn from(tx: NewTransaction) -> Self {
        TransactionInput {
            tx,
            installments: None,
        }
    }
}

fn validate_transaction(conn: &Connection, t: &NewTransaction) -> Result<()> {
    if t.description.trim().is_empty() {
        return Err(Error::validation("Description must not be empty"));
    }
    check_money(t.amount)?;
    if let Some(cat) = t.category_id {
        if !categories::exists(conn, t.user_id, cat)? {
            return Err(Error::not_found("Category", cat));
        }
    }
    Ok(())
}

/// Splits `amount` into `n` two-decimal parts; the last absorbs the remainder.
pub fn split_installments(amount: Decimal, n: u32) -> Vec<Decimal> {
    let part = round_money(amount / Decimal::from(n));
    let mut parts = vec![part; n as usize - 1];
    parts.push(amount - part * Decimal::from(n - 1));
    parts
}

fn installment_rows(t: &NewTransaction, n: u32) -> Vec<NewTransaction> {
    let first = YearMonth::of(&t.date);
    let day = t.date.day();
    let mut month = first;
    split_installments(t.amount, n)
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            let i = i as u32 + 1;
            let label = format!("Installment {}/{}", i, n);
            let row = NewTransaction {
                description: format!("{} ({}/{})", t.description, i, n),
                amount,
                date: midnight(month.on_day(day)),
                is_paid: i == 1 && t.is_paid,
                notes: Some(match &t.notes {
                    Some(note) => format!("{} | {}", note, label),
                    None => label,
                }),
                ..t.clone()
            };
            month = month.next();
            row
        })
        .collect()
}

/// Records a transaction (or its installments) and cascades from the month
/// after the first one.
#[instrument(skip(conn, settings, input), fields(user_id = input.tx.user_id))]
pub fn create_transaction(
    conn: &Connection,
    settings: &Settings,
    input: TransactionInput,
) -> Result<Vec<Transaction>> {
    let TransactionInput { mut tx, installments } = input;
    tx.is_system_generated = false;
    tx.system_kind = None;
    tx.source_card_id = None;
    validate_transaction(conn, &tx)?;

    let rows = match installments {
        None | Some(1) => vec![tx.clone()],
        Some(0) => return Err(Error::validation("Installments must be at least 1")),
        Some(n) if n > MAX_INSTALLMENTS => {
            return Err(Error::validation(format!(
                "At most {} installments are allowed",
                MAX_INSTALLMENTS
            )));
        }
        Some(n) => installment_rows(&tx, n),
    };

    let mut created = Vec::with_capacity(rows.len());
    for row in &rows {
        created.push(
            transactions::insert(conn, row)
                .inspect_err(|e| error!("Failed to insert transaction: {}", e))?,
        );
    }
    info!(count = created.len(), "transaction recorded");

    recalculate_from(conn, settings, tx.user_id, trigger_month(YearMonth::of(&tx.date)))
        .inspect_err(|e| error!("Cascade after insert failed: {}", e))?;
    Ok(created)
}

/// Applies `patch` and cascades from the month after the earlier of the old
/// and new dates. Opening-balance rows cannot be edited, and invoice
/// projections keep their due date and nature.
#[instrument(skip(conn, settings, patch))]
pub fn update_transaction(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    id: i64,
    patch: &TransactionPatch,
) -> Result<Transaction> {
    let original = transactions::get(conn, id, user_id)?;
    if original.is_opening_balance() {
        return Err(Error::Forbidden(format!(
            "Transaction {} is a system opening balance and cannot be edited",
            id
        )));
    }
    if original.is_system_generated && (patch.date.is_some() || patch.nature.is_some()) {
        return Err(Error::Forbidden(format!(
            "Transaction {} is a projected invoice; its date and nature are fixed",
            id
        )));
    }
    if let Some(amount) = patch.amount {
        check_money(amount)?;
    }
    if let Some(desc) = &patch.description {
        if desc.trim().is_empty() {
            return Err(Error::validation("Description must not be empty"));
        }
    }
    if let Some(cat) = patch.category_id {
        if !categories::exists(conn, user_id, cat)? {
            return Err(Error::not_found("Category", cat));
        }
    }
    if patch.is_empty() {
        return Ok(original);
    }

    transactions::update(conn, id, user_id, patch)
        .inspect_err(|e| error!("Failed to update transaction {}: {}", id, e))?;

    let changed = match patch.date {
        Some(d) => YearMonth::of(&d).min(YearMonth::of(&original.date)),
        None => YearMonth::of(&original.date),
    };
    recalculate_from(conn, settings, user_id, trigger_month(changed))
        .inspect_err(|e| error!("Cascade after update failed: {}", e))?;
    transactions::get(conn, id, user_id)
}

/// Deletes a user-entered transaction. System-generated rows are refused.
#[instrument(skip(conn, settings))]
pub fn delete_transaction(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    id: i64,
) -> Result<()> {
    let original = transactions::get(conn, id, user_id)?;
    if original.is_system_generated {
        return Err(Error::Forbidden(format!(
            "Transaction {} was generated by the system and cannot be deleted",
            id
        )));
    }
    transactions::delete(conn, id, user_id)
        .inspect_err(|e| error!("Failed to delete transaction {}: {}", id, e))?;
    recalculate_from(conn, settings, user_id, trigger_month(YearMonth::of(&original.date)))
        .inspect_err(|e| error!("Cascade after delete failed: {}", e))?;
    Ok(())
}

/// Lays down every opening balance from the month after the ledger start.
pub fn initialize_balances(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
) -> Result<CascadeReport> {
    recalculate_from(conn, settings, user_id, settings.ledger_start.next())
        .inspect_err(|e| error!("Balance initialization failed: {}", e))
}

fn validate_card_fields(
    closing_day: Option<u32>,
    due_day: Option<u32>,
    money: &[Option<Decimal>],
    my_percentage: Option<Decimal>,
) -> Result<()> {
    if let Some(d) = closing_day {
        check_day(d)?;
    }
    if let Some(d) = due_day {
        check_day(d)?;
    }
    for m in money.iter().flatten() {
        check_money(*m)?;
    }
    if let Some(p) = my_percentage {
        check_percentage(p)?;
    }
    Ok(())
}

/// Creates a card and seeds its projected invoices through the horizon.
#[instrument(skip(conn, settings, new), fields(user_id = new.user_id, name = %new.name))]
pub fn create_card(
    conn: &Connection,
    settings: &Settings,
    new: &NewCreditCard,
    now: DateTime<Utc>,
) -> Result<(CreditCard, InvoiceReport)> {
    if new.name.trim().is_empty() {
        return Err(Error::validation("Card name must not be empty"));
    }
    validate_card_fields(
        Some(new.closing_day),
        Some(new.due_day),
        &[Some(new.limit), Some(new.recurring_amount), Some(new.expected_amount)],
        Some(new.my_percentage),
    )?;
    let card = cards::insert(conn, new).inspect_err(|e| error!("Failed to insert card: {}", e))?;
    let report = regenerate_all(conn, settings, &card, now)
        .inspect_err(|e| error!("Invoice generation for card {} failed: {}", card.id, e))?;
    Ok((card, report))
}

fn needs_regeneration(patch: &CreditCardPatch) -> bool {
    patch.expected_amount.is_some()
        || patch.is_shared.is_some()
        || patch.my_percentage.is_some()
        || patch.closing_day.is_some()
        || patch.due_day.is_some()
        || patch.name.is_some()
        || patch.brand.is_some()
        || patch.division.is_some()
        || patch.r#type.is_some()
}

/// Updates a card; changes that alter its invoices regenerate them.
/// The live running total goes through [`set_current_total`] instead.
#[instrument(skip(conn, settings, patch))]
pub fn update_card(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    id: i64,
    patch: &CreditCardPatch,
    now: DateTime<Utc>,
) -> Result<(CreditCard, Option<InvoiceReport>)> {
    if patch.current_total_amount.is_some() {
        return Err(Error::validation(
            "The current total is set through the active-cycle update",
        ));
    }
    validate_card_fields(
        patch.closing_day,
        patch.due_day,
        &[patch.limit, patch.recurring_amount, patch.expected_amount],
        patch.my_percentage,
    )?;
    cards::get(conn, id, user_id)?;
    cards::update(conn, id, user_id, patch)
        .inspect_err(|e| error!("Failed to update card {}: {}", id, e))?;
    let card = cards::get(conn, id, user_id)?;

    if !needs_regeneration(patch) {
        return Ok((card, None));
    }
    let report = regenerate_all(conn, settings, &card, now)
        .inspect_err(|e| error!("Invoice regeneration for card {} failed: {}", id, e))?;
    Ok((card, Some(report)))
}

/// Deletes a card with its unpaid projections. Paid invoices stay.
#[instrument(skip(conn))]
pub fn delete_card(conn: &Connection, user_id: i64, id: i64) -> Result<usize> {
    cards::get(conn, id, user_id)?;
    let removed = transactions::delete_unpaid_projections(conn, user_id, id)?;
    cards::delete(conn, id, user_id).inspect_err(|e| error!("Failed to delete card {}: {}", id, e))?;
    info!(card_id = id, removed, "card deleted");
    Ok(removed)
}

pub fn set_current_total(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    card_id: i64,
    current_total: Decimal,
    now: DateTime<Utc>,
) -> Result<Projection> {
    update_active_cycle(conn, settings, user_id, card_id, current_total, now)
        .inspect_err(|e| error!("Active-cycle update for card {} failed: {}", card_id, e))
}
