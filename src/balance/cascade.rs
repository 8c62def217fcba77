// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Opening-balance cascade.
//!
//! Every month after the ledger start carries one synthetic, paid, income
//! "opening balance" row dated on the 1st at 00:00 UTC. Its amount is the
//! previous month's ending balance, and since the row itself counts toward
//! its own month's net, balances chain forward month by month:
//!
//! ```text
//! opening(M) == opening(M-1) + net of the other paid rows in M-1
//! ```
//!
//! The cascade rewrites the chain from a given month through the configured
//! horizon. Each month's write is independent and idempotent, so a run that
//! aborts halfway leaves earlier months correct and is repaired by the next run.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::balance::locks::with_user_lock;
use crate::balance::month::{PaidFilter, month_end_delta};
use crate::config::Settings;
use crate::db::transactions;
use crate::errors::Result;
use crate::models::{Division, NewTransaction, Nature, SpendType, SystemKind};
use crate::month::YearMonth;
use crate::utils::round_money;

pub const OPENING_BALANCE_NOTE: &str = "Automatic opening balance generated by the system";

#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeReport {
    pub from: Option<YearMonth>,
    pub months_visited: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Ending balance of the last month visited.
    pub closing_balance: Decimal,
}

/// First month the cascade may write for a change dated in `changed`.
pub fn trigger_month(changed: YearMonth) -> YearMonth {
    changed.next()
}

/// Rewrites the opening balances of `from` through the horizon for one user.
///
/// `from` is clamped to the month after `ledger_start`, which never gets an
/// opening balance of its own. Store errors abort the run and are returned
/// as-is.
#[instrument(skip(conn, settings), fields(horizon = %settings.horizon))]
pub fn recalculate_from(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    from: YearMonth,
) -> Result<CascadeReport> {
    let from = from.max(settings.ledger_start.next());
    let mut report = CascadeReport::default();
    if from > settings.horizon {
        debug!(%from, "nothing to cascade past the horizon");
        return Ok(report);
    }
    report.from = Some(from);

    with_user_lock(user_id, || {
        let mut previous = month_end_delta(conn, user_id, from.prev(), PaidFilter::PaidOnly)?;

        for month in from.through(settings.horizon) {
            let opening = round_money(previous);
            let date = month.start();
            match transactions::find_system(conn, user_id, SystemKind::OpeningBalance, date, None)? {
                Some(existing) if existing.amount == opening => {
                    report.unchanged += 1;
                }
                Some(existing) => {
                    transactions::set_amount(conn, existing.id, opening)?;
                    debug!(%month, old = %existing.amount, new = %opening, "opening balance updated");
                    report.updated += 1;
                }
                None => {
                    transactions::insert(conn, &opening_row(settings, user_id, month, opening))?;
                    debug!(%month, amount = %opening, "opening balance created");
                    report.created += 1;
                }
            }
            report.months_visited += 1;

            // Includes the row just written.
            previous = month_end_delta(conn, user_id, month, PaidFilter::PaidOnly)?;
        }
        report.closing_balance = round_money(previous);
        Ok::<_, crate::errors::Error>(())
    })?;

    info!(
        user_id,
        from = %from,
        months = report.months_visited,
        created = report.created,
        updated = report.updated,
        "opening balances recalculated"
    );
    Ok(report)
}

fn opening_row(settings: &Settings, user_id: i64, month: YearMonth, amount: Decimal) -> NewTransaction {
    NewTransaction {
        user_id,
        description: settings.labels.opening_balance.clone(),
        amount,
        nature: Nature::Income,
        date: month.start(),
        division: Some(Division::Personal),
        r#type: Some(SpendType::Essential),
        category_id: None,
        is_paid: true,
        is_system_generated: true,
        system_kind: Some(SystemKind::OpeningBalance),
        source_card_id: None,
        notes: Some(OPENING_BALANCE_NOTE.to_string()),
    }
}
