// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::balance::{PaidFilter, month_end_delta};
use crate::commands::user_id;
use crate::config::Settings;
use crate::db::{cards, transactions};
use crate::errors;
use crate::models::SystemKind;
use crate::utils::{pretty_table, round_money};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

/// Walks the opening-balance chain from the month after the ledger start to
/// the horizon, and looks for projections whose card is gone.
pub fn check(conn: &Connection, settings: &Settings, user: i64) -> errors::Result<Vec<Issue>> {
    let mut issues = Vec::new();

    let first = settings.ledger_start.next();
    let mut previous = month_end_delta(conn, user, settings.ledger_start, PaidFilter::PaidOnly)?;
    for month in first.through(settings.horizon) {
        let expected = round_money(previous);
        match transactions::find_system(conn, user, SystemKind::OpeningBalance, month.start(), None)? {
            None => issues.push(Issue {
                kind: "missing_opening_balance",
                detail: format!("{} (expected {:.2})", month, expected),
            }),
            Some(t) if t.signed_amount() != expected => issues.push(Issue {
                kind: "broken_chain",
                detail: format!("{}: stored {:.2}, expected {:.2}", month, t.signed_amount(), expected),
            }),
            Some(_) => {}
        }
        previous = month_end_delta(conn, user, month, PaidFilter::PaidOnly)?;
    }

    let live: HashSet<i64> = cards::list(conn, user)?.into_iter().map(|c| c.id).collect();
    for t in transactions::list(conn, user, None)? {
        if t.system_kind == Some(SystemKind::InvoiceProjection) && !t.is_paid {
            if let Some(card) = t.source_card_id.filter(|id| !live.contains(id)) {
                issues.push(Issue {
                    kind: "orphan_projection",
                    detail: format!("transaction {} refers to missing card {}", t.id, card),
                });
            }
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let issues = check(conn, settings, user_id(settings, m))?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
