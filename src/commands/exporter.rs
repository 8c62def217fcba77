// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::commands::{required, user_id};
use crate::config::Settings;
use crate::db::{categories, transactions};
use crate::utils::fmt_date;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = required(sub, "format")?.to_lowercase();
            let out = Path::new(required(sub, "out")?);
            let n = export_transactions(conn, user_id(settings, sub), &fmt, out)?;
            println!("Exported {} transactions to {}", n, out.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction of `user` to `out` as `csv` or `json`.
pub fn export_transactions(conn: &Connection, user: i64, fmt: &str, out: &Path) -> Result<usize> {
    let names: std::collections::HashMap<i64, String> = categories::list(conn, user)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let txs = transactions::list(conn, user, None)?;
    let category = |id: Option<i64>| id.and_then(|id| names.get(&id).cloned()).unwrap_or_default();

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "description",
                "nature",
                "amount",
                "paid",
                "category",
                "division",
                "type",
                "kind",
                "notes",
            ])?;
            for t in &txs {
                wtr.write_record([
                    t.id.to_string(),
                    fmt_date(&t.date),
                    t.description.clone(),
                    t.nature.to_string(),
                    format!("{:.2}", t.amount),
                    t.is_paid.to_string(),
                    category(t.category_id),
                    t.division.map(|d| d.to_string()).unwrap_or_default(),
                    t.r#type.map(|k| k.to_string()).unwrap_or_default(),
                    t.system_kind.map(|k| k.to_string()).unwrap_or_default(),
                    t.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": fmt_date(&t.date),
                        "description": t.description,
                        "nature": t.nature,
                        "amount": format!("{:.2}", t.amount),
                        "paid": t.is_paid,
                        "category": t.category_id.map(|id| category(Some(id))),
                        "division": t.division,
                        "type": t.r#type,
                        "kind": t.system_kind,
                        "notes": t.notes,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(txs.len())
}
