// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{optional, required, user_id};
use crate::config::Settings;
use crate::db::categories;
use crate::models::{Division, SpendType};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = user_id(settings, sub);
            let name = required(sub, "name")?;
            let division = optional(sub, "division", |s| s.parse::<Division>())?.unwrap_or(Division::Personal);
            let kind = optional(sub, "type", |s| s.parse::<SpendType>())?.unwrap_or(SpendType::Essential);
            categories::insert(conn, user, name, division, kind)?;
            println!("Added category '{}' ({} / {})", name, division, kind);
        }
        Some(("list", sub)) => {
            let data = categories::list(conn, user_id(settings, sub))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| vec![c.name.clone(), c.division.to_string(), c.r#type.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Division", "Type"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            categories::delete(conn, user_id(settings, sub), name)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
