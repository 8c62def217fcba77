// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use saldo::{cli, commands, config::Settings, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("saldo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::load().context("Failed to load configuration")?;
    let path = settings.db_path()?;
    let conn = db::open_or_init(&path)
        .with_context(|| format!("Failed to open ledger at {}", path.display()))?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, &settings, sub)?,
        Some(("balance", sub)) => commands::balances::handle(&conn, &settings, sub)?,
        Some(("card", sub)) => commands::cards::handle(&conn, &settings, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, &settings, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &settings, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &settings, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, &settings, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
