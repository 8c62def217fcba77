// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal_macros::dec;
use saldo::commands::transactions;
use saldo::config::Settings;
use saldo::db::{self, categories};
use saldo::models::{Division, Nature, SpendType};
use saldo::{cli, service};

fn setup() -> (Connection, Settings) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    (conn, Settings::default())
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = cli::build_cli().get_matches_from(args);
    let (_, tx_m) = matches.subcommand().expect("no tx subcommand");
    let (_, sub) = tx_m.subcommand().expect("no tx action");
    sub.clone()
}

#[test]
fn add_args_build_a_categorised_installment_purchase() {
    let (conn, settings) = setup();
    categories::insert(&conn, 1, "Home", Division::Family, SpendType::Important).unwrap();
    let m = sub_matches(&[
        "saldo",
        "tx",
        "add",
        "--date",
        "2026-03-10",
        "-d",
        "Sofa",
        "--amount",
        "1500.00",
        "--category",
        "Home",
        "--division",
        "family",
        "--installments",
        "3",
    ]);
    let input = transactions::input_from_args(&conn, 1, &m).unwrap();
    assert_eq!(input.tx.amount, dec!(1500.00));
    assert_eq!(input.tx.nature, Nature::Expense);
    assert_eq!(input.tx.division, Some(Division::Family));
    assert!(input.tx.category_id.is_some());
    assert_eq!(input.installments, Some(3));

    let created = service::create_transaction(&conn, &settings, input).unwrap();
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|t| t.amount == dec!(500.00)));
}

#[test]
fn unknown_category_is_an_error() {
    let (conn, _) = setup();
    let m = sub_matches(&[
        "saldo",
        "tx",
        "add",
        "--date",
        "2026-03-10",
        "-d",
        "Lunch",
        "--amount",
        "25",
        "--category",
        "Nope",
    ]);
    assert!(transactions::input_from_args(&conn, 1, &m).is_err());
}

#[test]
fn list_limit_respected_newest_first() {
    let (conn, settings) = setup();
    for day in ["2026-01-01", "2026-01-02", "2026-01-03"] {
        let m = sub_matches(&[
            "saldo", "tx", "add", "--date", day, "-d", "Coffee", "--amount", "4.50",
        ]);
        let input = transactions::input_from_args(&conn, 1, &m).unwrap();
        service::create_transaction(&conn, &settings, input).unwrap();
    }

    let m = sub_matches(&["saldo", "tx", "list", "--month", "2026-01", "--limit", "2"]);
    let rows = transactions::query_rows(&conn, 1, &m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2026-01-03");
    assert_eq!(rows[0].amount, "4.50");
    assert_eq!(rows[0].kind, "user");
}

#[test]
fn system_filter_shows_only_generated_rows() {
    let (conn, settings) = setup();
    let m = sub_matches(&[
        "saldo", "tx", "add", "--date", "2026-01-05", "-d", "Salary", "--amount", "3000",
        "--nature", "income",
    ]);
    let input = transactions::input_from_args(&conn, 1, &m).unwrap();
    service::create_transaction(&conn, &settings, input).unwrap();

    let m = sub_matches(&["saldo", "tx", "list", "--month", "2026-02", "--system"]);
    let rows = transactions::query_rows(&conn, 1, &m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "opening_balance");
    assert_eq!(rows[0].amount, "3000.00");
    assert_eq!(rows[0].description, "Opening Balance");
}
