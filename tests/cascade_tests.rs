// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use saldo::balance::{PaidFilter, month_end_delta, recalculate_from};
use saldo::config::Settings;
use saldo::db::{self, transactions};
use saldo::errors::Error;
use saldo::models::{Nature, NewTransaction, SystemKind, Transaction, TransactionPatch};
use saldo::month::YearMonth;
use saldo::service::{self, TransactionInput};
use saldo::utils::parse_date;

fn setup() -> (Connection, Settings) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    (conn, Settings::default())
}

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

fn record(
    conn: &Connection,
    settings: &Settings,
    date: &str,
    amount: Decimal,
    nature: Nature,
) -> Transaction {
    let tx = NewTransaction::user(1, "test", amount, nature, parse_date(date).unwrap());
    service::create_transaction(conn, settings, tx.into())
        .unwrap()
        .remove(0)
}

fn opening(conn: &Connection, user: i64, month: &str) -> Option<Decimal> {
    transactions::find_system(conn, user, SystemKind::OpeningBalance, ym(month).start(), None)
        .unwrap()
        .map(|t| t.signed_amount())
}

fn all_openings(conn: &Connection) -> Vec<(i64, Decimal)> {
    transactions::list(conn, 1, None)
        .unwrap()
        .into_iter()
        .filter(|t| t.is_opening_balance())
        .map(|t| (t.date.timestamp_millis(), t.amount))
        .collect()
}

#[test]
fn expense_in_start_month_carries_into_every_later_month() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-10", dec!(1000), Nature::Expense);

    assert_eq!(opening(&conn, 1, "2026-01"), None);
    assert_eq!(opening(&conn, 1, "2026-02"), Some(dec!(-1000.00)));
    assert_eq!(opening(&conn, 1, "2026-03"), Some(dec!(-1000.00)));
    assert_eq!(opening(&conn, 1, "2030-12"), Some(dec!(-1000.00)));
    assert_eq!(all_openings(&conn).len(), 59);
}

#[test]
fn rerunning_the_cascade_is_a_fixed_point() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-05", dec!(5000), Nature::Income);
    record(&conn, &settings, "2026-02-12", dec!(1234.56), Nature::Expense);
    record(&conn, &settings, "2026-07-01", dec!(99.99), Nature::Expense);
    let before = all_openings(&conn);

    let report = recalculate_from(&conn, &settings, 1, ym("2026-02")).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.unchanged, 59);
    assert_eq!(all_openings(&conn), before);
}

#[test]
fn each_opening_equals_the_previous_month_ending() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-05", dec!(4200), Nature::Income);
    record(&conn, &settings, "2026-01-20", dec!(310.10), Nature::Expense);
    record(&conn, &settings, "2026-03-03", dec!(75.25), Nature::Expense);
    record(&conn, &settings, "2026-05-31", dec!(1500), Nature::Income);
    record(&conn, &settings, "2027-12-31", dec!(20.01), Nature::Expense);

    let mut month = ym("2026-02");
    while month <= settings.horizon {
        let previous = month_end_delta(&conn, 1, month.prev(), PaidFilter::PaidOnly).unwrap();
        assert_eq!(opening(&conn, 1, &month.to_string()), Some(previous), "at {}", month);
        month = month.next();
    }
    assert_eq!(opening(&conn, 1, "2026-04"), Some(dec!(3814.65)));
    assert_eq!(opening(&conn, 1, "2026-06"), Some(dec!(5314.65)));
    assert_eq!(opening(&conn, 1, "2028-01"), Some(dec!(5294.64)));
}

#[test]
fn unpaid_rows_stay_out_until_paid() {
    let (conn, settings) = setup();
    service::initialize_balances(&conn, &settings, 1).unwrap();
    let mut tx = NewTransaction::user(
        1,
        "rent",
        dec!(800),
        Nature::Expense,
        parse_date("2026-03-05").unwrap(),
    );
    tx.is_paid = false;
    let rent = service::create_transaction(&conn, &settings, tx.into())
        .unwrap()
        .remove(0);
    assert_eq!(opening(&conn, 1, "2026-04"), Some(dec!(0.00)));

    let patch = TransactionPatch {
        is_paid: Some(true),
        ..TransactionPatch::default()
    };
    service::update_transaction(&conn, &settings, 1, rent.id, &patch).unwrap();
    assert_eq!(opening(&conn, 1, "2026-03"), Some(dec!(0.00)));
    assert_eq!(opening(&conn, 1, "2026-04"), Some(dec!(-800.00)));
}

#[test]
fn moving_a_transaction_earlier_cascades_from_the_new_month() {
    let (conn, settings) = setup();
    service::initialize_balances(&conn, &settings, 1).unwrap();
    let t = record(&conn, &settings, "2026-06-10", dec!(300), Nature::Income);
    assert_eq!(opening(&conn, 1, "2026-03"), Some(dec!(0.00)));

    let patch = TransactionPatch {
        date: Some(parse_date("2026-02-10").unwrap()),
        ..TransactionPatch::default()
    };
    service::update_transaction(&conn, &settings, 1, t.id, &patch).unwrap();
    assert_eq!(opening(&conn, 1, "2026-02"), Some(dec!(0.00)));
    assert_eq!(opening(&conn, 1, "2026-03"), Some(dec!(300.00)));
    assert_eq!(opening(&conn, 1, "2026-07"), Some(dec!(300.00)));
}

#[test]
fn deleting_recomputes_later_months() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-02", dec!(100), Nature::Income);
    let t = record(&conn, &settings, "2026-04-02", dec!(40), Nature::Expense);
    assert_eq!(opening(&conn, 1, "2026-05"), Some(dec!(60.00)));

    service::delete_transaction(&conn, &settings, 1, t.id).unwrap();
    assert_eq!(opening(&conn, 1, "2026-05"), Some(dec!(100.00)));
}

#[test]
fn opening_rows_cannot_be_edited_or_deleted() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-02", dec!(100), Nature::Income);
    let row = transactions::find_system(
        &conn,
        1,
        SystemKind::OpeningBalance,
        ym("2026-02").start(),
        None,
    )
    .unwrap()
    .unwrap();

    let err = service::delete_transaction(&conn, &settings, 1, row.id).unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let patch = TransactionPatch {
        amount: Some(dec!(1)),
        ..TransactionPatch::default()
    };
    let err = service::update_transaction(&conn, &settings, 1, row.id, &patch).unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    assert_eq!(opening(&conn, 1, "2026-02"), Some(dec!(100.00)));
}

#[test]
fn other_users_rows_are_not_found() {
    let (conn, settings) = setup();
    let t = record(&conn, &settings, "2026-01-02", dec!(100), Nature::Income);

    let err = service::delete_transaction(&conn, &settings, 2, t.id).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(opening(&conn, 2, "2026-02").is_none());
}

#[test]
fn invalid_amounts_are_rejected_before_any_write() {
    let (conn, settings) = setup();
    let tx = NewTransaction::user(
        1,
        "bad",
        dec!(10.123),
        Nature::Expense,
        parse_date("2026-02-01").unwrap(),
    );
    let err = service::create_transaction(&conn, &settings, tx.into()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let huge = NewTransaction::user(
        1,
        "huge",
        dec!(10000000000000),
        Nature::Income,
        parse_date("2026-02-01").unwrap(),
    );
    let err = service::create_transaction(&conn, &settings, huge.into()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(transactions::list(&conn, 1, None).unwrap().is_empty());
}

#[test]
fn overlong_installment_plans_are_rejected() {
    let (conn, settings) = setup();
    let tx = NewTransaction::user(
        1,
        "forever",
        dec!(100),
        Nature::Expense,
        parse_date("2026-01-10").unwrap(),
    );
    let err = service::create_transaction(
        &conn,
        &settings,
        TransactionInput {
            tx,
            installments: Some(service::MAX_INSTALLMENTS + 1),
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(transactions::list(&conn, 1, None).unwrap().is_empty());
}

#[test]
fn start_month_is_never_given_an_opening_balance() {
    let (conn, settings) = setup();
    let report = recalculate_from(&conn, &settings, 1, ym("2025-06")).unwrap();
    assert_eq!(report.from, Some(ym("2026-02")));
    assert_eq!(report.created, 59);
    assert_eq!(opening(&conn, 1, "2026-01"), None);
}

#[test]
fn cascade_past_the_horizon_does_nothing() {
    let (conn, settings) = setup();
    let report = recalculate_from(&conn, &settings, 1, ym("2031-01")).unwrap();
    assert_eq!(report.from, None);
    assert_eq!(report.months_visited, 0);
    assert!(all_openings(&conn).is_empty());
}

#[test]
fn a_stale_month_is_repaired_by_the_next_run() {
    let (conn, settings) = setup();
    record(&conn, &settings, "2026-01-02", dec!(250), Nature::Income);
    let row = transactions::find_system(
        &conn,
        1,
        SystemKind::OpeningBalance,
        ym("2026-09").start(),
        None,
    )
    .unwrap()
    .unwrap();
    transactions::set_amount(&conn, row.id, dec!(1)).unwrap();

    let report = service::initialize_balances(&conn, &settings, 1).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(opening(&conn, 1, "2026-09"), Some(dec!(250.00)));
    assert_eq!(report.closing_balance, dec!(250.00));
}

#[test]
fn installments_split_across_months() {
    let (conn, settings) = setup();
    let tx = NewTransaction::user(
        1,
        "laptop",
        dec!(100),
        Nature::Expense,
        parse_date("2026-01-31").unwrap(),
    );
    let rows = service::create_transaction(
        &conn,
        &settings,
        TransactionInput {
            tx,
            installments: Some(3),
        },
    )
    .unwrap();

    let amounts: Vec<_> = rows.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    let dates: Vec<_> = rows.iter().map(|t| t.date.format("%Y-%m-%d").to_string()).collect();
    assert_eq!(dates, vec!["2026-01-31", "2026-02-28", "2026-03-31"]);
    assert_eq!(rows[1].description, "laptop (2/3)");
    assert!(rows[0].is_paid);
    assert!(!rows[1].is_paid && !rows[2].is_paid);
    assert_eq!(opening(&conn, 1, "2026-02"), Some(dec!(-33.33)));
    assert_eq!(opening(&conn, 1, "2026-04"), Some(dec!(-33.33)));
}
