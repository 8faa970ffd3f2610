// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use paycheck::models::{Bucket, ExpenseCategory, Kind};
use paycheck::store::{SqliteStore, TransactionStore};
use paycheck::{cli, commands::transactions, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["paycheck"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("income", m)) => transactions::handle_income(conn, m),
        Some(("expense", m)) => transactions::handle_expense(conn, m),
        Some(("tx", m)) => transactions::handle(conn, m),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn income_and_linked_expense_from_cli() {
    let conn = setup();
    run(
        &conn,
        &["income", "add", "--amount", "1500", "--category", "salary", "--date", "2025-05-01"],
    )
    .unwrap();
    run(
        &conn,
        &[
            "expense", "add", "--amount", " 89.99 ", "--category", "Utilities", "--bucket",
            "needs", "--date", "2025-05-03", "--income", "1", "--unfunded",
        ],
    )
    .unwrap();

    let snap = SqliteStore::new(&conn).snapshot().unwrap();
    assert_eq!(snap.len(), 2);
    assert_eq!(
        snap[0].kind,
        Kind::Expense {
            category: ExpenseCategory::Utilities,
            bucket: Bucket::Needs,
            funded: false,
            linked_income_id: Some(1),
        }
    );
    assert_eq!(snap[0].amount, "89.99".parse::<Decimal>().unwrap());
    assert!(snap[1].is_received_income());
}

#[test]
fn expense_requires_catalog_category() {
    let conn = setup();
    let err = run(
        &conn,
        &[
            "expense", "add", "--amount", "10", "--category", "Salary", "--bucket", "wants",
            "--date", "2025-05-03",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not an expense category"));
}

#[test]
fn list_limit_and_type_respected() {
    let conn = setup();
    for d in 1..=3 {
        run(
            &conn,
            &[
                "expense",
                "add",
                "--amount",
                "10",
                "--category",
                "Groceries",
                "--bucket",
                "needs",
                "--date",
                &format!("2025-01-0{}", d),
            ],
        )
        .unwrap();
    }
    run(
        &conn,
        &["income", "add", "--amount", "5", "--category", "Other", "--date", "2025-01-09", "--pending"],
    )
    .unwrap();

    let matches =
        cli::build_cli().get_matches_from(["paycheck", "tx", "list", "--type", "expense", "--limit", "2"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date.to_string(), "2025-01-03");
    assert!(rows.iter().all(|t| t.is_expense()));
}

#[test]
fn fund_and_receive_toggle_flags() {
    let conn = setup();
    run(
        &conn,
        &["income", "add", "--amount", "100", "--category", "Freelance", "--date", "2025-02-01", "--pending"],
    )
    .unwrap();
    run(
        &conn,
        &[
            "expense", "add", "--amount", "40", "--category", "Shopping", "--bucket", "wants",
            "--date", "2025-02-02", "--unfunded",
        ],
    )
    .unwrap();

    run(&conn, &["tx", "receive", "--id", "1"]).unwrap();
    run(&conn, &["tx", "fund", "--id", "2"]).unwrap();
    let store = SqliteStore::new(&conn);
    assert!(store.get(1).unwrap().is_received_income());
    assert!(store.get(2).unwrap().is_funded_expense());

    run(&conn, &["tx", "fund", "--id", "2", "--undo"]).unwrap();
    assert!(!store.get(2).unwrap().is_funded_expense());

    assert!(run(&conn, &["tx", "fund", "--id", "1"]).is_err());
    run(&conn, &["tx", "rm", "--id", "2"]).unwrap();
    assert_eq!(store.snapshot().unwrap().len(), 1);
}

#[test]
fn add_is_recorded_once_beside_a_malformed_row() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(type, date, amount, category)
         VALUES ('income', '2025-01-01', '5', 'Freelance')",
        [],
    )
    .unwrap();
    run(
        &conn,
        &["income", "add", "--amount", "700", "--category", "Salary", "--date", "2025-05-01"],
    )
    .unwrap();
    let rows = SqliteStore::new(&conn).raw_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].1.amount, "700");
}
