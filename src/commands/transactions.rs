// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::{self, Summary};
use crate::models::{Kind, NewTransaction, Transaction};
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_date, parse_decimal, parse_id,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

pub fn handle_income(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let new = NewTransaction::income(
            parse_date(sub.get_one::<String>("date").unwrap())?,
            parse_decimal(sub.get_one::<String>("amount").unwrap())?,
            sub.get_one::<String>("category").unwrap().parse()?,
            !sub.get_flag("pending"),
        )
        .with_note(sub.get_one::<String>("note").cloned());
        record(conn, new)?;
    }
    Ok(())
}

pub fn handle_expense(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let linked = match sub.get_one::<String>("income") {
            Some(s) => Some(parse_id(s)?),
            None => None,
        };
        let new = NewTransaction::expense(
            parse_date(sub.get_one::<String>("date").unwrap())?,
            parse_decimal(sub.get_one::<String>("amount").unwrap())?,
            sub.get_one::<String>("category").unwrap().parse()?,
            sub.get_one::<String>("bucket").unwrap().parse()?,
            !sub.get_flag("unfunded"),
            linked,
        )
        .with_note(sub.get_one::<String>("note").cloned());
        record(conn, new)?;
    }
    Ok(())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            store.delete(id)?;
            println!("Removed transaction {}", id);
        }
        Some(("fund", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let funded = !sub.get_flag("undo");
            store.set_funded(id, funded)?;
            println!(
                "Expense {} marked {}",
                id,
                if funded { "funded" } else { "unfunded" }
            );
        }
        Some(("receive", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let received = !sub.get_flag("undo");
            store.set_received(id, received)?;
            println!(
                "Income {} marked {}",
                id,
                if received { "received" } else { "pending" }
            );
        }
        _ => {}
    }
    Ok(())
}

/// Creates the transaction and reports the balance from the snapshot pushed
/// after the write.
pub fn record(conn: &Connection, new: NewTransaction) -> Result<Transaction> {
    let store = SqliteStore::new(conn);
    let latest: Rc<RefCell<Option<Summary>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&latest);
    let sub_id = match store.subscribe(Box::new(move |snap: &[Transaction]| {
        *sink.borrow_mut() = aggregator::summarize(snap).ok();
    })) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "balance unavailable");
            None
        }
    };
    // Only a snapshot taken after the write may report the balance.
    *latest.borrow_mut() = None;
    let created = store.create(new);
    if let Some(id) = sub_id {
        store.unsubscribe(id);
    }
    let tx = created?;

    let sym = currency_symbol(conn)?;
    println!(
        "Recorded {} #{}: {} {} on {}",
        tx.kind.type_name(),
        tx.id,
        fmt_money(&tx.amount, &sym),
        tx.kind.category_name(),
        tx.date
    );
    if let Some(summary) = latest.borrow().as_ref() {
        println!("Balance: {}", fmt_money(&summary.balance, &sym));
    }
    Ok(tx)
}

fn status(t: &Transaction) -> &'static str {
    match t.kind {
        Kind::Income { received: true, .. } => "received",
        Kind::Income { received: false, .. } => "pending",
        Kind::Expense { funded: true, .. } => "funded",
        Kind::Expense { funded: false, .. } => "unfunded",
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let sym = currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                let bucket = match t.kind {
                    Kind::Expense { bucket, .. } => bucket.to_string(),
                    Kind::Income { .. } => String::new(),
                };
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.type_name().to_string(),
                    t.kind.category_name().to_string(),
                    fmt_money(&t.amount, &sym),
                    status(t).to_string(),
                    bucket,
                    t.linked_income_id()
                        .map(|id| id.to_string())
                        .unwrap_or_default(),
                    t.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Date", "Type", "Category", "Amount", "Status", "Bucket", "Income",
                    "Note"
                ],
                rows,
            )
        );
    }
    Ok(())
}

/// Snapshot filtered by `--type` and cut to `--limit`, newest first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let store = SqliteStore::new(conn);
    let kind = sub.get_one::<String>("type");
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    Ok(store
        .snapshot()?
        .into_iter()
        .filter(|t| kind.is_none_or(|k| t.kind.type_name() == k.as_str()))
        .take(limit)
        .collect())
}
