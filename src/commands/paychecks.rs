// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::paychecks;
use crate::models::Kind;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let store = SqliteStore::new(conn);
    let cards = paychecks(&store.snapshot()?)?;
    if maybe_print_json(json_flag, jsonl_flag, &cards)? {
        return Ok(());
    }
    if cards.is_empty() {
        println!("No income recorded yet");
        return Ok(());
    }

    let sym = currency_symbol(conn)?;
    for card in &cards {
        let received = matches!(card.income.kind, Kind::Income { received: true, .. });
        println!(
            "#{} {} {} on {}{}",
            card.income.id,
            card.income.kind.category_name(),
            fmt_money(&card.income.amount, &sym),
            card.income.date,
            if received { "" } else { " (pending)" }
        );
        let rows: Vec<Vec<String>> = card
            .expenses
            .iter()
            .map(|e| {
                let (bucket, funded) = match e.kind {
                    Kind::Expense { bucket, funded, .. } => (bucket.to_string(), funded),
                    Kind::Income { .. } => (String::new(), false),
                };
                vec![
                    e.id.to_string(),
                    e.date.to_string(),
                    e.kind.category_name().to_string(),
                    bucket,
                    fmt_money(&e.amount, &sym),
                    if funded { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        if !rows.is_empty() {
            println!(
                "{}",
                pretty_table(&["ID", "Date", "Category", "Bucket", "Amount", "Funded"], rows)
            );
        }
        println!(
            "Planned {} | Funded {} | Remaining {}\n",
            fmt_money(&card.planned, &sym),
            fmt_money(&card.funded, &sym),
            fmt_money(&card.remaining, &sym)
        );
    }
    Ok(())
}
