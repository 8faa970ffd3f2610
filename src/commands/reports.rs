// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::spending_by_category;
use crate::errors::BudgetError;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("by-category", sub)) => by_category(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let store = SqliteStore::new(conn);
    let data = spending_by_category(&store.snapshot()?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let sym = currency_symbol(conn)?;
        let total = data
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.amount))
            .ok_or(BudgetError::Overflow)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                let share = if total.is_zero() {
                    Decimal::ZERO
                } else {
                    c.amount / total * Decimal::ONE_HUNDRED
                };
                vec![
                    c.category.to_string(),
                    fmt_money(&c.amount, &sym),
                    format!("{:.1}%", share),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}
