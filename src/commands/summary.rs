// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::{BucketProgress, Summary, summarize};
use crate::models::Bucket;
use crate::store::{SqliteStore, TransactionStore};
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, pretty_table, progress_bar};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
struct SummaryReport<'a> {
    balance: Decimal,
    total_income: Decimal,
    total_expenses: Decimal,
    actual_savings: Decimal,
    buckets: Vec<BucketProgress>,
    incomes: &'a [crate::models::Transaction],
}

fn describe(bucket: Bucket) -> (&'static str, &'static str) {
    match bucket {
        Bucket::Needs => ("Needs (50%)", "all income"),
        Bucket::Wants => ("Wants (30%)", "all income"),
        Bucket::Savings => ("Savings (20%)", "salary only"),
    }
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let store = SqliteStore::new(conn);
    let summary = summarize(&store.snapshot()?)?;
    let report = SummaryReport {
        balance: summary.balance,
        total_income: summary.total_income,
        total_expenses: summary.total_expenses,
        actual_savings: summary.actual_savings,
        buckets: Bucket::ALL.iter().map(|b| summary.progress(*b)).collect(),
        incomes: &summary.incomes,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &report)? {
        let sym = currency_symbol(conn)?;
        println!("{}", cards_table(&summary, &sym));
        println!("{}", rule_table(&summary, &sym));
    }
    Ok(())
}

fn cards_table(s: &Summary, sym: &str) -> comfy_table::Table {
    pretty_table(
        &["Balance", "Income", "Expenses", "Actual Savings"],
        vec![vec![
            fmt_money(&s.balance, sym),
            fmt_money(&s.total_income, sym),
            fmt_money(&s.total_expenses, sym),
            fmt_money(&s.actual_savings, sym),
        ]],
    )
}

fn rule_table(s: &Summary, sym: &str) -> comfy_table::Table {
    let rows = Bucket::ALL
        .iter()
        .map(|b| {
            let p = s.progress(*b);
            if p.percent.is_none() {
                tracing::debug!(bucket = %b, "target is zero; drawing empty bar");
            }
            let (title, base) = describe(*b);
            vec![
                title.to_string(),
                format!("{} ({})", fmt_money(&p.target, sym), base),
                fmt_money(&p.actual, sym),
                progress_bar(p.percent, BAR_WIDTH),
            ]
        })
        .collect();
    pretty_table(&["Bucket", "Target", "Actual", "Progress"], rows)
}
