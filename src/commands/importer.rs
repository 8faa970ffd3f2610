// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Kind, NewTransaction, RawTransaction};
use crate::store::{SqliteStore, TransactionStore};
use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashMap;

/// One CSV row. `id` is the row's id in the database it was exported from.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(default)]
    id: Option<i64>,
    #[serde(rename = "type")]
    kind: String,
    date: String,
    amount: String,
    category: String,
    #[serde(default)]
    received: Option<bool>,
    #[serde(default)]
    funded: Option<bool>,
    #[serde(default)]
    bucket: Option<String>,
    #[serde(default)]
    linked_income_id: Option<i64>,
    #[serde(default)]
    note: Option<String>,
}

impl ImportRow {
    fn split(self) -> (Option<i64>, RawTransaction) {
        (
            self.id,
            RawTransaction {
                kind: self.kind,
                date: self.date,
                amount: self.amount,
                category: self.category,
                received: self.received,
                funded: self.funded,
                bucket: self.bucket,
                linked_income_id: self.linked_income_id,
                note: self.note,
            },
        )
    }
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// All rows land or none do.
///
/// Incomes are stored before expenses. A `linked_income_id` naming an `id`
/// from the same file is rewritten to the new row id; any other link refers
/// to a transaction already in the database.
fn import_transactions(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let mut rows: Vec<(usize, Option<i64>, NewTransaction)> = Vec::new();
    for (i, result) in rdr.deserialize::<ImportRow>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = result.with_context(|| format!("Unreadable CSV row at line {}", line))?;
        let (file_id, raw) = row.split();
        let new = NewTransaction::try_from(raw).map_err(|e| {
            tracing::warn!(line, error = %e, "rejected import row");
            anyhow::Error::new(e).context(format!("Invalid row at line {}", line))
        })?;
        rows.push((line, file_id, new));
    }
    rows.sort_by_key(|(_, _, new)| new.kind.type_name() != "income");

    let count = rows.len();
    let tx = conn.transaction()?;
    // File income id -> new row id.
    let mut incomes: HashMap<i64, i64> = HashMap::new();
    {
        let store = SqliteStore::new(&tx);
        for (line, file_id, mut new) in rows {
            if let Kind::Expense {
                linked_income_id: Some(link),
                ..
            } = &mut new.kind
            {
                if let Some(&created) = incomes.get(&*link) {
                    *link = created;
                }
            }
            let created = store
                .create(new)
                .with_context(|| format!("Could not store row at line {}", line))?;
            match file_id {
                Some(file_id) if created.is_income() => {
                    if incomes.insert(file_id, created.id).is_some() {
                        bail!("Duplicate income id {} at line {}", file_id, line);
                    }
                }
                _ => {}
            }
        }
    }
    tx.commit()?;
    tracing::info!(count, "imported transactions");
    println!("Imported {} transactions from {}", count, path);
    Ok(())
}
