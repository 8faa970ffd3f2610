// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RawTransaction;
use crate::store::{SqliteStore, TransactionStore};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub const CSV_HEADER: [&str; 10] = [
    "id",
    "type",
    "date",
    "amount",
    "category",
    "received",
    "funded",
    "bucket",
    "linked_income_id",
    "note",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let store = SqliteStore::new(conn);
    let mut data = store.snapshot()?;
    // Oldest first, so exported files read chronologically.
    data.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(CSV_HEADER)?;
        for t in &data {
            let raw = RawTransaction::from(t);
            wtr.write_record([
                t.id.to_string(),
                raw.kind,
                raw.date,
                raw.amount,
                raw.category,
                opt(raw.received),
                opt(raw.funded),
                opt(raw.bucket),
                opt(raw.linked_income_id),
                opt(raw.note),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
    }
    tracing::info!(count = data.len(), format = %fmt, "exported transactions");
    println!("Exported {} transactions to {}", data.len(), out);
    Ok(())
}
