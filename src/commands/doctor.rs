// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregator::validate_snapshot;
use crate::models::NewTransaction;
use crate::store::SqliteStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// (transaction id, problem) pairs, in id order within each check.
pub fn find_issues(conn: &Connection) -> Result<Vec<(i64, String)>> {
    let store = SqliteStore::new(conn);
    let mut issues = Vec::new();
    let mut valid = Vec::new();

    // 1) Rows the model rejects outright
    for (id, raw) in store.raw_rows()? {
        match NewTransaction::try_from(raw) {
            Ok(new) => valid.push(new.into_transaction(id)),
            Err(e) => issues.push((id, e.to_string())),
        }
    }

    // 2) Cross-record problems among the rest
    for issue in validate_snapshot(&valid) {
        issues.push((issue.transaction_id, issue.error.to_string()));
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = find_issues(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
        return Ok(());
    }
    for (id, msg) in &issues {
        tracing::warn!(id, "{}", msg);
    }
    let rows = issues
        .into_iter()
        .map(|(id, msg)| vec![id.to_string(), msg])
        .collect();
    println!("{}", pretty_table(&["Transaction", "Issue"], rows));
    Ok(())
}
