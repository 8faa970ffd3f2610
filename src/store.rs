// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction persistence and change notification.
//!
//! The store hands out full snapshots, newest first, and pushes a fresh one to
//! every subscriber after each successful write. Aggregation happens on the
//! subscriber side. A snapshot that cannot be built after a write is logged
//! and skipped; the write itself still counts as done.

use crate::errors::BudgetError;
use crate::models::{NewTransaction, RawTransaction, Transaction};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::{Cell, RefCell};

pub type Listener = Box<dyn FnMut(&[Transaction])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub trait TransactionStore {
    /// All transactions, date descending.
    fn snapshot(&self) -> Result<Vec<Transaction>>;

    /// Registers `listener` and calls it right away with the current snapshot.
    fn subscribe(&self, listener: Listener) -> Result<SubscriptionId>;

    /// Returns false if the id was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn create(&self, new: NewTransaction) -> Result<Transaction>;

    fn delete(&self, id: i64) -> Result<()>;

    fn set_funded(&self, id: i64, funded: bool) -> Result<()>;

    fn set_received(&self, id: i64, received: bool) -> Result<()>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    /// Ids of listeners taken out for the delivery in progress.
    in_flight: RefCell<Vec<SubscriptionId>>,
    /// In-flight ids unsubscribed before their delivery finished.
    dropped: RefCell<Vec<SubscriptionId>>,
    next_id: Cell<u64>,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore {
            conn,
            listeners: RefCell::new(Vec::new()),
            in_flight: RefCell::new(Vec::new()),
            dropped: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn get(&self, id: i64) -> Result<Transaction> {
        let raw = self
            .conn
            .query_row(
                &format!("{} WHERE id=?1", SELECT_TX),
                params![id],
                read_row,
            )
            .optional()?
            .ok_or(BudgetError::NotFound(id))?;
        into_transaction(raw)
    }

    /// Stored rows before model validation, oldest first.
    pub fn raw_rows(&self) -> Result<Vec<(i64, RawTransaction)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY date, id", SELECT_TX))?;
        let rows = stmt.query_map([], read_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn kind_of(&self, id: i64) -> Result<Option<String>> {
        let kind = self
            .conn
            .query_row(
                "SELECT type FROM transactions WHERE id=?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(kind)
    }

    fn set_flag(&self, id: i64, column: &str, expected: &str, value: bool) -> Result<()> {
        let kind = self.kind_of(id)?.ok_or(BudgetError::NotFound(id))?;
        if kind != expected {
            return Err(BudgetError::InvalidTransaction(format!(
                "transaction {} is an {}; '{}' only applies to {}s",
                id, kind, column, expected
            ))
            .into());
        }
        self.conn.execute(
            &format!("UPDATE transactions SET {}=?1 WHERE id=?2", column),
            params![value, id],
        )?;
        tracing::info!(id, column, value, "updated transaction flag");
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        if self.listeners.borrow().is_empty() {
            return;
        }
        let snap = match self.snapshot() {
            Ok(snap) => snap,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "snapshot not delivered");
                return;
            }
        };
        // Listeners run outside the borrow so they may subscribe or
        // unsubscribe listeners.
        let mut active = std::mem::take(&mut *self.listeners.borrow_mut());
        let depth = self.in_flight.borrow().len();
        self.in_flight
            .borrow_mut()
            .extend(active.iter().map(|(id, _)| *id));
        for (id, listener) in active.iter_mut() {
            if self.dropped.borrow().contains(id) {
                continue;
            }
            listener(&snap);
        }
        self.in_flight.borrow_mut().truncate(depth);
        {
            let mut dropped = self.dropped.borrow_mut();
            active.retain(|(id, _)| !dropped.contains(id));
            let outer = self.in_flight.borrow();
            dropped.retain(|id| outer.contains(id));
        }
        let mut slot = self.listeners.borrow_mut();
        active.append(&mut slot);
        *slot = active;
        tracing::debug!(count = snap.len(), "delivered snapshot");
    }
}

const SELECT_TX: &str = "SELECT id, type, date, amount, category, received, funded, bucket, linked_income_id, note FROM transactions";

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, RawTransaction)> {
    Ok((
        r.get(0)?,
        RawTransaction {
            kind: r.get(1)?,
            date: r.get(2)?,
            amount: r.get(3)?,
            category: r.get(4)?,
            received: r.get(5)?,
            funded: r.get(6)?,
            bucket: r.get(7)?,
            linked_income_id: r.get(8)?,
            note: r.get(9)?,
        },
    ))
}

fn into_transaction((id, raw): (i64, RawTransaction)) -> Result<Transaction> {
    let new = NewTransaction::try_from(raw)
        .with_context(|| format!("Stored transaction {} is malformed", id))?;
    Ok(new.into_transaction(id))
}

impl TransactionStore for SqliteStore<'_> {
    fn snapshot(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY date DESC, id DESC", SELECT_TX))?;
        let rows = stmt.query_map([], read_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(into_transaction(row?)?);
        }
        Ok(data)
    }

    fn subscribe(&self, mut listener: Listener) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        listener(&self.snapshot()?);
        self.listeners.borrow_mut().push((id, listener));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|(sid, _)| *sid != id);
            if listeners.len() != before {
                return true;
            }
        }
        if !self.in_flight.borrow().contains(&id) {
            return false;
        }
        let mut dropped = self.dropped.borrow_mut();
        if dropped.contains(&id) {
            return false;
        }
        dropped.push(id);
        true
    }

    fn create(&self, new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        if let Some(income_id) = new.kind.linked_income_id() {
            if self.kind_of(income_id)?.as_deref() != Some("income") {
                return Err(BudgetError::UnknownIncome(income_id).into());
            }
        }
        let raw = RawTransaction::from(&new);
        self.conn.execute(
            "INSERT INTO transactions(type, date, amount, category, received, funded, bucket, linked_income_id, note)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                raw.kind,
                raw.date,
                raw.amount,
                raw.category,
                raw.received,
                raw.funded,
                raw.bucket,
                raw.linked_income_id,
                raw.note
            ],
        )?;
        let tx = new.into_transaction(self.conn.last_insert_rowid());
        tracing::info!(id = tx.id, kind = %raw.kind, amount = %tx.amount, "created transaction");
        self.notify();
        Ok(tx)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(BudgetError::NotFound(id).into());
        }
        tracing::info!(id, "deleted transaction");
        self.notify();
        Ok(())
    }

    fn set_funded(&self, id: i64, funded: bool) -> Result<()> {
        self.set_flag(id, "funded", "expense", funded)
    }

    fn set_received(&self, id: i64, received: bool) -> Result<()> {
        self.set_flag(id, "received", "income", received)
    }
}
