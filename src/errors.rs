// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recoverable conditions surfaced to the presentation layer.

use crate::models::Bucket;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BudgetError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BudgetError {
    /// A record that breaks the type/category/amount rules of a transaction.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// A 50/30/20 target of zero, so no fill percentage exists.
    #[error("Target for {0} is zero")]
    TargetZero(Bucket),

    #[error("Linked income {0} does not exist")]
    UnknownIncome(i64),

    #[error("Transaction {0} not found")]
    NotFound(i64),

    /// A total or ratio outside the range of `Decimal`.
    #[error("Amounts are too large to total")]
    Overflow,
}
