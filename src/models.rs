// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::BudgetError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 50/30/20 bucket an expense is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Needs,
    Wants,
    Savings,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Needs, Bucket::Wants, Bucket::Savings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Needs => "needs",
            Bucket::Wants => "wants",
            Bucket::Savings => "savings",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BudgetError::InvalidTransaction(format!(
                    "unknown budget category '{}' (use needs|wants|savings)",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeCategory {
    Salary,
    Freelance,
    Investments,
    Other,
}

impl IncomeCategory {
    pub const ALL: [IncomeCategory; 4] = [
        IncomeCategory::Salary,
        IncomeCategory::Freelance,
        IncomeCategory::Investments,
        IncomeCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeCategory::Salary => "Salary",
            IncomeCategory::Freelance => "Freelance",
            IncomeCategory::Investments => "Investments",
            IncomeCategory::Other => "Other",
        }
    }
}

impl fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeCategory {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        IncomeCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BudgetError::InvalidTransaction(format!("'{}' is not an income category", s))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Groceries,
    Transportation,
    Entertainment,
    Shopping,
    Healthcare,
    Savings,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Utilities,
        ExpenseCategory::Groceries,
        ExpenseCategory::Transportation,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Savings,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Groceries => "Groceries",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Healthcare => "Healthcare",
            ExpenseCategory::Savings => "Savings",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BudgetError::InvalidTransaction(format!("'{}' is not an expense category", s))
            })
    }
}

/// Type-specific part of a transaction. The variant never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kind {
    Income {
        category: IncomeCategory,
        received: bool,
    },
    Expense {
        category: ExpenseCategory,
        bucket: Bucket,
        funded: bool,
        linked_income_id: Option<i64>,
    },
}

impl Kind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::Income { .. } => "income",
            Kind::Expense { .. } => "expense",
        }
    }

    pub fn category_name(&self) -> &'static str {
        match self {
            Kind::Income { category, .. } => category.as_str(),
            Kind::Expense { category, .. } => category.as_str(),
        }
    }

    pub fn linked_income_id(&self) -> Option<i64> {
        match self {
            Kind::Expense {
                linked_income_id, ..
            } => *linked_income_id,
            Kind::Income { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(flatten)]
    pub kind: Kind,
    pub note: Option<String>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        matches!(self.kind, Kind::Income { .. })
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, Kind::Expense { .. })
    }

    /// Income that has actually arrived.
    pub fn is_received_income(&self) -> bool {
        matches!(self.kind, Kind::Income { received: true, .. })
    }

    /// Expense that has actually been paid.
    pub fn is_funded_expense(&self) -> bool {
        matches!(self.kind, Kind::Expense { funded: true, .. })
    }

    pub fn linked_income_id(&self) -> Option<i64> {
        self.kind.linked_income_id()
    }
}

/// Payload for creating a transaction; everything but the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: Kind,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn income(
        date: NaiveDate,
        amount: Decimal,
        category: IncomeCategory,
        received: bool,
    ) -> Self {
        NewTransaction {
            date,
            amount,
            kind: Kind::Income { category, received },
            note: None,
        }
    }

    pub fn expense(
        date: NaiveDate,
        amount: Decimal,
        category: ExpenseCategory,
        bucket: Bucket,
        funded: bool,
        linked_income_id: Option<i64>,
    ) -> Self {
        NewTransaction {
            date,
            amount,
            kind: Kind::Expense {
                category,
                bucket,
                funded,
                linked_income_id,
            },
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.amount < Decimal::ZERO {
            return Err(BudgetError::InvalidTransaction(format!(
                "amount {} is negative",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn into_transaction(self, id: i64) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            kind: self.kind,
            note: self.note,
        }
    }
}

/// Untyped record as it arrives from storage or a CSV file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub amount: String,
    pub category: String,
    #[serde(default)]
    pub received: Option<bool>,
    #[serde(default)]
    pub funded: Option<bool>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub linked_income_id: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl RawTransaction {
    fn from_parts(date: NaiveDate, amount: Decimal, kind: &Kind, note: Option<&String>) -> Self {
        let mut raw = RawTransaction {
            kind: kind.type_name().to_string(),
            date: date.to_string(),
            amount: amount.to_string(),
            category: kind.category_name().to_string(),
            note: note.cloned(),
            ..RawTransaction::default()
        };
        match kind {
            Kind::Income { received, .. } => raw.received = Some(*received),
            Kind::Expense {
                bucket,
                funded,
                linked_income_id,
                ..
            } => {
                raw.funded = Some(*funded);
                raw.bucket = Some(bucket.as_str().to_string());
                raw.linked_income_id = *linked_income_id;
            }
        }
        raw
    }
}

impl From<&Transaction> for RawTransaction {
    fn from(t: &Transaction) -> Self {
        RawTransaction::from_parts(t.date, t.amount, &t.kind, t.note.as_ref())
    }
}

impl From<&NewTransaction> for RawTransaction {
    fn from(t: &NewTransaction) -> Self {
        RawTransaction::from_parts(t.date, t.amount, &t.kind, t.note.as_ref())
    }
}

impl TryFrom<RawTransaction> for NewTransaction {
    type Error = BudgetError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let invalid = |msg: String| BudgetError::InvalidTransaction(msg);

        let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d")
            .map_err(|_| invalid(format!("invalid date '{}', expected YYYY-MM-DD", raw.date)))?;
        let amount = raw
            .amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| invalid(format!("invalid amount '{}'", raw.amount)))?;

        let kind = match raw.kind.trim().to_ascii_lowercase().as_str() {
            "income" => {
                if raw.funded.is_some() || raw.bucket.is_some() || raw.linked_income_id.is_some() {
                    return Err(invalid(
                        "income carries expense-only fields (funded/bucket/linked income)".into(),
                    ));
                }
                Kind::Income {
                    category: raw.category.parse()?,
                    received: raw
                        .received
                        .ok_or_else(|| invalid("income is missing the received flag".into()))?,
                }
            }
            "expense" => {
                if raw.received.is_some() {
                    return Err(invalid("expense carries the income-only received flag".into()));
                }
                let bucket: Bucket = raw
                    .bucket
                    .as_deref()
                    .ok_or_else(|| invalid("expense is missing its budget category".into()))?
                    .parse()?;
                Kind::Expense {
                    category: raw.category.parse()?,
                    bucket,
                    funded: raw
                        .funded
                        .ok_or_else(|| invalid("expense is missing the funded flag".into()))?,
                    linked_income_id: raw.linked_income_id,
                }
            }
            other => {
                return Err(invalid(format!(
                    "unknown transaction type '{}' (use income|expense)",
                    other
                )));
            }
        };

        let new = NewTransaction {
            date,
            amount,
            kind,
            note: None,
        }
        .with_note(raw.note);
        new.validate()?;
        Ok(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_expense() -> RawTransaction {
        RawTransaction {
            kind: "expense".into(),
            date: "2025-03-01".into(),
            amount: "42.50".into(),
            category: "Groceries".into(),
            funded: Some(true),
            bucket: Some("needs".into()),
            ..RawTransaction::default()
        }
    }

    #[test]
    fn raw_expense_converts() {
        let new = NewTransaction::try_from(raw_expense()).unwrap();
        assert_eq!(
            new.kind,
            Kind::Expense {
                category: ExpenseCategory::Groceries,
                bucket: Bucket::Needs,
                funded: true,
                linked_income_id: None,
            }
        );
        assert_eq!(new.amount, Decimal::new(4250, 2));
    }

    #[test]
    fn missing_funded_flag_is_rejected() {
        let mut raw = raw_expense();
        raw.funded = None;
        let err = NewTransaction::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("funded"));
    }

    #[test]
    fn income_category_on_expense_is_rejected() {
        let mut raw = raw_expense();
        raw.category = "Salary".into();
        assert!(matches!(
            NewTransaction::try_from(raw),
            Err(BudgetError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut raw = raw_expense();
        raw.amount = "-1".into();
        assert!(NewTransaction::try_from(raw).is_err());
    }

    #[test]
    fn income_with_expense_fields_is_rejected() {
        let raw = RawTransaction {
            kind: "income".into(),
            date: "2025-03-01".into(),
            amount: "1000".into(),
            category: "Salary".into(),
            received: Some(true),
            bucket: Some("needs".into()),
            ..RawTransaction::default()
        };
        assert!(NewTransaction::try_from(raw).is_err());
    }

    #[test]
    fn category_parsing_ignores_case_and_padding() {
        assert_eq!(
            " salary ".parse::<IncomeCategory>().unwrap(),
            IncomeCategory::Salary
        );
        assert_eq!("WANTS".parse::<Bucket>().unwrap(), Bucket::Wants);
    }
}
