// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget aggregation over a transaction snapshot.
//!
//! Everything here is a pure function of `&[Transaction]`: nothing is cached
//! and nothing is written back. Callers re-run [`summarize`] whenever the store
//! delivers a new snapshot.

use crate::errors::BudgetError;
use crate::models::{Bucket, ExpenseCategory, IncomeCategory, Kind, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Share of all received income allotted to needs.
pub const NEEDS_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Share of all received income allotted to wants.
pub const WANTS_RATE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Share of received *salary* income allotted to savings.
pub const SAVINGS_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub balance: Decimal,
    pub total_income: Decimal,
    pub salary_income: Decimal,
    pub total_expenses: Decimal,
    pub actual_savings: Decimal,
    pub needs_target: Decimal,
    pub wants_target: Decimal,
    pub savings_target: Decimal,
    pub actual_needs: Decimal,
    pub actual_wants: Decimal,
    /// Every income, received or not, oldest first.
    pub incomes: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketProgress {
    pub bucket: Bucket,
    pub target: Decimal,
    pub actual: Decimal,
    /// `None` when the target is zero.
    pub percent: Option<Decimal>,
}

impl Summary {
    pub fn target(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Needs => self.needs_target,
            Bucket::Wants => self.wants_target,
            Bucket::Savings => self.savings_target,
        }
    }

    /// Savings progress is measured against the `Savings` expense category,
    /// not the savings bucket.
    pub fn actual(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Needs => self.actual_needs,
            Bucket::Wants => self.actual_wants,
            Bucket::Savings => self.actual_savings,
        }
    }

    pub fn fill(&self, bucket: Bucket) -> Result<Decimal, BudgetError> {
        fill_percent(bucket, self.actual(bucket), self.target(bucket))
    }

    pub fn progress(&self, bucket: Bucket) -> BucketProgress {
        BucketProgress {
            bucket,
            target: self.target(bucket),
            actual: self.actual(bucket),
            percent: self.fill(bucket).ok(),
        }
    }
}

fn sum<'a>(mut txs: impl Iterator<Item = &'a Transaction>) -> Result<Decimal, BudgetError> {
    txs.try_fold(Decimal::ZERO, |acc, t| {
        acc.checked_add(t.amount).ok_or(BudgetError::Overflow)
    })
}

fn scale(amount: Decimal, rate: Decimal) -> Result<Decimal, BudgetError> {
    amount.checked_mul(rate).ok_or(BudgetError::Overflow)
}

/// Fails with [`BudgetError::Overflow`] when a total leaves the `Decimal` range.
pub fn summarize(snapshot: &[Transaction]) -> Result<Summary, BudgetError> {
    let received = || snapshot.iter().filter(|t| t.is_received_income());
    let funded = || snapshot.iter().filter(|t| t.is_funded_expense());

    let total_income = sum(received())?;
    let salary_income = sum(received().filter(|t| {
        matches!(
            t.kind,
            Kind::Income {
                category: IncomeCategory::Salary,
                ..
            }
        )
    }))?;
    let total_expenses = sum(funded())?;
    let actual_savings = sum(funded().filter(|t| {
        matches!(
            t.kind,
            Kind::Expense {
                category: ExpenseCategory::Savings,
                ..
            }
        )
    }))?;
    let in_bucket = |b: Bucket| {
        sum(funded().filter(move |t| matches!(t.kind, Kind::Expense { bucket, .. } if bucket == b)))
    };

    Ok(Summary {
        balance: total_income
            .checked_sub(total_expenses)
            .ok_or(BudgetError::Overflow)?,
        total_income,
        salary_income,
        total_expenses,
        actual_savings,
        needs_target: scale(total_income, NEEDS_RATE)?,
        wants_target: scale(total_income, WANTS_RATE)?,
        savings_target: scale(salary_income, SAVINGS_RATE)?,
        actual_needs: in_bucket(Bucket::Needs)?,
        actual_wants: in_bucket(Bucket::Wants)?,
        incomes: incomes_by_date(snapshot),
    })
}

/// All incomes in ascending date order; equal dates keep snapshot order.
pub fn incomes_by_date(snapshot: &[Transaction]) -> Vec<Transaction> {
    let mut incomes: Vec<Transaction> =
        snapshot.iter().filter(|t| t.is_income()).cloned().collect();
    incomes.sort_by_key(|t| t.date);
    incomes
}

/// `actual / target * 100`, clamped to `[0, 100]`.
pub fn fill_percent(bucket: Bucket, actual: Decimal, target: Decimal) -> Result<Decimal, BudgetError> {
    if target.is_zero() {
        return Err(BudgetError::TargetZero(bucket));
    }
    // Out of range means the ratio is far past either end of the clamp.
    let pct = actual
        .checked_div(target)
        .and_then(|ratio| ratio.checked_mul(HUNDRED));
    Ok(match pct {
        Some(pct) => pct.clamp(Decimal::ZERO, HUNDRED),
        None if actual.is_sign_negative() != target.is_sign_negative() => Decimal::ZERO,
        None => HUNDRED,
    })
}

/// Expenses drawn against `income_id`, in snapshot order.
pub fn linked_expenses(snapshot: &[Transaction], income_id: i64) -> Vec<&Transaction> {
    snapshot
        .iter()
        .filter(|t| t.is_expense() && t.linked_income_id() == Some(income_id))
        .collect()
}

/// One income with the expenses earmarked against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paycheck {
    pub income: Transaction,
    pub expenses: Vec<Transaction>,
    /// Sum of every linked expense, funded or not.
    pub planned: Decimal,
    pub funded: Decimal,
    /// `income.amount - planned`; negative when over-allocated.
    pub remaining: Decimal,
}

pub fn paychecks(snapshot: &[Transaction]) -> Result<Vec<Paycheck>, BudgetError> {
    incomes_by_date(snapshot)
        .into_iter()
        .map(|income| {
            let expenses: Vec<Transaction> = linked_expenses(snapshot, income.id)
                .into_iter()
                .cloned()
                .collect();
            let planned = sum(expenses.iter())?;
            let funded = sum(expenses.iter().filter(|t| t.is_funded_expense()))?;
            Ok(Paycheck {
                remaining: income
                    .amount
                    .checked_sub(planned)
                    .ok_or(BudgetError::Overflow)?,
                income,
                expenses,
                planned,
                funded,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: ExpenseCategory,
    pub amount: Decimal,
}

/// Funded spending per expense category, largest first.
pub fn spending_by_category(snapshot: &[Transaction]) -> Result<Vec<CategorySpend>, BudgetError> {
    let mut totals: HashMap<ExpenseCategory, Decimal> = HashMap::new();
    for t in snapshot.iter().filter(|t| t.is_funded_expense()) {
        if let Kind::Expense { category, .. } = t.kind {
            let total = totals.entry(category).or_insert(Decimal::ZERO);
            *total = total.checked_add(t.amount).ok_or(BudgetError::Overflow)?;
        }
    }
    // Walk the catalog so equal amounts come out in a fixed order.
    let mut out: Vec<CategorySpend> = ExpenseCategory::ALL
        .into_iter()
        .filter_map(|category| {
            totals
                .get(&category)
                .map(|&amount| CategorySpend { category, amount })
        })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount));
    Ok(out)
}

/// A snapshot problem attributed to one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub transaction_id: i64,
    pub error: BudgetError,
}

/// Cross-record checks the typed model cannot express on its own.
pub fn validate_snapshot(snapshot: &[Transaction]) -> Vec<Issue> {
    let income_ids: HashSet<i64> = snapshot
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.id)
        .collect();
    let mut issues = Vec::new();
    for t in snapshot {
        if t.amount < Decimal::ZERO {
            issues.push(Issue {
                transaction_id: t.id,
                error: BudgetError::InvalidTransaction(format!("amount {} is negative", t.amount)),
            });
        }
        if let Some(income_id) = t.linked_income_id() {
            if !income_ids.contains(&income_id) {
                issues.push(Issue {
                    transaction_id: t.id,
                    error: BudgetError::UnknownIncome(income_id),
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTransaction;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn income(id: i64, day: u32, amount: &str, category: IncomeCategory, received: bool) -> Transaction {
        NewTransaction::income(d(day), dec(amount), category, received).into_transaction(id)
    }

    fn expense(
        id: i64,
        amount: &str,
        category: ExpenseCategory,
        bucket: Bucket,
        funded: bool,
        linked: Option<i64>,
    ) -> Transaction {
        NewTransaction::expense(d(10), dec(amount), category, bucket, funded, linked)
            .into_transaction(id)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            income(1, 15, "1000", IncomeCategory::Salary, true),
            income(2, 1, "300", IncomeCategory::Freelance, true),
            income(3, 20, "999", IncomeCategory::Salary, false),
            expense(4, "200", ExpenseCategory::Rent, Bucket::Needs, true, Some(1)),
            expense(5, "50", ExpenseCategory::Entertainment, Bucket::Wants, true, Some(1)),
            expense(6, "75", ExpenseCategory::Savings, Bucket::Savings, true, None),
            expense(7, "500", ExpenseCategory::Shopping, Bucket::Wants, false, Some(1)),
        ]
    }

    #[test]
    fn salary_and_rent_scenario() {
        let snap = vec![
            income(1, 1, "1000", IncomeCategory::Salary, true),
            expense(2, "200", ExpenseCategory::Rent, Bucket::Needs, true, None),
        ];
        let s = summarize(&snap).unwrap();
        assert_eq!(s.total_income, dec("1000"));
        assert_eq!(s.total_expenses, dec("200"));
        assert_eq!(s.balance, dec("800"));
        assert_eq!(s.needs_target, dec("500"));
        assert_eq!(s.actual_needs, dec("200"));
        assert_eq!(s.savings_target, dec("200"));
        assert_eq!(s.actual_savings, Decimal::ZERO);
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let s = summarize(&sample()).unwrap();
        assert_eq!(s.balance, s.total_income - s.total_expenses);
        assert_eq!(s.total_income, dec("1300"));
        assert_eq!(s.total_expenses, dec("325"));
    }

    #[test]
    fn needs_and_wants_targets_are_eighty_percent_of_income() {
        let s = summarize(&sample()).unwrap();
        assert_eq!(s.needs_target + s.wants_target, s.total_income * dec("0.8"));
    }

    #[test]
    fn gated_records_match_omission() {
        let with = sample();
        let without: Vec<Transaction> = with
            .iter()
            .filter(|t| t.id != 3 && t.id != 7)
            .cloned()
            .collect();
        let a = summarize(&with).unwrap();
        let b = summarize(&without).unwrap();
        assert_eq!(a.balance, b.balance);
        assert_eq!(a.total_income, b.total_income);
        assert_eq!(a.salary_income, b.salary_income);
        assert_eq!(a.total_expenses, b.total_expenses);
        assert_eq!(a.actual_needs, b.actual_needs);
        assert_eq!(a.actual_wants, b.actual_wants);
        assert_eq!(a.actual_savings, b.actual_savings);
        assert_eq!(a.savings_target, b.savings_target);
    }

    #[test]
    fn unfunded_savings_expense_counts_nowhere() {
        let snap = vec![
            income(1, 1, "1000", IncomeCategory::Salary, true),
            expense(2, "80", ExpenseCategory::Savings, Bucket::Savings, false, None),
            expense(3, "80", ExpenseCategory::Groceries, Bucket::Needs, false, None),
            expense(4, "80", ExpenseCategory::Shopping, Bucket::Wants, false, None),
        ];
        let s = summarize(&snap).unwrap();
        assert_eq!(s.total_expenses, Decimal::ZERO);
        assert_eq!(s.actual_savings, Decimal::ZERO);
        assert_eq!(s.actual_needs, Decimal::ZERO);
        assert_eq!(s.actual_wants, Decimal::ZERO);
    }

    #[test]
    fn pending_salary_is_not_income() {
        let snap = vec![income(1, 1, "1000", IncomeCategory::Salary, false)];
        let s = summarize(&snap).unwrap();
        assert_eq!(s.total_income, Decimal::ZERO);
        assert_eq!(s.salary_income, Decimal::ZERO);
        assert_eq!(s.incomes.len(), 1);
    }

    #[test]
    fn savings_target_ignores_non_salary_income() {
        let mut snap = sample();
        let before = summarize(&snap).unwrap().savings_target;
        snap.push(income(8, 2, "5000", IncomeCategory::Investments, true));
        assert_eq!(summarize(&snap).unwrap().savings_target, before);
        assert_eq!(before, dec("200"));
    }

    #[test]
    fn incomes_sorted_ascending_and_stable() {
        let snap = vec![
            income(1, 20, "1", IncomeCategory::Salary, true),
            income(2, 5, "1", IncomeCategory::Other, true),
            income(3, 20, "1", IncomeCategory::Freelance, false),
            income(4, 5, "1", IncomeCategory::Salary, true),
        ];
        let ids: Vec<i64> = summarize(&snap).unwrap().incomes.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);

        let mut reversed = snap.clone();
        reversed.reverse();
        let ids: Vec<i64> = summarize(&reversed).unwrap().incomes.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn fill_percent_clamps_and_flags_zero_target() {
        assert_eq!(fill_percent(Bucket::Needs, dec("50"), dec("200")).unwrap(), dec("25"));
        assert_eq!(fill_percent(Bucket::Wants, dec("900"), dec("200")).unwrap(), HUNDRED);
        assert_eq!(
            fill_percent(Bucket::Savings, dec("10"), Decimal::ZERO),
            Err(BudgetError::TargetZero(Bucket::Savings))
        );
    }

    #[test]
    fn fill_percent_saturates_when_ratio_leaves_range() {
        let huge = dec("1000000000000000000000000000");
        let tiny = dec("0.0000000000000000000001");
        assert_eq!(fill_percent(Bucket::Needs, huge, tiny).unwrap(), HUNDRED);
        assert_eq!(fill_percent(Bucket::Needs, -huge, tiny).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn tiny_target_with_large_spend_shows_full_bar() {
        let snap = vec![
            income(1, 1, "2", IncomeCategory::Salary, true),
            expense(2, "1000000000000000000000000000", ExpenseCategory::Rent, Bucket::Needs, true, None),
        ];
        let s = summarize(&snap).unwrap();
        assert_eq!(s.progress(Bucket::Needs).percent, Some(HUNDRED));
    }

    #[test]
    fn totals_past_decimal_range_are_reported() {
        let snap = vec![
            income(1, 1, "60000000000000000000000000000", IncomeCategory::Salary, true),
            income(2, 2, "60000000000000000000000000000", IncomeCategory::Salary, true),
        ];
        assert_eq!(summarize(&snap), Err(BudgetError::Overflow));
        assert_eq!(paychecks(&snap).map(|p| p.len()), Ok(2));

        let spend = vec![
            expense(3, "60000000000000000000000000000", ExpenseCategory::Rent, Bucket::Needs, true, None),
            expense(4, "60000000000000000000000000000", ExpenseCategory::Rent, Bucket::Needs, true, None),
        ];
        assert_eq!(spending_by_category(&spend), Err(BudgetError::Overflow));
    }

    #[test]
    fn rates_split_income_fifty_thirty_twenty() {
        assert_eq!(NEEDS_RATE, dec("0.5"));
        assert_eq!(WANTS_RATE, dec("0.3"));
        assert_eq!(SAVINGS_RATE, dec("0.2"));
    }

    #[test]
    fn progress_reports_bucket_on_zero_target() {
        let s = summarize(&[]).unwrap();
        assert_eq!(s.fill(Bucket::Wants), Err(BudgetError::TargetZero(Bucket::Wants)));
        assert_eq!(s.progress(Bucket::Savings).percent, None);
    }

    #[test]
    fn paycheck_groups_linked_expenses() {
        let cards = paychecks(&sample()).unwrap();
        assert_eq!(cards.len(), 3);
        let salary = cards.iter().find(|p| p.income.id == 1).unwrap();
        let ids: Vec<i64> = salary.expenses.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 5, 7]);
        assert_eq!(salary.planned, dec("750"));
        assert_eq!(salary.funded, dec("250"));
        assert_eq!(salary.remaining, dec("250"));
        assert!(cards[0].expenses.is_empty());
    }

    #[test]
    fn category_breakdown_orders_by_amount() {
        let spend = spending_by_category(&sample()).unwrap();
        let cats: Vec<ExpenseCategory> = spend.iter().map(|c| c.category).collect();
        assert_eq!(
            cats,
            vec![
                ExpenseCategory::Rent,
                ExpenseCategory::Savings,
                ExpenseCategory::Entertainment
            ]
        );
    }

    #[test]
    fn dangling_link_is_reported() {
        let snap = vec![
            income(1, 1, "100", IncomeCategory::Salary, true),
            expense(2, "10", ExpenseCategory::Rent, Bucket::Needs, true, Some(1)),
            expense(3, "10", ExpenseCategory::Rent, Bucket::Needs, true, Some(2)),
        ];
        let issues = validate_snapshot(&snap);
        assert_eq!(
            issues,
            vec![Issue {
                transaction_id: 3,
                error: BudgetError::UnknownIncome(2)
            }]
        );
    }
}
