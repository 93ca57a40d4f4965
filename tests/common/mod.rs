#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use rusty_lending::domain::loan::{Loan, LoanStatus, NewLoan};
use rusty_lending::domain::value_objects::{BookId, LoanId};
use rusty_lending::ports::loan_store::{self, LoanStore, ReserveOutcome};

/// インメモリLoanStore実装（テスト用）
///
/// 単一のMutexの臨界区域の中で可用性確認と挿入を行うことで、
/// `reserve_and_insert`の原子性の契約を満たす。Postgres実装では
/// 部分一意インデックスが同じ役割を担う。
pub struct InMemoryLoanStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }

    /// テストの検証用に保存済みレコードを直接読む
    pub fn stored(&self, id: LoanId) -> Option<Loan> {
        self.loans.lock().unwrap().get(&id).cloned()
    }

    /// テストの検証用に全レコード数を返す
    pub fn len(&self) -> usize {
        self.loans.lock().unwrap().len()
    }
}

impl Default for InMemoryLoanStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_by_loan_date_desc(mut loans: Vec<Loan>) -> Vec<Loan> {
    loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date));
    loans
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn list(&self, include_returned: bool) -> loan_store::Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(sorted_by_loan_date_desc(
            loans
                .values()
                .filter(|l| include_returned || l.status.is_outstanding())
                .cloned()
                .collect(),
        ))
    }

    async fn get_by_id(&self, id: LoanId) -> loan_store::Result<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_book(&self, book_id: BookId) -> loan_store::Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(sorted_by_loan_date_desc(
            loans
                .values()
                .filter(|l| l.book_id == book_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_status(&self, status: LoanStatus) -> loan_store::Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap();
        Ok(sorted_by_loan_date_desc(
            loans
                .values()
                .filter(|l| l.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn reserve_and_insert(&self, loan: NewLoan) -> loan_store::Result<ReserveOutcome> {
        // 確認と挿入を同じロックの中で行う（原子的予約）
        let mut loans = self.loans.lock().unwrap();

        let outstanding_exists = loans
            .values()
            .any(|l| l.book_id == loan.book_id && l.status.is_outstanding());
        if outstanding_exists {
            return Ok(ReserveOutcome::Conflict);
        }

        let id = LoanId::new();
        loans.insert(
            id,
            Loan {
                id,
                book_id: loan.book_id,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                return_date: None,
                status: loan.status,
                borrower: loan.borrower,
                comments: loan.comments,
                book: None,
            },
        );

        Ok(ReserveOutcome::Inserted(id))
    }

    async fn mark_returned(
        &self,
        id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> loan_store::Result<bool> {
        let mut loans = self.loans.lock().unwrap();
        match loans.get_mut(&id) {
            Some(loan) if !loan.status.is_returned() => {
                loan.status = LoanStatus::Returned;
                loan.return_date = Some(returned_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update(&self, updated: &Loan) -> loan_store::Result<bool> {
        let mut loans = self.loans.lock().unwrap();
        match loans.get_mut(&updated.id) {
            Some(loan) => {
                // 管理者訂正で書き換わるのは3フィールドのみ
                loan.due_date = updated.due_date;
                loan.status = updated.status;
                loan.comments = updated.comments.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn has_outstanding_loan(&self, book_id: BookId) -> loan_store::Result<bool> {
        let loans = self.loans.lock().unwrap();
        Ok(loans
            .values()
            .any(|l| l.book_id == book_id && l.status.is_outstanding()))
    }
}
