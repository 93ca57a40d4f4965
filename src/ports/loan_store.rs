use crate::domain::{
    loan::{Loan, LoanStatus, NewLoan},
    value_objects::{BookId, LoanId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Outcome of the atomic reserve-and-insert operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The loan was inserted; the store assigned this id.
    Inserted(LoanId),
    /// An outstanding loan for the same book already exists.
    Conflict,
}

/// Loan ledger port - the storage boundary for loan records.
///
/// Loans are an audit trail: records are never physically deleted.
/// Correctness of the one-outstanding-loan-per-book invariant is enforced
/// here, not in process memory, because multiple service instances may
/// share one store.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// List loans, most recent loan date first.
    ///
    /// With `include_returned = false` only outstanding loans
    /// (active or overdue) are returned.
    async fn list(&self, include_returned: bool) -> Result<Vec<Loan>>;

    /// Get a single loan by id.
    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// List the loan history of one book, most recent first.
    async fn list_by_book(&self, book_id: BookId) -> Result<Vec<Loan>>;

    /// List loans by stored status, most recent first.
    ///
    /// Matches the persisted status column only; read-time overdue
    /// classification is the caller's concern.
    async fn list_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>>;

    /// Atomically check availability and insert a new loan.
    ///
    /// The availability check and the insert MUST be one indivisible
    /// storage operation (a uniqueness constraint over outstanding loans
    /// per book, or a serializable re-check inside the write). Evaluating
    /// availability first and inserting second is a check-then-act race:
    /// two concurrent registrations for the same book could both succeed.
    ///
    /// Returns `ReserveOutcome::Conflict` when an outstanding loan for the
    /// book already exists.
    async fn reserve_and_insert(&self, loan: NewLoan) -> Result<ReserveOutcome>;

    /// Transition a loan to returned, setting its return date.
    ///
    /// Returns false when no loan with the id exists. A loan that is
    /// already returned is left untouched and reported as false; the
    /// lifecycle layer rejects that case before calling here.
    async fn mark_returned(&self, id: LoanId, returned_at: DateTime<Utc>) -> Result<bool>;

    /// Administrative update of due date, status and comments.
    ///
    /// Only those three fields are written; loan date, return date and
    /// borrower are immutable through this path. Returns false when no
    /// loan with the id exists.
    async fn update(&self, loan: &Loan) -> Result<bool>;

    /// Whether the book currently has an outstanding (active or overdue)
    /// loan. Read-only; registration must use `reserve_and_insert`
    /// instead of checking this first.
    async fn has_outstanding_loan(&self, book_id: BookId) -> Result<bool>;
}
