use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    book::BookSnapshot,
    commands::{RegisterLoan, RegisterReturn},
    loan::Loan,
    value_objects::{BookId, LoanId, LoanPeriod},
};

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 返却済みの貸出も含めるか（省略時は未返却のみ）
    pub include_returned: Option<bool>,
}

fn default_loan_period_days() -> u16 {
    LoanPeriod::DEFAULT_DAYS
}

/// 貸出登録リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
pub struct RegisterLoanRequest {
    pub book_id: Uuid,
    pub borrower: String,
    /// 貸出期間（日数、1〜365、省略時14）
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: u16,
    pub comments: Option<String>,
}

impl RegisterLoanRequest {
    pub fn to_command(&self) -> RegisterLoan {
        RegisterLoan {
            book_id: BookId::from_uuid(self.book_id),
            borrower: self.borrower.clone(),
            loan_period_days: self.loan_period_days,
            comments: self.comments.clone(),
            requested_at: Utc::now(),
        }
    }
}

/// 返却登録リクエスト（POST /loans/:id/return）
#[derive(Debug, Deserialize)]
pub struct ReturnLoanRequest {
    pub comments: Option<String>,
}

impl ReturnLoanRequest {
    pub fn to_command(&self, loan_id: LoanId) -> RegisterReturn {
        RegisterReturn {
            loan_id,
            comments: self.comments.clone(),
            returned_at: Utc::now(),
        }
    }
}

/// 貸出訂正リクエスト（PUT /loans/:id）
#[derive(Debug, Deserialize)]
pub struct UpdateLoanRequest {
    pub id: Uuid,
    pub due_date: DateTime<Utc>,
    pub status: String,
    pub comments: Option<String>,
}

/// 書籍スナップショットのレスポンス表現
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub active: bool,
}

impl From<BookSnapshot> for BookResponse {
    fn from(book: BookSnapshot) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            isbn: book.isbn,
            publisher: book.publisher,
            active: book.active,
        }
    }
}

/// 貸出レスポンス（取得・一覧・登録・訂正で共通）
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: String,
    pub borrower: String,
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookResponse>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.value(),
            book_id: loan.book_id.value(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            status: loan.status.as_str().to_string(),
            borrower: loan.borrower.as_str().to_string(),
            comments: loan.comments.map(|c| c.as_str().to_string()),
            book: loan.book.map(BookResponse::from),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
