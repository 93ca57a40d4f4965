use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, LoanStatus};

/// コマンド：貸出を登録する
///
/// 借り手名・期間・コメントは未検証の生値で受け取り、
/// アプリケーション層が値オブジェクトへの変換時に検証する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterLoan {
    pub book_id: BookId,
    pub borrower: String,
    pub loan_period_days: u16,
    pub comments: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：返却を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterReturn {
    pub loan_id: LoanId,
    pub comments: Option<String>,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：貸出を管理者として訂正する
///
/// 可用性ガードを迂回する管理パス。返却期限・ステータス・コメント
/// のみを書き換える。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLoan {
    pub loan_id: LoanId,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub comments: Option<String>,
}
