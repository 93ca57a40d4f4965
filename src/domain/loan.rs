use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::book::BookSnapshot;
use super::{Borrower, Comments, LoanPeriod, ReturnLoanError, value_objects::{BookId, LoanId}};

/// 貸出ステータス
///
/// Active → Returned が唯一のライフサイクル遷移。
/// Overdue は読み取り時に`classify`で導出される分類であり、
/// 貸出処理がこの値を書き込むことはない（管理者訂正は例外）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }

    /// 未返却か（Active または Overdue）
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
            LoanStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "returned" => Ok(LoanStatus::Returned),
            "overdue" => Ok(LoanStatus::Overdue),
            other => Err(format!(
                "Invalid loan status '{}' (expected: active, returned, overdue)",
                other
            )),
        }
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 不変条件：
/// - due_date > loan_date（LoanPeriodが1日以上のため構成上保証）
/// - return_date は status が Returned のときに限り Some
/// - 同一書籍の未返却貸出は高々1件（ストレージ層の原子的予約で強制）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子（台帳が採番する）
    pub id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,

    // 貸出管理の責務
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,

    // 借り手情報
    pub borrower: Borrower,
    pub comments: Option<Comments>,

    /// 表示用に読み取り時に付与されるカタログのスナップショット。
    /// この参照を通じてカタログを更新することはない。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookSnapshot>,
}

/// 未採番の貸出レコード（台帳への挿入ペイロード）
///
/// IDは台帳（LoanStore）が挿入時に採番する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub book_id: BookId,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub borrower: Borrower,
    pub comments: Option<Comments>,
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 返却期限は貸出日 + 貸出期間
/// - 状態はActive
///
/// 副作用なし。台帳へ挿入する未採番レコードを返す。
pub fn open_loan(
    book_id: BookId,
    borrower: Borrower,
    period: LoanPeriod,
    comments: Option<Comments>,
    loan_date: DateTime<Utc>,
) -> NewLoan {
    NewLoan {
        book_id,
        loan_date,
        due_date: loan_date + period.duration(),
        status: LoanStatus::Active,
        borrower,
        comments,
    }
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 既に返却済みの貸出は返却不可
/// - 延滞していても返却は受け付ける
///
/// 副作用なし。返却済み状態の新しいLoanを返す。
pub fn close_loan(loan: &Loan, returned_at: DateTime<Utc>) -> Result<Loan, ReturnLoanError> {
    if loan.status.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        status: LoanStatus::Returned,
        return_date: Some(returned_at),
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定つきステータス分類
///
/// Active かつ返却期限を過ぎている場合に Overdue を返す。
/// それ以外は保存されたステータスをそのまま返す。
/// 保存状態を変更しない読み取り時の分類であり、一覧・取得系の
/// すべての読み取り経路で適用される。
pub fn classify(loan: &Loan, now: DateTime<Utc>) -> LoanStatus {
    match loan.status {
        LoanStatus::Active if now > loan.due_date => LoanStatus::Overdue,
        status => status,
    }
}

/// 分類結果をレコードに反映した読み取り用ビューを返す
pub fn classified(mut loan: Loan, now: DateTime<Utc>) -> Loan {
    loan.status = classify(&loan, now);
    loan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn borrower(name: &str) -> Borrower {
        Borrower::new(name).unwrap()
    }

    // TDD: open_loan() のテスト
    #[test]
    fn test_open_loan_computes_due_date_from_period() {
        let book_id = BookId::new();
        let loan_date = Utc::now();
        let period = LoanPeriod::new(14).unwrap();

        let loan = open_loan(book_id, borrower("Ana"), period, None, loan_date);

        // 返却期限は貸出日 + 14日間
        assert_eq!(loan.due_date, loan_date + Duration::days(14));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.book_id, book_id);
        assert_eq!(loan.borrower.as_str(), "Ana");
        assert!(loan.comments.is_none());
    }

    #[test]
    fn test_open_loan_due_date_is_strictly_after_loan_date() {
        // 最短の期間（1日）でも期限は貸出日より後
        let loan_date = Utc::now();
        let period = LoanPeriod::new(1).unwrap();

        let loan = open_loan(BookId::new(), borrower("Luis"), period, None, loan_date);

        assert!(loan.due_date > loan.loan_date);
    }

    fn active_loan(loan_date: DateTime<Utc>, period_days: u16) -> Loan {
        let new_loan = open_loan(
            BookId::new(),
            borrower("Ana"),
            LoanPeriod::new(period_days).unwrap(),
            None,
            loan_date,
        );
        Loan {
            id: LoanId::new(),
            book_id: new_loan.book_id,
            loan_date: new_loan.loan_date,
            due_date: new_loan.due_date,
            return_date: None,
            status: new_loan.status,
            borrower: new_loan.borrower,
            comments: new_loan.comments,
            book: None,
        }
    }

    // TDD: close_loan() のテスト
    #[test]
    fn test_close_loan_sets_status_and_return_date() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);
        let returned_at = loan_date + Duration::days(7);

        let returned = close_loan(&loan, returned_at).unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(returned_at));
        // 返却日が設定されるのはReturnedのときのみ
        assert!(loan.return_date.is_none());
    }

    #[test]
    fn test_close_loan_accepts_overdue_loan() {
        let loan_date = Utc::now() - Duration::days(30);
        let loan = active_loan(loan_date, 14);
        let returned_at = Utc::now();

        let returned = close_loan(&loan, returned_at).unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(returned_at));
    }

    #[test]
    fn test_close_loan_fails_when_already_returned() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);
        let returned = close_loan(&loan, loan_date + Duration::days(7)).unwrap();

        // 2回目の返却は失敗し、返却日は変わらない
        let result = close_loan(&returned, loan_date + Duration::days(8));
        assert_eq!(result.unwrap_err(), ReturnLoanError::AlreadyReturned);
        assert_eq!(returned.return_date, Some(loan_date + Duration::days(7)));
    }

    // TDD: classify() のテスト
    #[test]
    fn test_classify_active_before_due_date() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);

        assert_eq!(classify(&loan, loan_date + Duration::days(7)), LoanStatus::Active);
    }

    #[test]
    fn test_classify_active_after_due_date_is_overdue() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);

        assert_eq!(classify(&loan, loan_date + Duration::days(20)), LoanStatus::Overdue);
    }

    #[test]
    fn test_classify_returned_ignores_due_date() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);
        let returned = close_loan(&loan, loan_date + Duration::days(20)).unwrap();

        // 返却済みなら期限を過ぎていてもReturnedのまま
        assert_eq!(
            classify(&returned, loan_date + Duration::days(30)),
            LoanStatus::Returned
        );
    }

    #[test]
    fn test_classify_does_not_mutate_stored_status() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);

        let _ = classify(&loan, loan_date + Duration::days(20));
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_classified_view_carries_derived_status() {
        let loan_date = Utc::now();
        let loan = active_loan(loan_date, 14);

        let view = classified(loan, loan_date + Duration::days(20));
        assert_eq!(view.status, LoanStatus::Overdue);
        // 導出ステータスでも返却日は未設定のまま
        assert!(view.return_date.is_none());
    }

    // LoanStatus のテスト
    #[test]
    fn test_status_round_trips_through_str() {
        for status in [LoanStatus::Active, LoanStatus::Returned, LoanStatus::Overdue] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Active".parse::<LoanStatus>().unwrap(), LoanStatus::Active);
        assert_eq!("OVERDUE".parse::<LoanStatus>().unwrap(), LoanStatus::Overdue);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("lost".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_outstanding_covers_active_and_overdue() {
        assert!(LoanStatus::Active.is_outstanding());
        assert!(LoanStatus::Overdue.is_outstanding());
        assert!(!LoanStatus::Returned.is_outstanding());
    }
}
