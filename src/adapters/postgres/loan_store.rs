use crate::domain::{
    loan::{Loan, LoanStatus, NewLoan},
    value_objects::{BookId, Borrower, Comments, LoanId},
};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, ReserveOutcome, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをLoanに変換する
///
/// statusの文字列からの変換と、borrower/commentsの値オブジェクトへの
/// 変換でエラーハンドリングを行う。保存済みデータが制約を満たさない
/// 場合は破損として扱う。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(invalid_data)?;

    let borrower: String = row.get("borrower");
    let borrower =
        Borrower::new(borrower).map_err(|e| invalid_data(format!("borrower: {:?}", e)))?;

    let comments: Option<String> = row.get("comments");
    let comments = comments
        .map(|c| Comments::new(c).map_err(|e| invalid_data(format!("comments: {:?}", e))))
        .transpose()?;

    Ok(Loan {
        id: LoanId::from_uuid(row.get("id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
        status,
        borrower,
        comments,
        book: None,
    })
}

/// LoanStoreのPostgreSQL実装
///
/// 貸出台帳の永続化層。未返却の貸出に対する部分一意インデックス
/// `loans_one_outstanding_per_book`が「同一書籍の未返却貸出は高々1件」
/// の不変条件をストレージ層で強制する。
pub struct PgLoanStore {
    pool: PgPool,
}

impl PgLoanStore {
    /// PostgreSQLコネクションプールから新しいPgLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for PgLoanStore {
    /// 貸出一覧を貸出日の降順で取得
    ///
    /// include_returnedがfalseの場合は未返却（active / overdue）のみ。
    async fn list(&self, include_returned: bool) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, loan_date, due_date, return_date, status, borrower, comments
            FROM loans
            WHERE $1 OR status IN ('active', 'overdue')
            ORDER BY loan_date DESC
            "#,
        )
        .bind(include_returned)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// IDで貸出を取得
    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, loan_date, due_date, return_date, status, borrower, comments
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 書籍ごとの貸出履歴を貸出日の降順で取得
    async fn list_by_book(&self, book_id: BookId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, loan_date, due_date, return_date, status, borrower, comments
            FROM loans
            WHERE book_id = $1
            ORDER BY loan_date DESC
            "#,
        )
        .bind(book_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// 保存されたステータスで貸出を検索
    async fn list_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, loan_date, due_date, return_date, status, borrower, comments
            FROM loans
            WHERE status = $1
            ORDER BY loan_date DESC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// 原子的予約つき挿入
    ///
    /// 可用性の確認と挿入を2つの独立したステートメントに分けず、
    /// 部分一意インデックスの制約違反として競合を検出する。並行する
    /// 2つの登録のうち一意制約に負けた側がConflictを受け取る。
    async fn reserve_and_insert(&self, loan: NewLoan) -> Result<ReserveOutcome> {
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO loans (book_id, loan_date, due_date, status, borrower, comments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(loan.book_id.value())
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.status.as_str())
        .bind(loan.borrower.as_str())
        .bind(loan.comments.as_ref().map(|c| c.as_str()))
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(id) => Ok(ReserveOutcome::Inserted(LoanId::from_uuid(id))),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(ReserveOutcome::Conflict)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 返却済みへの遷移
    ///
    /// 既に返却済みの行には触れない（`status <> 'returned'`ガード）。
    /// 更新行数0は「存在しない、または既に返却済み」を意味する。
    async fn mark_returned(&self, id: LoanId, returned_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET status = 'returned', return_date = $2
            WHERE id = $1 AND status <> 'returned'
            "#,
        )
        .bind(id.value())
        .bind(returned_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 管理者訂正：返却期限・ステータス・コメントのみ書き換える
    async fn update(&self, loan: &Loan) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET due_date = $2, status = $3, comments = $4
            WHERE id = $1
            "#,
        )
        .bind(loan.id.value())
        .bind(loan.due_date)
        .bind(loan.status.as_str())
        .bind(loan.comments.as_ref().map(|c| c.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 未返却の貸出が存在するか
    async fn has_outstanding_loan(&self, book_id: BookId) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE book_id = $1 AND status IN ('active', 'overdue')
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
