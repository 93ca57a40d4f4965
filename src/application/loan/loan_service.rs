use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::domain::{
    self, Borrower, Comments, LoanPeriod,
    commands::{RegisterLoan, RegisterReturn, UpdateLoan},
    loan::{Loan, LoanStatus},
    value_objects::{BookId, LoanId},
};
use crate::ports::{BookCatalog, LoanStore, ReserveOutcome};

use super::errors::{LoanServiceError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_store: Arc<dyn LoanStore>,
    pub book_catalog: Arc<dyn BookCatalog>,
}

/// 表示用にカタログのスナップショットを付与するヘルパー関数
///
/// カタログに書籍が存在しない場合はスナップショットなしで返す
/// （貸出は監査証跡であり、除籍済みの書籍の貸出履歴も表示される）。
async fn with_book(deps: &ServiceDependencies, mut loan: Loan) -> Result<Loan> {
    loan.book = deps
        .book_catalog
        .get_book(loan.book_id)
        .await
        .map_err(LoanServiceError::CatalogError)?;
    Ok(loan)
}

/// 読み取り経路の共通処理：延滞分類とスナップショット付与
async fn present(deps: &ServiceDependencies, loan: Loan) -> Result<Loan> {
    with_book(deps, domain::loan::classified(loan, Utc::now())).await
}

/// コメントの生値を検証して値オブジェクトに変換する
fn parse_comments(comments: Option<String>) -> Result<Option<Comments>> {
    comments
        .map(|c| {
            Comments::new(c)
                .map_err(|e| LoanServiceError::Validation(format!("comments: {:?}", e)))
        })
        .transpose()
}

/// 貸出を登録する
///
/// ビジネスルール：
/// - 借り手名は空でなく100文字以内
/// - 貸出期間は1〜365日（省略時14日）
/// - 書籍がカタログに存在して有効であること
/// - 同じ書籍に未返却の貸出が存在しないこと
///
/// 可用性の確認と挿入は台帳の`reserve_and_insert`で単一の原子的
/// 操作として実行される。確認と挿入を分けると、同じ書籍への並行
/// リクエストが両方とも「貸出可能」を観測して二重貸出になる。
///
/// # 戻り値
/// 成功時は永続化された貸出（台帳が採番したIDと正準のタイムスタンプ
/// を返すため、挿入後に再読み込みする）
pub async fn register_loan(deps: &ServiceDependencies, cmd: RegisterLoan) -> Result<Loan> {
    // 1. 入力値の検証（台帳に到達する前に失敗させる）
    let borrower = Borrower::new(cmd.borrower)
        .map_err(|e| LoanServiceError::Validation(format!("borrower: {:?}", e)))?;
    let period = LoanPeriod::new(cmd.loan_period_days)
        .map_err(|e| LoanServiceError::Validation(format!("loan_period_days: {:?}", e)))?;
    let comments = parse_comments(cmd.comments)?;

    // 2. 書籍の存在・有効性確認
    let book = deps
        .book_catalog
        .get_book(cmd.book_id)
        .await
        .map_err(LoanServiceError::CatalogError)?;

    if !book.map(|b| b.active).unwrap_or(false) {
        return Err(LoanServiceError::BookUnavailable);
    }

    // 3. ドメイン層の純粋関数で未採番レコードを構築
    let new_loan = domain::loan::open_loan(cmd.book_id, borrower, period, comments, cmd.requested_at);

    // 4. 原子的予約つき挿入（可用性の確認と挿入は不可分）
    let loan_id = match deps
        .loan_store
        .reserve_and_insert(new_loan)
        .await
        .map_err(LoanServiceError::StoreError)?
    {
        ReserveOutcome::Inserted(id) => id,
        ReserveOutcome::Conflict => return Err(LoanServiceError::LoanConflict),
    };

    // 5. 採番されたIDと正準のタイムスタンプを返すため再読み込み
    let created = deps
        .loan_store
        .get_by_id(loan_id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    present(deps, created).await
}

/// 返却を登録する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 既に返却済みでないこと（2回目の返却は拒否され、返却日は変わらない）
/// - 延滞していても返却は受け付ける
///
/// コメントが指定され空白でない場合、ステータス遷移の前に貸出の
/// コメントを上書きする。コメント更新とステータス書き込みは単一
/// トランザクションではなく2段階の更新として実行される（最も単純な
/// ストレージバックエンドとの互換を保つため）。
pub async fn register_return(deps: &ServiceDependencies, cmd: RegisterReturn) -> Result<()> {
    let loan = deps
        .loan_store
        .get_by_id(cmd.loan_id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    // 状態機械の確認（Returnedからの再返却を拒否）
    if let Err(domain::ReturnLoanError::AlreadyReturned) =
        domain::loan::close_loan(&loan, cmd.returned_at)
    {
        return Err(LoanServiceError::AlreadyReturned);
    }

    // 第1段階：空白でないコメントのみ上書き（ステータスは未変更のまま）
    if let Some(comments) = parse_comments(cmd.comments)? {
        if !comments.is_blank() {
            let annotated = Loan {
                comments: Some(comments),
                ..loan
            };
            deps.loan_store
                .update(&annotated)
                .await
                .map_err(LoanServiceError::StoreError)?;
        }
    }

    // 第2段階：ステータス遷移と返却日の設定
    let marked = deps
        .loan_store
        .mark_returned(cmd.loan_id, cmd.returned_at)
        .await
        .map_err(LoanServiceError::StoreError)?;

    // 貸出は物理削除されないため、存在確認後に更新行数0となるのは
    // 並行する返却に先を越された場合のみ
    if !marked {
        return Err(LoanServiceError::AlreadyReturned);
    }

    Ok(())
}

/// 貸出を管理者として訂正する
///
/// 可用性ガードを迂回する管理パス：返却期限・ステータス・コメント
/// のみを書き換える。ステータスをActiveに戻す場合でも同一書籍の
/// 他の貸出との整合（未返却は高々1件）は再検証しない。
pub async fn update_loan(deps: &ServiceDependencies, cmd: UpdateLoan) -> Result<Loan> {
    let comments = parse_comments(cmd.comments)?;

    let existing = deps
        .loan_store
        .get_by_id(cmd.loan_id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    let corrected = Loan {
        due_date: cmd.due_date,
        status: cmd.status,
        comments,
        ..existing
    };

    let updated = deps
        .loan_store
        .update(&corrected)
        .await
        .map_err(LoanServiceError::StoreError)?;

    if !updated {
        return Err(LoanServiceError::LoanNotFound);
    }

    let reread = deps
        .loan_store
        .get_by_id(cmd.loan_id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    present(deps, reread).await
}

/// 貸出をIDで取得する
pub async fn get_loan(deps: &ServiceDependencies, id: LoanId) -> Result<Loan> {
    let loan = deps
        .loan_store
        .get_by_id(id)
        .await
        .map_err(LoanServiceError::StoreError)?
        .ok_or(LoanServiceError::LoanNotFound)?;

    present(deps, loan).await
}

/// 貸出一覧を取得する
///
/// `include_returned = false`の場合は未返却（Active / Overdue）のみ。
pub async fn list_loans(deps: &ServiceDependencies, include_returned: bool) -> Result<Vec<Loan>> {
    let loans = deps
        .loan_store
        .list(include_returned)
        .await
        .map_err(LoanServiceError::StoreError)?;

    try_join_all(loans.into_iter().map(|loan| present(deps, loan))).await
}

/// 書籍ごとの貸出履歴を取得する
pub async fn list_loans_by_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Vec<Loan>> {
    let loans = deps
        .loan_store
        .list_by_book(book_id)
        .await
        .map_err(LoanServiceError::StoreError)?;

    try_join_all(loans.into_iter().map(|loan| present(deps, loan))).await
}

/// ステータスで貸出を絞り込む
///
/// Overdue は読み取り時の導出分類のため、保存値だけでは検索できない：
/// 保存値がActiveで期限超過の貸出はOverdueとして扱い、逆にActiveの
/// 検索からは除外する。保存値がOverdueの行（管理者訂正由来）も尊重する。
pub async fn list_loans_by_status(
    deps: &ServiceDependencies,
    status: LoanStatus,
) -> Result<Vec<Loan>> {
    let loans = match status {
        LoanStatus::Returned => deps
            .loan_store
            .list_by_status(LoanStatus::Returned)
            .await
            .map_err(LoanServiceError::StoreError)?,
        LoanStatus::Active | LoanStatus::Overdue => {
            let now = Utc::now();
            let mut outstanding = deps
                .loan_store
                .list_by_status(LoanStatus::Active)
                .await
                .map_err(LoanServiceError::StoreError)?;
            outstanding.extend(
                deps.loan_store
                    .list_by_status(LoanStatus::Overdue)
                    .await
                    .map_err(LoanServiceError::StoreError)?,
            );

            let mut matched: Vec<Loan> = outstanding
                .into_iter()
                .map(|loan| domain::loan::classified(loan, now))
                .filter(|loan| loan.status == status)
                .collect();
            matched.sort_by(|a, b| b.loan_date.cmp(&a.loan_date));
            matched
        }
    };

    try_join_all(loans.into_iter().map(|loan| present(deps, loan))).await
}
