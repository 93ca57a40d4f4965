use crate::application::loan::{
    LoanServiceError, ServiceDependencies, get_loan as execute_get_loan,
    is_book_available as execute_is_book_available, list_loans as execute_list_loans,
    list_loans_by_book as execute_list_loans_by_book,
    list_loans_by_status as execute_list_loans_by_status, register_loan as execute_register_loan,
    register_return as execute_register_return, update_loan as execute_update_loan,
};
use crate::domain::{
    commands::UpdateLoan,
    loan::LoanStatus,
    value_objects::{BookId, LoanId},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        ListLoansQuery, LoanResponse, RegisterLoanRequest, ReturnLoanRequest, UpdateLoanRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST / PUT)
// ============================================================================

/// POST /loans - 新しい貸出を登録
///
/// 強制されるビジネスルール:
/// - 借り手名が空でなく100文字以内であること
/// - 貸出期間が1〜365日であること（省略時14日）
/// - 書籍がカタログに存在して有効であること
/// - 同じ書籍に未返却の貸出が存在しないこと（台帳の原子的予約で強制）
pub async fn register_loan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = req.to_command();

    let loan = execute_register_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// POST /loans/:id/return - 返却を登録
///
/// 強制されるビジネスルール:
/// - 貸出が存在すること
/// - 既に返却済みでないこと
/// - コメントが指定された場合はステータス遷移の前に上書きされること
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    Json(req): Json<ReturnLoanRequest>,
) -> Result<StatusCode, ApiError> {
    let cmd = req.to_command(LoanId::from_uuid(loan_id));

    execute_register_return(&state.service_deps, cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /loans/:id - 貸出を管理者として訂正
///
/// 返却期限・ステータス・コメントのみを書き換える管理パス。
/// パスのIDとボディのIDが一致しない場合は400を返す。
pub async fn update_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    Json(req): Json<UpdateLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    if loan_id != req.id {
        return Err(ApiError::from(LoanServiceError::Validation(
            "Loan id in body does not match the id in the URL".to_string(),
        )));
    }

    let status = req
        .status
        .parse::<LoanStatus>()
        .map_err(LoanServiceError::Validation)?;

    let cmd = UpdateLoan {
        loan_id: LoanId::from_uuid(loan_id),
        due_date: req.due_date,
        status,
        comments: req.comments,
    };

    let loan = execute_update_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans - 貸出一覧を取得
///
/// クエリパラメータ:
/// - include_returned: 返却済みも含めるか（省略時false、未返却のみ）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let include_returned = query.include_returned.unwrap_or(false);

    let loans = execute_list_loans(&state.service_deps, include_returned).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/:id - 貸出詳細をIDで取得
///
/// 見つかった場合は貸出情報を返し、見つからない場合は404を返す。
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = execute_get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// GET /loans/book/:book_id - 書籍ごとの貸出履歴を取得
pub async fn list_loans_by_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans =
        execute_list_loans_by_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/status/:status - ステータスで貸出を絞り込む
///
/// 受け付ける値: active, returned, overdue（大文字小文字は区別しない）。
/// overdueは読み取り時の導出分類を含む（期限超過のactiveも返る）。
pub async fn list_loans_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let status = status
        .parse::<LoanStatus>()
        .map_err(LoanServiceError::Validation)?;

    let loans = execute_list_loans_by_status(&state.service_deps, status).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/available/:book_id - 書籍の貸出可否を確認
///
/// 書籍が存在して有効、かつ未返却の貸出がない場合にtrueを返す。
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<bool>, ApiError> {
    let available =
        execute_is_book_available(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(available))
}
