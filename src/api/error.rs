use crate::application::loan::LoanServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanServiceError);

impl From<LoanServiceError> for ApiError {
    fn from(err: LoanServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 400 Bad Request - 入力値の検証エラー
            LoanServiceError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            LoanServiceError::LoanNotFound => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "Loan not found".to_string(),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            LoanServiceError::BookUnavailable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BOOK_UNAVAILABLE",
                "Book does not exist or is not available".to_string(),
            ),
            LoanServiceError::LoanConflict => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "LOAN_CONFLICT",
                "Book is already on loan".to_string(),
            ),
            LoanServiceError::AlreadyReturned => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ALREADY_RETURNED",
                "Loan has already been returned".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LoanServiceError::StoreError(ref e) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Loan store error".to_string(),
                )
            }
            LoanServiceError::CatalogError(ref e) => {
                tracing::error!("Book catalog error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BOOK_CATALOG_ERROR",
                    "Book catalog error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
