use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, check_availability, get_loan, list_loans, list_loans_by_book, list_loans_by_status,
    register_loan, return_loan, update_loan,
};

/// Creates the API router with all lending endpoints
///
/// Query endpoints (Read operations):
/// - GET /loans - List loans (outstanding only, unless include_returned)
/// - GET /loans/:id - Get loan details
/// - GET /loans/book/:book_id - Loan history of a book
/// - GET /loans/status/:status - Filter loans by status
/// - GET /loans/available/:book_id - Check whether a book can be lent
///
/// Command endpoints (Write operations):
/// - POST /loans - Register a new loan
/// - POST /loans/:id/return - Register a return
/// - PUT /loans/:id - Administrative correction of a loan
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Query endpoints (Read operations)
        .route("/loans", get(list_loans))
        .route("/loans/:id", get(get_loan))
        .route("/loans/book/:book_id", get(list_loans_by_book))
        .route("/loans/status/:status", get(list_loans_by_status))
        .route("/loans/available/:book_id", get(check_availability))
        // Command endpoints (Write operations)
        .route("/loans", post(register_loan))
        .route("/loans/:id/return", post(return_loan))
        .route("/loans/:id", put(update_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
