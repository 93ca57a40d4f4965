mod availability;
mod errors;
mod loan_service;

pub use availability::is_book_available;
pub use errors::{LoanServiceError, Result};
pub use loan_service::{
    ServiceDependencies, get_loan, list_loans, list_loans_by_book, list_loans_by_status,
    register_loan, register_return, update_loan,
};
