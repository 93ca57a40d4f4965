use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
///
/// ドメイン条件の違反は型付きのバリアントで表現し、呼び出し側が
/// 例外ではなく値としてすべてのケースを処理できるようにする。
#[derive(Debug, Error)]
pub enum LoanServiceError {
    /// 書籍がカタログに存在しないか、貸出可能でない
    #[error("Book does not exist or is not available")]
    BookUnavailable,

    /// 同じ書籍に未返却の貸出が既に存在する
    #[error("Book is already on loan")]
    LoanConflict,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 既に返却済み
    #[error("Loan has already been returned")]
    AlreadyReturned,

    /// 入力値の検証エラー（境界で回復され、台帳には到達しない）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 貸出台帳のエラー
    #[error("Loan store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 書籍カタログのエラー
    #[error("Book catalog error")]
    CatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanServiceError>;
