use crate::domain::value_objects::BookId;

use super::errors::{LoanServiceError, Result};
use super::loan_service::ServiceDependencies;

/// 可用性ガード：この書籍をいま貸し出せるか
///
/// 判定：書籍がカタログに存在して有効であり、かつ未返却の貸出
/// （Active / Overdue）が存在しないこと。
///
/// 読み取り専用で副作用なし。貸出登録はこの関数の結果に依存しては
/// ならない。「確認してから挿入」は並行登録で二重貸出を許す競合に
/// なるため、登録時の強制は台帳の`reserve_and_insert`（原子的予約）
/// が担う。このガードはポリシー、台帳が強制機構。
///
/// # 戻り値
/// 書籍が存在しない・無効・貸出中のいずれでも false。呼び分けが
/// 必要な登録経路は`register_loan`側で個別に判定する。
pub async fn is_book_available(deps: &ServiceDependencies, book_id: BookId) -> Result<bool> {
    let book = deps
        .book_catalog
        .get_book(book_id)
        .await
        .map_err(LoanServiceError::CatalogError)?;

    let active = book.map(|b| b.active).unwrap_or(false);
    if !active {
        return Ok(false);
    }

    let on_loan = deps
        .loan_store
        .has_outstanding_loan(book_id)
        .await
        .map_err(LoanServiceError::StoreError)?;

    Ok(!on_loan)
}
