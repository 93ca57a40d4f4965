use serde::{Deserialize, Serialize};

use super::value_objects::BookId;

/// カタログ管理コンテキストの書籍スナップショット
///
/// 貸出コンテキストは書籍を所有しない。表示用に非正規化された
/// 読み取り専用のコピーであり、この型を通じてカタログ側を
/// 更新することはない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub id: BookId,
    pub title: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    /// カタログ上で有効か（絶版・除籍は false）
    pub active: bool,
}
