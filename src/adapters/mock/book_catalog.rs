use crate::domain::{book::BookSnapshot, value_objects::BookId};
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// BookCatalogのモック実装
///
/// 書籍スナップショットを保存することで状態を持ったテストをサポート。
/// 有効・無効どちらの書籍も登録可能。
pub struct BookCatalog {
    books: Mutex<HashMap<BookId, BookSnapshot>>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に貸出可能な書籍を登録
    pub fn add_active_book(&self, book_id: BookId, title: impl Into<String>) {
        self.add_book(BookSnapshot {
            id: book_id,
            title: title.into(),
            isbn: None,
            publisher: None,
            active: true,
        });
    }

    /// テスト用に無効（除籍済み）の書籍を登録
    pub fn add_inactive_book(&self, book_id: BookId, title: impl Into<String>) {
        self.add_book(BookSnapshot {
            id: book_id,
            title: title.into(),
            isbn: None,
            publisher: None,
            active: false,
        });
    }

    pub fn add_book(&self, book: BookSnapshot) {
        self.books.lock().unwrap().insert(book.id, book);
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookCatalogTrait for BookCatalog {
    /// 登録された書籍のスナップショットを返す
    async fn get_book(&self, book_id: BookId) -> Result<Option<BookSnapshot>> {
        Ok(self.books.lock().unwrap().get(&book_id).cloned())
    }
}
