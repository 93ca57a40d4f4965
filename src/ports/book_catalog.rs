use crate::domain::{book::BookSnapshot, value_objects::BookId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Book catalog port for catalog context operations.
///
/// This port maintains context boundaries between the lending and catalog
/// contexts. The lending context holds BookId references and receives
/// read-only snapshots; it never creates, updates or deletes catalog
/// records.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Look up a book by id.
    ///
    /// Returns None when the catalog has no record for the id. The
    /// snapshot's `active` flag distinguishes lendable books from
    /// withdrawn ones.
    async fn get_book(&self, book_id: BookId) -> Result<Option<BookSnapshot>>;
}
