//! Data store for books.
//!
//! The trait is the seam the repository talks to; [`SqlBookStore`] is the
//! relational implementation. Soft-deleted rows are invisible to every find.

use async_trait::async_trait;
use bookshelf_db::Database;
use time::OffsetDateTime;

use super::models::{Book, BookFields, BookId};

const COLUMNS: &str = "id, title, author, publisher, publish_date, rating, checked_out, \
                       created_at, updated_at, deleted_at";

#[async_trait]
pub trait BookStore: Send + Sync {
    /// The live book with `id`, if any.
    async fn find_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>>;

    /// Every live book in store order.
    async fn find_all(&self) -> anyhow::Result<Vec<Book>>;

    /// Persist a new book; the store assigns the id and timestamps.
    async fn insert(&self, fields: &BookFields) -> anyhow::Result<Book>;

    /// Overwrite the mutable fields of a live book. `None` if it is gone.
    async fn update(&self, book: &Book) -> anyhow::Result<Option<Book>>;

    /// Mark a book deleted.
    async fn delete(&self, book: &Book) -> anyhow::Result<()>;
}

pub struct SqlBookStore {
    db: Database,
}

impl SqlBookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookStore for SqlBookStore {
    async fn find_by_id(&self, id: BookId) -> anyhow::Result<Option<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE id = ? AND deleted_at IS NULL");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(book)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE deleted_at IS NULL ORDER BY id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(self.db.pool())
            .await?;
        Ok(books)
    }

    async fn insert(&self, fields: &BookFields) -> anyhow::Result<Book> {
        let now = OffsetDateTime::now_utc();
        let sql = format!(
            "INSERT INTO books \
             (title, author, publisher, publish_date, rating, checked_out, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(&fields.title)
            .bind(&fields.author)
            .bind(&fields.publisher)
            .bind(&fields.publish_date)
            .bind(fields.rating)
            .bind(fields.checked_out)
            .bind(now)
            .bind(now)
            .fetch_one(self.db.pool())
            .await?;

        tracing::debug!(book_id = book.id, "inserted book");
        Ok(book)
    }

    async fn update(&self, book: &Book) -> anyhow::Result<Option<Book>> {
        let sql = format!(
            "UPDATE books SET \
             title = ?, author = ?, publisher = ?, publish_date = ?, rating = ?, \
             checked_out = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        let fields = &book.fields;
        let updated = sqlx::query_as::<_, Book>(&sql)
            .bind(&fields.title)
            .bind(&fields.author)
            .bind(&fields.publisher)
            .bind(&fields.publish_date)
            .bind(fields.rating)
            .bind(fields.checked_out)
            .bind(OffsetDateTime::now_utc())
            .bind(book.id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, book: &Book) -> anyhow::Result<()> {
        sqlx::query("UPDATE books SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(OffsetDateTime::now_utc())
            .bind(book.id)
            .execute(self.db.pool())
            .await?;

        tracing::debug!(book_id = book.id, "soft-deleted book");
        Ok(())
    }
}
