use std::sync::Arc;

use bookshelf_http::error::AppError;
use thiserror::Error;

use super::models::{Book, BookFields, BookId};
use super::store::BookStore;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("book store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::not_found(format!("book {id}")),
            RepositoryError::Store(e) => AppError::Internal(e),
        }
    }
}

/// Book persistence as seen by the request handlers.
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct BookRepository {
    store: Arc<dyn BookStore>,
}

impl BookRepository {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn find_one(&self, id: BookId) -> Result<Book, RepositoryError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    pub async fn find_all(&self) -> Result<Vec<Book>, RepositoryError> {
        Ok(self.store.find_all().await?)
    }

    pub async fn create(&self, fields: &BookFields) -> Result<Book, RepositoryError> {
        let book = self.store.insert(fields).await?;
        tracing::info!(book_id = book.id, "book created");
        Ok(book)
    }

    /// Persist the mutable fields of `book`, keyed by its id.
    pub async fn save(&self, book: &Book) -> Result<Book, RepositoryError> {
        let saved = self
            .store
            .update(book)
            .await?
            .ok_or(RepositoryError::NotFound(book.id))?;
        tracing::info!(book_id = saved.id, "book updated");
        Ok(saved)
    }

    /// Soft-delete the book with `id`, returning it as it was beforehand.
    pub async fn delete(&self, id: BookId) -> Result<Book, RepositoryError> {
        let book = self.find_one(id).await?;
        self.store.delete(&book).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(book)
    }
}
