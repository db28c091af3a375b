//! HTTP handlers for the books module.
//!
//! Every handler receives the repository through typed router state. Any
//! path or method not listed in [`router`] answers a bare 404.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::{Book, BookFields, BookId};
use super::repository::BookRepository;
use super::validation::{validate, Diagnostics};

impl From<Diagnostics> for AppError {
    fn from(diagnostics: Diagnostics) -> Self {
        AppError::validation(diagnostics)
    }
}

/// Route table for `/books` and `/books/{id}`.
pub fn router(repository: BookRepository) -> Router {
    Router::new()
        .route(
            "/books",
            get(list_books).post(create_book).fallback(not_found),
        )
        .route(
            "/books/{id}",
            get(get_book)
                .put(update_book)
                .delete(delete_book)
                .fallback(not_found),
        )
        .with_state(repository)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Ids that are not integers can never name a book.
fn parse_id(raw: &str) -> Result<BookId, AppError> {
    raw.parse::<BookId>()
        .map_err(|_| AppError::not_found(format!("book '{raw}'")))
}

fn parse_payload(body: &[u8]) -> Result<BookFields, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(%err, "malformed book payload");
        AppError::from(Diagnostics::malformed_body(&err))
    })
}

async fn list_books(State(repository): State<BookRepository>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(repository.find_all().await?))
}

async fn get_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(repository.find_one(id).await?))
}

async fn create_book(
    State(repository): State<BookRepository>,
    body: Bytes,
) -> Result<Json<Book>, AppError> {
    let candidate = parse_payload(&body)?;
    validate(&candidate)?;

    let book = repository.create(&candidate).await?;
    Ok(Json(book))
}

async fn update_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    let mut book = repository.find_one(id).await?;
    let patch = parse_payload(&body)?;

    // Only a supplied date or rating triggers validation; over-long text
    // sent on its own is merged unchecked.
    if !patch.publish_date.is_empty() || patch.rating != 0 {
        validate(&patch)?;
    }

    book.fields.merge(patch);
    let saved = repository.save(&book).await?;
    Ok(Json(saved))
}

async fn delete_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(repository.delete(id).await?))
}
