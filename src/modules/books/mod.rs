pub mod merge;
pub mod models;
pub mod repository;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{Database, InitCtx, Migration, Module};
use serde_json::json;

use repository::BookRepository;
use store::SqlBookStore;

const CREATE_BOOKS: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        title        TEXT    NOT NULL DEFAULT '',
        author       TEXT    NOT NULL DEFAULT '',
        publisher    TEXT    NOT NULL DEFAULT '',
        publish_date TEXT    NOT NULL DEFAULT '',
        rating       INTEGER NOT NULL DEFAULT 0,
        checked_out  BOOLEAN NOT NULL DEFAULT 0,
        created_at   TEXT    NOT NULL,
        updated_at   TEXT    NOT NULL,
        deleted_at   TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_books_deleted_at ON books(deleted_at);
"#;

/// Book catalogue: CRUD over `/books`
pub struct BooksModule {
    repository: BookRepository,
}

impl BooksModule {
    pub fn new(repository: BookRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        ctx.db.ping().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let diagnostics = json!({
            "description": "Validation failed",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Diagnostics" }
                }
            }
        });
        let not_found = json!({ "description": "No live book with this id" });
        let internal = json!({
            "description": "Store failure",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let ok_book = json!({
            "description": "The book",
            "content": { "application/json": { "schema": book_ref } }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let payload = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookFields" }
                }
            }
        });
        let text = |description: &str| {
            json!({ "type": "string", "maxLength": 255, "description": description })
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every live book",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book_ref }
                                    }
                                }
                            },
                            "500": internal
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": payload,
                        "responses": {
                            "200": ok_book,
                            "400": diagnostics,
                            "500": internal
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": { "200": ok_book, "404": not_found, "500": internal }
                    },
                    "put": {
                        "summary": "Update a book with the non-empty fields of the payload",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": payload,
                        "responses": {
                            "200": ok_book,
                            "400": diagnostics,
                            "404": not_found,
                            "500": internal
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": { "200": ok_book, "404": not_found, "500": internal }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookFields": {
                        "type": "object",
                        "properties": {
                            "title": text("Title of the book"),
                            "author": text("Author of the book"),
                            "publisher": text("Publisher of the book"),
                            "publish_date": {
                                "type": "string",
                                "example": "2010-Dec-26",
                                "description": "Publication date as YYYY-Mon-DD"
                            },
                            "rating": {
                                "type": "integer",
                                "minimum": 0,
                                "maximum": 3,
                                "description": "0 for unrated, otherwise 1 to 3"
                            },
                            "checked_out": { "type": "boolean" }
                        }
                    },
                    "Book": {
                        "allOf": [
                            { "$ref": "#/components/schemas/BookFields" },
                            {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "created_at": { "type": "string", "format": "date-time" },
                                    "updated_at": { "type": "string", "format": "date-time" },
                                    "deleted_at": {
                                        "type": ["string", "null"],
                                        "format": "date-time"
                                    }
                                },
                                "required": ["id", "created_at", "updated_at"]
                            }
                        ]
                    },
                    "Diagnostics": {
                        "type": "object",
                        "description": "Offending fields mapped to a complaint or rejected value",
                        "additionalProperties": true
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: CREATE_BOOKS,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over the shared database
pub fn create_module(db: Database) -> Arc<dyn Module> {
    let store = Arc::new(SqlBookStore::new(db));
    Arc::new(BooksModule::new(BookRepository::new(store)))
}
