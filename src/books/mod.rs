//! Book records and the typed client for the books endpoints.

pub mod form;
pub mod models;
pub mod transforms;

use bookstore_http::{ApiClient, ApiError};

pub use form::{BookDraft, Field, FieldErrors};
pub use models::{Book, NewBook};

/// Collection endpoint.
pub const BOOKS_PATH: &str = "/api/v1/books/";

/// Endpoint of a single record.
pub fn book_path(id: u64) -> String {
    format!("{BOOKS_PATH}{id}")
}

/// CRUD calls against the books endpoints.
#[derive(Debug, Clone)]
pub struct BooksApi {
    client: ApiClient,
}

impl BooksApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Book>, ApiError> {
        self.client.get_collection(BOOKS_PATH).await
    }

    pub async fn get(&self, id: u64) -> Result<Book, ApiError> {
        self.client.get_json(&book_path(id)).await
    }

    /// Create a record; the backend answers with the stored copy.
    pub async fn create(&self, book: &NewBook) -> Result<Book, ApiError> {
        let created: Book = self.client.post_json(BOOKS_PATH, book).await?;
        tracing::info!(id = created.id, title = %created.title, "book created");
        Ok(created)
    }

    /// Replace a record with `book`.
    pub async fn update(&self, book: &Book) -> Result<(), ApiError> {
        self.client.put(&book_path(book.id), book).await?;
        tracing::info!(id = book.id, "book updated");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&book_path(id)).await?;
        tracing::info!(id, "book deleted");
        Ok(())
    }
}
