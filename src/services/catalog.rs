//! Catalog management service

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookListing, BookPayload, BookQuery, ValidationError},
    repository::{BookError, BookRepository},
};

/// Catalog operations, used to pick client-facing messages
#[derive(Debug, Clone, Copy)]
enum Operation {
    Create,
    Update,
    Get,
    Delete,
}

impl Operation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Operation::Create => "Gagal menambahkan buku",
            Operation::Update => "Gagal memperbarui buku",
            Operation::Get => "Buku tidak ditemukan",
            Operation::Delete => "Buku gagal dihapus",
        }
    }

    fn not_found_message(self) -> String {
        match self {
            Operation::Get => self.failure_prefix().to_string(),
            _ => format!("{}. Id tidak ditemukan", self.failure_prefix()),
        }
    }

    fn validation_message(self, error: ValidationError) -> String {
        let reason = match error {
            ValidationError::MissingName => "Mohon isi nama buku".to_string(),
            ValidationError::MissingField(field) => format!("Mohon isi {} buku", field),
            ValidationError::ReadPageExceedsPageCount => {
                "readPage tidak boleh lebih besar dari pageCount".to_string()
            }
        };
        format!("{}. {}", self.failure_prefix(), reason)
    }

    fn classify(self, error: BookError) -> AppError {
        match error {
            BookError::Validation(e) => AppError::Validation(self.validation_message(e)),
            BookError::NotFound(_) => AppError::NotFound(self.not_found_message()),
        }
    }
}

/// Front of the book repository.
///
/// The repository sits behind a single lock: reads share it, every
/// mutation holds it exclusively for the whole operation.
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<RwLock<BookRepository>>,
}

impl CatalogService {
    pub fn new(repository: BookRepository) -> Self {
        Self {
            books: Arc::new(RwLock::new(repository)),
        }
    }

    /// Add a book, returning its id
    pub async fn create_book(&self, payload: BookPayload) -> AppResult<String> {
        let mut books = self.books.write().await;

        let id = books.create(payload).map_err(|e| {
            tracing::debug!("Catalog create rejected: {}", e);
            Operation::Create.classify(e)
        })?;

        tracing::info!("Catalog create: book id={} ({} books)", id, books.len());
        Ok(id)
    }

    /// List books using the query's single filter
    pub async fn search_books(&self, query: &BookQuery) -> Vec<BookListing> {
        let filter = BookFilter::from(query);
        tracing::debug!("Catalog search: {:?}", filter);
        self.books.read().await.list(&filter)
    }

    /// Get a full book record by id
    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        self.books
            .read()
            .await
            .get_by_id(id)
            .cloned()
            .map_err(|e| Operation::Get.classify(e))
    }

    /// Replace all writable fields of a book
    pub async fn update_book(&self, id: &str, payload: BookPayload) -> AppResult<Book> {
        let mut books = self.books.write().await;
        let updated = books.update_by_id(id, payload).map_err(|e| {
            tracing::debug!("Catalog update rejected for id={}: {}", id, e);
            Operation::Update.classify(e)
        })?;

        tracing::info!("Catalog update: book id={}", id);
        Ok(updated.clone())
    }

    /// Delete a book
    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        let mut books = self.books.write().await;
        books
            .delete_by_id(id)
            .map_err(|e| Operation::Delete.classify(e))?;

        tracing::info!("Catalog delete: book id={} ({} books left)", id, books.len());
        Ok(())
    }

    /// Number of books currently held
    pub async fn count(&self) -> usize {
        self.books.read().await.len()
    }

    /// Empty the catalog. Only meant for resetting state between tests.
    pub async fn clear(&self) {
        self.books.write().await.clear();
    }
}
