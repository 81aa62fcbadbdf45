//! In-memory book collection

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::models::book::{Book, BookFilter, BookListing, BookPayload, ValidationError};

/// URL-safe alphabet used for book identifiers
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const ID_LENGTH: usize = 16;

/// Failures reported by [`BookRepository`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Book {0} not found")]
    NotFound(String),
}

pub type BookResult<T> = Result<T, BookError>;

/// Owns the catalog's records in insertion order.
///
/// Lookups are linear scans. Every write validates its input before
/// touching the collection, so a failed call leaves it unchanged.
#[derive(Debug, Default)]
pub struct BookRepository {
    books: Vec<Book>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Add a book and return its generated id
    pub fn create(&mut self, input: BookPayload) -> BookResult<String> {
        let input = input.validate()?;

        let id = self.generate_id();
        let now = Utc::now();
        self.books.push(Book {
            id: id.clone(),
            finished: input.is_finished(),
            name: input.name,
            year: input.year,
            author: input.author,
            summary: input.summary,
            publisher: input.publisher,
            page_count: input.page_count,
            read_page: input.read_page,
            reading: input.reading,
            inserted_at: now,
            updated_at: now,
        });

        Ok(id)
    }

    /// List books matching `filter` as listing projections
    pub fn list(&self, filter: &BookFilter) -> Vec<BookListing> {
        self.books
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookListing::from)
            .collect()
    }

    pub fn get_by_id(&self, id: &str) -> BookResult<&Book> {
        self.books
            .iter()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))
    }

    /// Replace every writable field of a book.
    ///
    /// All writable keys must be supplied. `id` and `inserted_at` are
    /// kept, `finished` is recomputed and `updated_at` moves forward.
    pub fn update_by_id(&mut self, id: &str, input: BookPayload) -> BookResult<&Book> {
        let input = input.validate_replacement()?;

        let book = self
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        *book = Book {
            id: book.id.clone(),
            finished: input.is_finished(),
            name: input.name,
            year: input.year,
            author: input.author,
            summary: input.summary,
            publisher: input.publisher,
            page_count: input.page_count,
            read_page: input.read_page,
            reading: input.reading,
            inserted_at: book.inserted_at,
            updated_at: next_timestamp(book.updated_at),
        };

        Ok(&*book)
    }

    /// Remove a single book and return it
    pub fn delete_by_id(&mut self, id: &str) -> BookResult<Book> {
        let idx = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        Ok(self.books.remove(idx))
    }

    /// Drop every record. Only used to reset state between tests.
    pub fn clear(&mut self) {
        self.books.clear();
    }

    fn generate_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ID_LENGTH)
                .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            if !self.books.iter().any(|book| book.id == id) {
                return id;
            }
        }
    }
}

/// Current time, or just after `previous` if the clock has not advanced
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
