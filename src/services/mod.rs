//! Business logic services

pub mod catalog;

use crate::repository::BookRepository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services around the given book repository
    pub fn new(books: BookRepository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(books),
        }
    }
}
