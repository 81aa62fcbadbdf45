//! Book model and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{rust::double_option, As, DisplayFromStr, PickFirst, Same};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

/// Full book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// 16-character identifier assigned at creation
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    /// Always `read_page == page_count` at the time of the last write
    pub finished: bool,
    pub reading: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection returned by searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookListing {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

impl From<&Book> for BookListing {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Create / update request body.
///
/// Every field is optional at the wire level so that a missing field
/// surfaces as a [`ValidationError`] instead of a body parse failure.
/// The nullable details are double options: `None` when the key is
/// absent, `Some(None)` when it is an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    /// Accepted as a number or a numeric string
    #[serde(default, deserialize_with = "year_field")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub publisher: Option<Option<String>>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    pub reading: Option<bool>,
}

fn year_field<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let year: Option<i32> = As::<Option<PickFirst<(Same, DisplayFromStr)>>>::deserialize(deserializer)?;
    Ok(Some(year))
}

/// Validated book fields, ready to be written to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

impl NewBook {
    pub fn is_finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

/// Field-level validation failures for create and update
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("readPage must not exceed pageCount")]
    ReadPageExceedsPageCount,
}

/// Unwrap a nullable detail, rejecting an absent key when `required`
fn detail<T>(
    value: Option<Option<T>>,
    field: &'static str,
    required: bool,
) -> Result<Option<T>, ValidationError> {
    match value {
        Some(value) => Ok(value),
        None if required => Err(ValidationError::MissingField(field)),
        None => Ok(None),
    }
}

impl BookPayload {
    /// Check a new book and turn it into a [`NewBook`].
    ///
    /// Absent details are stored as null.
    pub fn validate(self) -> Result<NewBook, ValidationError> {
        self.into_new_book(false)
    }

    /// Check a full replacement of an existing book.
    ///
    /// Every writable key must be present; the details may be `null`.
    pub fn validate_replacement(self) -> Result<NewBook, ValidationError> {
        self.into_new_book(true)
    }

    /// The name is checked first, then the required counters and the
    /// reading flag, then the details, then `readPage <= pageCount`.
    fn into_new_book(self, replace: bool) -> Result<NewBook, ValidationError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationError::MissingName),
        };
        let page_count = self
            .page_count
            .ok_or(ValidationError::MissingField("pageCount"))?;
        let read_page = self
            .read_page
            .ok_or(ValidationError::MissingField("readPage"))?;
        let reading = self
            .reading
            .ok_or(ValidationError::MissingField("reading"))?;
        let year = detail(self.year, "year", replace)?;
        let author = detail(self.author, "author", replace)?;
        let summary = detail(self.summary, "summary", replace)?;
        let publisher = detail(self.publisher, "publisher", replace)?;

        if read_page > page_count {
            return Err(ValidationError::ReadPageExceedsPageCount);
        }

        Ok(NewBook {
            name,
            year,
            author,
            summary,
            publisher,
            page_count,
            read_page,
            reading,
        })
    }
}

/// Raw query parameters accepted by the book listing.
///
/// Repeated keys are collected; only the first value of each is used.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    #[serde(default)]
    pub name: Vec<String>,
    /// `1` for books being read, anything else for the rest
    #[serde(default)]
    pub reading: Vec<String>,
    /// `1` for finished books, anything else for the rest
    #[serde(default)]
    pub finished: Vec<String>,
}

/// The single predicate applied to a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    NoFilter,
    ByName(String),
    ByReading(bool),
    ByFinished(bool),
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::NoFilter => true,
            BookFilter::ByName(needle) => book.name.to_lowercase().contains(&needle.to_lowercase()),
            BookFilter::ByReading(reading) => book.reading == *reading,
            BookFilter::ByFinished(finished) => book.finished == *finished,
        }
    }
}

fn flag(value: &str) -> bool {
    value == "1"
}

impl From<&BookQuery> for BookFilter {
    /// Precedence is name, then reading, then finished.
    fn from(query: &BookQuery) -> Self {
        if let Some(name) = query.name.first() {
            BookFilter::ByName(name.clone())
        } else if let Some(reading) = query.reading.first() {
            BookFilter::ByReading(flag(reading))
        } else if let Some(finished) = query.finished.first() {
            BookFilter::ByFinished(flag(finished))
        } else {
            BookFilter::NoFilter
        }
    }
}
