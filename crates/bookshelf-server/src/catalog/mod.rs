//! Catalog store
//!
//! Persisted book records. The orchestrator and the query handlers only see
//! the [`CatalogStore`] trait; [`PgCatalog`] is the production implementation.

use async_trait::async_trait;
use bookshelf_common::{BookRecord, Category};
use chrono::NaiveDate;
use uuid::Uuid;

pub mod postgres;

pub use postgres::PgCatalog;

/// Errors raised by a catalog store
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored record {id} is malformed: {reason}")]
    MalformedRow { id: Uuid, reason: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A hosted cover: its durable URL plus the media host identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub url: String,
    pub id: String,
}

/// A fully validated record ready to insert. Assets are already hosted.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub category: Category,
    pub document_url: String,
    pub cover: Option<CoverImage>,
    pub published_date: Option<NaiveDate>,
}

/// Replacement of a record's editable fields.
///
/// Metadata is always replaced in full. `document_url` and `cover` are only
/// replaced when a new asset was uploaded.
#[derive(Debug, Clone)]
pub struct BookChanges {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub category: Category,
    pub published_date: Option<NaiveDate>,
    pub document_url: Option<String>,
    pub cover: Option<CoverImage>,
}

/// List filters
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring of title or author
    pub search: Option<String>,
    pub category: Option<Category>,
}

/// The persisted collection of book records.
///
/// Implementations assign identifiers and timestamps. `created_at` never
/// changes after insert; `updated_at` strictly increases on every update.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, book: NewBook) -> CatalogResult<BookRecord>;

    async fn get(&self, id: Uuid) -> CatalogResult<Option<BookRecord>>;

    /// One page, newest first, plus the total number of matches
    async fn list(
        &self,
        filter: &BookFilter,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<(Vec<BookRecord>, i64)>;

    /// Returns `None` when the record does not exist
    async fn update(&self, id: Uuid, changes: BookChanges) -> CatalogResult<Option<BookRecord>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}
