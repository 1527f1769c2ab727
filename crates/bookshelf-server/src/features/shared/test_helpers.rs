//! Test fixtures for the book slices
//!
//! [`TestServices`] wires in-memory fakes for every collaborator of the
//! ingestion workflow. Each fake records the calls it receives in one shared
//! log, so tests can assert on the exact order of side effects.
//!
//! ```rust,ignore
//! let fixture = TestServices::new().with_media(Behavior::Fail);
//! let err = submit::handle(fixture.services(), valid_submission()).await.unwrap_err();
//! assert_eq!(fixture.calls(), vec!["documents.store", "media.upload", "documents.remove"]);
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use bookshelf_common::{BookRecord, Category};
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{AuthKeys, ADMIN_ROLE};
use crate::catalog::{
    BookChanges, BookFilter, CatalogError, CatalogResult, CatalogStore, CoverImage, NewBook,
};
use crate::features::books::commands::submit::SubmitBookCommand;
use crate::features::books::types::{BookServices, FileUpload, UploadPolicy};
use crate::media::{HostedImage, MediaHost};
use crate::storage::{calculate_sha256, DocumentStore, StoredDocument};

pub const TEST_JWT_SECRET: &str = "test-secret-with-enough-length";

/// How a fake collaborator responds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    #[default]
    Succeed,
    Fail,
    /// Never completes; only a timeout gets the caller out
    Hang,
}

impl Behavior {
    async fn apply(self, what: &str) -> Result<()> {
        match self {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => bail!("{} rejected by test double", what),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, call: &str) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call.to_string());
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

// ============================================================================
// Fakes
// ============================================================================

struct FakeDocuments {
    calls: CallLog,
    store: Behavior,
    remove: Behavior,
}

#[async_trait]
impl DocumentStore for FakeDocuments {
    async fn store_document(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: Option<String>,
    ) -> Result<StoredDocument> {
        self.calls.record("documents.store");
        self.store.apply("document store").await?;
        Ok(StoredDocument {
            key: key.to_string(),
            url: format!("https://storage.test/bucket/{}", key),
            checksum: calculate_sha256(&data),
            size: data.len() as i64,
        })
    }

    async fn remove_document(&self, _key: &str) -> Result<()> {
        self.calls.record("documents.remove");
        self.remove.apply("document remove").await
    }
}

struct FakeMedia {
    calls: CallLog,
    upload: Behavior,
    destroy: Behavior,
}

#[async_trait]
impl MediaHost for FakeMedia {
    async fn upload_image(
        &self,
        folder: &str,
        _data: Vec<u8>,
        _file_name: Option<String>,
        _content_type: Option<String>,
    ) -> Result<HostedImage> {
        self.calls.record("media.upload");
        self.upload.apply("media upload").await?;
        let public_id = format!("{}/{}", folder, Uuid::new_v4().simple());
        Ok(HostedImage {
            secure_url: format!("https://media.test/image/upload/{}.jpg", public_id),
            public_id,
        })
    }

    async fn destroy_image(&self, _public_id: &str) -> Result<()> {
        self.calls.record("media.destroy");
        self.destroy.apply("media destroy").await
    }
}

/// Catalog kept in memory, newest record last
pub struct InMemoryCatalog {
    books: Arc<RwLock<Vec<BookRecord>>>,
    calls: CallLog,
    writes: Behavior,
}

impl InMemoryCatalog {
    async fn check_writes(&self) -> CatalogResult<()> {
        match self.writes {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(CatalogError::Database(sqlx::Error::PoolTimedOut)),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

fn matches_filter(book: &BookRecord, filter: &BookFilter) -> bool {
    let category_ok = filter.category.map_or(true, |c| book.category == c);
    let search_ok = match filter.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
        }
        _ => true,
    };
    category_ok && search_ok
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn insert(&self, book: NewBook) -> CatalogResult<BookRecord> {
        self.calls.record("catalog.insert");
        self.check_writes().await?;

        let now = Utc::now();
        let (cover_image_url, cover_image_id) = match book.cover {
            Some(CoverImage { url, id }) => (Some(url), Some(id)),
            None => (None, None),
        };
        let record = BookRecord {
            id: Uuid::new_v4(),
            title: book.title,
            author: book.author,
            description: book.description,
            category: book.category,
            document_url: book.document_url,
            cover_image_url,
            cover_image_id,
            published_date: book.published_date,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> CatalogResult<Option<BookRecord>> {
        Ok(self.books.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &BookFilter,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<(Vec<BookRecord>, i64)> {
        let books = self.books.read().await;
        let matching: Vec<&BookRecord> = books
            .iter()
            .rev()
            .filter(|b| matches_filter(b, filter))
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: Uuid, changes: BookChanges) -> CatalogResult<Option<BookRecord>> {
        self.calls.record("catalog.update");
        self.check_writes().await?;

        let mut books = self.books.write().await;
        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };

        book.title = changes.title;
        book.author = changes.author;
        book.description = changes.description;
        book.category = changes.category;
        book.published_date = changes.published_date;
        if let Some(url) = changes.document_url {
            book.document_url = url;
        }
        if let Some(cover) = changes.cover {
            book.cover_image_url = Some(cover.url);
            book.cover_image_id = Some(cover.id);
        }
        book.updated_at = Utc::now().max(book.updated_at + ChronoDuration::microseconds(1));
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        self.calls.record("catalog.delete");
        self.check_writes().await?;

        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        Ok(books.len() != before)
    }
}

// ============================================================================
// Fixture
// ============================================================================

/// Builder for a [`BookServices`] backed entirely by fakes
#[derive(Clone)]
pub struct TestServices {
    calls: CallLog,
    books: Arc<RwLock<Vec<BookRecord>>>,
    documents: Behavior,
    remove: Behavior,
    media: Behavior,
    destroy: Behavior,
    catalog: Behavior,
    policy: UploadPolicy,
}

impl Default for TestServices {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServices {
    pub fn new() -> Self {
        Self {
            calls: CallLog::default(),
            books: Arc::new(RwLock::new(Vec::new())),
            documents: Behavior::Succeed,
            remove: Behavior::Succeed,
            media: Behavior::Succeed,
            destroy: Behavior::Succeed,
            catalog: Behavior::Succeed,
            policy: UploadPolicy {
                cover_folder: "book-covers".to_string(),
                timeout: Duration::from_secs(5),
                require_cover: true,
                cleanup_orphans: true,
            },
        }
    }

    pub fn with_documents(mut self, behavior: Behavior) -> Self {
        self.documents = behavior;
        self
    }

    pub fn with_remove(mut self, behavior: Behavior) -> Self {
        self.remove = behavior;
        self
    }

    pub fn with_media(mut self, behavior: Behavior) -> Self {
        self.media = behavior;
        self
    }

    pub fn with_destroy(mut self, behavior: Behavior) -> Self {
        self.destroy = behavior;
        self
    }

    /// Applies to catalog writes only; reads always succeed
    pub fn with_catalog(mut self, behavior: Behavior) -> Self {
        self.catalog = behavior;
        self
    }

    pub fn without_cleanup(mut self) -> Self {
        self.policy.cleanup_orphans = false;
        self
    }

    pub fn cover_optional(mut self) -> Self {
        self.policy.require_cover = false;
        self
    }

    pub fn services(&self) -> BookServices {
        BookServices {
            catalog: Arc::new(InMemoryCatalog {
                books: self.books.clone(),
                calls: self.calls.clone(),
                writes: self.catalog,
            }),
            documents: Arc::new(FakeDocuments {
                calls: self.calls.clone(),
                store: self.documents,
                remove: self.remove,
            }),
            media: Arc::new(FakeMedia {
                calls: self.calls.clone(),
                upload: self.media,
                destroy: self.destroy,
            }),
            policy: self.policy.clone(),
        }
    }

    /// Every provider and catalog write, in the order it happened
    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }

    pub async fn book_count(&self) -> usize {
        self.books.read().await.len()
    }

    /// Insert a record directly, bypassing the call log
    pub async fn seed_book(&self, title: &str, author: &str, category: Category) -> BookRecord {
        let now = Utc::now();
        let record = BookRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: author.to_string(),
            description: None,
            category,
            document_url: format!("https://storage.test/bucket/{}.pdf", title),
            cover_image_url: Some(format!("https://media.test/image/upload/{}.jpg", title)),
            cover_image_id: Some(format!("book-covers/{}", title)),
            published_date: None,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.push(record.clone());
        record
    }
}

/// A complete, valid submission
pub fn valid_submission() -> SubmitBookCommand {
    SubmitBookCommand {
        title: Some("Dune".to_string()),
        author: Some("Frank Herbert".to_string()),
        description: Some("Spice, sand, and politics.".to_string()),
        category: Some("Science".to_string()),
        published_date: Some("1965-08-01".to_string()),
        cover: Some(
            FileUpload::new(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .with_name("dune.jpg")
                .with_content_type("image/jpeg"),
        ),
        document: Some(
            FileUpload::new(b"%PDF-1.7 dune".to_vec())
                .with_name("dune.pdf")
                .with_content_type("application/pdf"),
        ),
    }
}

pub fn test_keys() -> AuthKeys {
    AuthKeys::new(TEST_JWT_SECRET, 3600)
}

/// A bearer token for an admin signed with [`test_keys`]
pub fn admin_token() -> String {
    test_keys()
        .issue(Uuid::new_v4(), "admin@example.com", ADMIN_ROLE)
        .expect("issue admin token")
}
