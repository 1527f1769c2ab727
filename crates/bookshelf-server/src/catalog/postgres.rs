use async_trait::async_trait;
use bookshelf_common::{BookRecord, Category};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{BookChanges, BookFilter, CatalogError, CatalogResult, CatalogStore, NewBook};

const BOOK_COLUMNS: &str = r#"
    id, title, author, description, category, document_url,
    cover_image_url, cover_image_id, published_date, created_at, updated_at
"#;

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1)
      AND ($2::text IS NULL OR category = $2)
"#;

/// Postgres-backed catalog
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    description: Option<String>,
    category: String,
    document_url: String,
    cover_image_url: Option<String>,
    cover_image_id: Option<String>,
    published_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for BookRecord {
    type Error = CatalogError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|_| CatalogError::MalformedRow {
            id: row.id,
            reason: format!("unknown category '{}'", row.category),
        })?;

        Ok(BookRecord {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            category,
            document_url: row.document_url,
            cover_image_url: row.cover_image_url,
            cover_image_id: row.cover_image_id,
            published_date: row.published_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filter_binds(filter: &BookFilter) -> (Option<String>, Option<&'static str>) {
        (
            filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(like_pattern),
            filter.category.map(|c| c.as_str()),
        )
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    #[tracing::instrument(skip(self, book), fields(title = %book.title))]
    async fn insert(&self, book: NewBook) -> CatalogResult<BookRecord> {
        let (cover_url, cover_id) = match book.cover {
            Some(cover) => (Some(cover.url), Some(cover.id)),
            None => (None, None),
        };

        let sql = format!(
            r#"
            INSERT INTO books (title, author, description, category, document_url,
                               cover_image_url, cover_image_id, published_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.description)
            .bind(book.category.as_str())
            .bind(&book.document_url)
            .bind(cover_url)
            .bind(cover_id)
            .bind(book.published_date)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: Uuid) -> CatalogResult<Option<BookRecord>> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);

        sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookRecord::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list(
        &self,
        filter: &BookFilter,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<(Vec<BookRecord>, i64)> {
        let (search, category) = Self::filter_binds(filter);

        let count_sql = format!("SELECT COUNT(*) FROM books {}", FILTER_CLAUSE);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&search)
            .bind(category)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM books {} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            BOOK_COLUMNS, FILTER_CLAUSE
        );
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(&search)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let books = rows
            .into_iter()
            .map(BookRecord::try_from)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok((books, total))
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: BookChanges) -> CatalogResult<Option<BookRecord>> {
        let (cover_url, cover_id) = match changes.cover {
            Some(cover) => (Some(cover.url), Some(cover.id)),
            None => (None, None),
        };

        // updated_at must move forward even when two writes share a clock tick.
        let sql = format!(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                description = $4,
                category = $5,
                published_date = $6,
                document_url = COALESCE($7, document_url),
                cover_image_url = COALESCE($8, cover_image_url),
                cover_image_id = COALESCE($9, cover_image_id),
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.author)
            .bind(&changes.description)
            .bind(changes.category.as_str())
            .bind(changes.published_date)
            .bind(&changes.document_url)
            .bind(cover_url)
            .bind(cover_id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookRecord::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
