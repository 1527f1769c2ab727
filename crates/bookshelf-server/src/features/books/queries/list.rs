//! List books query
//!
//! One page of the catalog, newest first, optionally narrowed by a
//! case-insensitive title/author search and an exact category.

use bookshelf_common::{BookRecord, Category};
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::catalog::{BookFilter, CatalogError};
use crate::features::books::types::BookServices;
use crate::features::shared::pagination::{PageParams, PageSummary, PaginationError};

/// Query string of `GET /books`.
///
/// Page fields are not flattened from [`PageParams`]: flattened numbers do
/// not survive URL-encoded deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBooksQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Search term matched against title and author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksResponse {
    pub books: Vec<BookRecord>,
    #[serde(flatten)]
    pub summary: PageSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum ListBooksError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Failed to list books: {0}")]
    Database(#[from] CatalogError),
}

impl Request<Result<ListBooksResponse, ListBooksError>> for ListBooksQuery {}

impl crate::cqrs::middleware::Query for ListBooksQuery {}

impl ListBooksQuery {
    pub fn pagination(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }

    /// Validated filter; blank values mean "no filter"
    pub fn filter(&self) -> Result<BookFilter, ListBooksError> {
        let search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                raw.parse::<Category>()
                    .map_err(|_| ListBooksError::UnknownCategory(raw.to_string()))?,
            ),
            _ => None,
        };

        Ok(BookFilter { search, category })
    }
}

#[tracing::instrument(skip(services))]
pub async fn handle(
    services: BookServices,
    query: ListBooksQuery,
) -> Result<ListBooksResponse, ListBooksError> {
    let pagination = query.pagination();
    pagination.validate()?;
    let filter = query.filter()?;

    let (books, total) = services
        .catalog
        .list(&filter, pagination.limit(), pagination.offset())
        .await?;

    Ok(ListBooksResponse {
        books,
        summary: PageSummary::new(pagination.page(), pagination.limit(), total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestServices;

    async fn seeded(count: usize) -> TestServices {
        let fixture = TestServices::new();
        for i in 0..count {
            fixture
                .seed_book(&format!("Book {}", i), "Author", Category::Fiction)
                .await;
        }
        fixture
    }

    #[tokio::test]
    async fn test_second_page_of_twenty() {
        let fixture = seeded(20).await;
        let query = ListBooksQuery {
            page: Some(2),
            limit: Some(12),
            ..Default::default()
        };

        let response = handle(fixture.services(), query).await.unwrap();
        assert_eq!(response.books.len(), 8);
        assert_eq!(response.summary.total_count, 20);
        assert_eq!(response.summary.current_page, 2);
        assert_eq!(response.summary.total_pages, 2);
    }

    #[tokio::test]
    async fn test_defaults_and_newest_first() {
        let fixture = seeded(13).await;

        let response = handle(fixture.services(), ListBooksQuery::default())
            .await
            .unwrap();
        assert_eq!(response.books.len(), 12);
        assert_eq!(response.books[0].title, "Book 12");
        assert_eq!(response.summary.current_page, 1);
    }

    #[tokio::test]
    async fn test_search_and_category_filters() {
        let fixture = TestServices::new();
        fixture.seed_book("Dune", "Frank Herbert", Category::Science).await;
        fixture.seed_book("Emma", "Jane Austen", Category::Fiction).await;
        fixture.seed_book("Persuasion", "Jane Austen", Category::Fiction).await;

        let query = ListBooksQuery {
            q: Some("austen".to_string()),
            ..Default::default()
        };
        let response = handle(fixture.services(), query).await.unwrap();
        assert_eq!(response.summary.total_count, 2);

        let query = ListBooksQuery {
            category: Some("science".to_string()),
            ..Default::default()
        };
        let response = handle(fixture.services(), query).await.unwrap();
        assert_eq!(response.books.len(), 1);
        assert_eq!(response.books[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let fixture = TestServices::new();

        let err = handle(
            fixture.services(),
            ListBooksQuery {
                page: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ListBooksError::Pagination(PaginationError::InvalidPage)));

        let err = handle(
            fixture.services(),
            ListBooksQuery {
                limit: Some(101),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ListBooksError::Pagination(_)));

        let err = handle(
            fixture.services(),
            ListBooksQuery {
                category: Some("Poetry".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ListBooksError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_empty_page_past_the_end() {
        let fixture = seeded(3).await;
        let query = ListBooksQuery {
            page: Some(5),
            ..Default::default()
        };

        let response = handle(fixture.services(), query).await.unwrap();
        assert!(response.books.is_empty());
        assert_eq!(response.summary.total_pages, 1);
    }
}
