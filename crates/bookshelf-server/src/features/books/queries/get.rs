use bookshelf_common::BookRecord;
use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::features::books::types::BookServices;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBookQuery {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetBookError {
    #[error("Book with ID '{0}' not found")]
    NotFound(Uuid),
    #[error("Failed to load book: {0}")]
    Database(#[from] CatalogError),
}

impl Request<Result<BookRecord, GetBookError>> for GetBookQuery {}

impl crate::cqrs::middleware::Query for GetBookQuery {}

#[tracing::instrument(skip(services))]
pub async fn handle(services: BookServices, query: GetBookQuery) -> Result<BookRecord, GetBookError> {
    services
        .catalog
        .get(query.id)
        .await?
        .ok_or(GetBookError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::books::commands::submit;
    use crate::features::shared::test_helpers::{valid_submission, TestServices};

    #[tokio::test]
    async fn test_submitted_book_reads_back_identically() {
        let fixture = TestServices::new();
        let created = submit::handle(fixture.services(), valid_submission())
            .await
            .unwrap()
            .book;

        let fetched = handle(fixture.services(), GetBookQuery { id: created.id })
            .await
            .unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.description.as_deref(), Some("Spice, sand, and politics."));
    }

    #[tokio::test]
    async fn test_missing_book() {
        let fixture = TestServices::new();
        let id = Uuid::new_v4();

        let err = handle(fixture.services(), GetBookQuery { id }).await.unwrap_err();
        assert!(matches!(err, GetBookError::NotFound(missing) if missing == id));
    }
}
