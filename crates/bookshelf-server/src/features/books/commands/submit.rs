//! Submit book command
//!
//! The book ingestion workflow. One submission runs strictly in order:
//!
//! 1. validate metadata and the presence of both binaries (no side effects)
//! 2. upload the document to binary storage
//! 3. upload the cover to the media host
//! 4. assemble and insert the catalog record
//!
//! A failure at step 2 stops before the cover is sent. Failures at steps 3 and
//! 4 return an error and hand the already-hosted assets to the upload ledger
//! for compensation, so no record is ever written without its document.

use mediator::Request;
use tracing::{info, warn};

use crate::catalog::{CatalogError, CoverImage, NewBook};
use crate::features::books::types::{
    validate_cover_type, validate_metadata, BookMetadata, BookMutationResponse, BookServices,
    BookValidationError, FileUpload, UploadPolicy,
};

use super::uploads::{UploadError, UploadLedger};

/// A new book as received from the client
#[derive(Debug, Clone, Default)]
pub struct SubmitBookCommand {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub published_date: Option<String>,
    pub cover: Option<FileUpload>,
    pub document: Option<FileUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitBookError {
    #[error(transparent)]
    Validation(#[from] BookValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to save book: {0}")]
    Persistence(#[source] CatalogError),
}

impl Request<Result<BookMutationResponse, SubmitBookError>> for SubmitBookCommand {}

impl crate::cqrs::middleware::Command for SubmitBookCommand {}

/// A submission that passed validation and owns its binaries
#[derive(Debug)]
pub struct ValidatedSubmission {
    pub metadata: BookMetadata,
    pub document: FileUpload,
    pub cover: Option<FileUpload>,
}

impl SubmitBookCommand {
    /// Check every input before anything leaves the process
    #[tracing::instrument(skip(self, policy))]
    pub fn validate(self, policy: &UploadPolicy) -> Result<ValidatedSubmission, SubmitBookError> {
        let metadata = validate_metadata(
            self.title.as_deref(),
            self.author.as_deref(),
            self.description.as_deref(),
            self.category.as_deref(),
            self.published_date.as_deref(),
        )?;

        let document = self
            .document
            .filter(|f| !f.data.is_empty())
            .ok_or(BookValidationError::MissingFile { field: "pdf" })?;

        let cover = self.cover.filter(|f| !f.data.is_empty());
        match &cover {
            Some(cover) => validate_cover_type(cover)?,
            None if policy.require_cover => {
                return Err(BookValidationError::MissingFile { field: "coverPhoto" }.into())
            }
            None => {}
        }

        Ok(ValidatedSubmission {
            metadata,
            document,
            cover,
        })
    }
}

#[tracing::instrument(skip(services, command))]
pub async fn handle(
    services: BookServices,
    command: SubmitBookCommand,
) -> Result<BookMutationResponse, SubmitBookError> {
    let ValidatedSubmission {
        metadata,
        document,
        cover,
    } = command.validate(&services.policy)?;

    info!(title = %metadata.title, author = %metadata.author, "Submitting book");

    let mut ledger = UploadLedger::new(&services);

    let stored = match ledger.upload_document(document).await {
        Ok(stored) => stored,
        Err(e) => {
            ledger.compensate().await;
            return Err(e.into());
        }
    };

    let hosted_cover = match cover {
        Some(cover) => match ledger.upload_cover(cover).await {
            Ok(image) => Some(CoverImage {
                url: image.secure_url,
                id: image.public_id,
            }),
            Err(e) => {
                ledger.compensate().await;
                return Err(e.into());
            }
        },
        None => None,
    };

    let new_book = NewBook {
        title: metadata.title,
        author: metadata.author,
        description: metadata.description,
        category: metadata.category,
        document_url: stored.url,
        cover: hosted_cover,
        published_date: metadata.published_date,
    };

    let book = match services.catalog.insert(new_book).await {
        Ok(book) => book,
        Err(e) => {
            warn!(error = %e, "Catalog insert failed after uploads");
            ledger.compensate().await;
            return Err(SubmitBookError::Persistence(e));
        }
    };
    ledger.commit();

    info!(book_id = %book.id, title = %book.title, "Book created");

    Ok(BookMutationResponse {
        message: "Book added successfully".to_string(),
        book,
        warnings: metadata.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{valid_submission, Behavior, TestServices};
    use bookshelf_common::Category;

    #[tokio::test]
    async fn test_submit_hosts_both_assets_then_persists() {
        let fixture = TestServices::new();
        let response = handle(fixture.services(), valid_submission()).await.unwrap();

        let book = &response.book;
        assert_eq!(book.title, "Dune");
        assert_eq!(book.category, Category::Science);
        assert!(!book.document_url.is_empty());
        assert!(book.cover_image_url.as_deref().is_some_and(|u| !u.is_empty()));
        assert!(book.cover_image_id.is_some());
        assert_eq!(book.created_at, book.updated_at);
        assert_eq!(response.message, "Book added successfully");
        assert!(response.warnings.is_empty());

        assert_eq!(
            fixture.calls(),
            vec!["documents.store", "media.upload", "catalog.insert"]
        );
    }

    #[tokio::test]
    async fn test_missing_required_inputs_have_no_side_effects() {
        let cases: Vec<(&str, SubmitBookCommand)> = vec![
            ("title", SubmitBookCommand { title: None, ..valid_submission() }),
            ("author", SubmitBookCommand { author: Some("  ".into()), ..valid_submission() }),
            ("pdf", SubmitBookCommand { document: None, ..valid_submission() }),
            ("coverPhoto", SubmitBookCommand { cover: None, ..valid_submission() }),
        ];

        for (field, command) in cases {
            let fixture = TestServices::new();
            let err = handle(fixture.services(), command).await.unwrap_err();

            assert!(matches!(err, SubmitBookError::Validation(_)), "{}: {:?}", field, err);
            assert!(err.to_string().contains(field), "{}: {}", field, err);
            assert!(fixture.calls().is_empty(), "{} caused side effects", field);
        }
    }

    #[tokio::test]
    async fn test_cover_optional_when_policy_allows() {
        let fixture = TestServices::new().cover_optional();
        let command = SubmitBookCommand {
            cover: None,
            ..valid_submission()
        };

        let response = handle(fixture.services(), command).await.unwrap();
        assert!(response.book.cover_image_url.is_none());
        assert_eq!(fixture.calls(), vec!["documents.store", "catalog.insert"]);
    }

    #[tokio::test]
    async fn test_document_failure_skips_cover_upload() {
        let fixture = TestServices::new().with_documents(Behavior::Fail);
        let err = handle(fixture.services(), valid_submission()).await.unwrap_err();

        match err {
            SubmitBookError::Upload(ref e) => {
                assert_eq!(e.client_message(), "Failed to upload document to document storage")
            }
            other => panic!("expected upload error, got {:?}", other),
        }
        assert_eq!(fixture.calls(), vec!["documents.store"]);
        assert_eq!(fixture.book_count().await, 0);
    }

    #[tokio::test]
    async fn test_cover_failure_persists_nothing_and_removes_document() {
        let fixture = TestServices::new().with_media(Behavior::Fail);
        let err = handle(fixture.services(), valid_submission()).await.unwrap_err();

        assert!(matches!(err, SubmitBookError::Upload(_)));
        assert_eq!(fixture.book_count().await, 0);
        assert_eq!(
            fixture.calls(),
            vec!["documents.store", "media.upload", "documents.remove"]
        );
    }

    #[tokio::test]
    async fn test_cover_failure_without_cleanup_leaves_orphan() {
        let fixture = TestServices::new()
            .with_media(Behavior::Fail)
            .without_cleanup();
        let err = handle(fixture.services(), valid_submission()).await.unwrap_err();

        assert!(matches!(err, SubmitBookError::Upload(_)));
        assert_eq!(fixture.calls(), vec!["documents.store", "media.upload"]);
    }

    #[tokio::test]
    async fn test_persistence_failure_compensates_both_uploads() {
        let fixture = TestServices::new().with_catalog(Behavior::Fail);
        let err = handle(fixture.services(), valid_submission()).await.unwrap_err();

        assert!(matches!(err, SubmitBookError::Persistence(_)));
        assert_eq!(
            fixture.calls(),
            vec![
                "documents.store",
                "media.upload",
                "catalog.insert",
                "media.destroy",
                "documents.remove"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_category_is_stored_as_other_with_warning() {
        let fixture = TestServices::new();
        let command = SubmitBookCommand {
            category: Some("Poetry".into()),
            ..valid_submission()
        };

        let response = handle(fixture.services(), command).await.unwrap();
        assert_eq!(response.book.category, Category::Other);
        assert_eq!(response.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_non_image_cover_is_rejected_before_upload() {
        let fixture = TestServices::new();
        let command = SubmitBookCommand {
            cover: Some(FileUpload::new(b"%PDF".to_vec()).with_content_type("application/pdf")),
            ..valid_submission()
        };

        let err = handle(fixture.services(), command).await.unwrap_err();
        assert!(err.to_string().contains("coverPhoto"));
        assert!(fixture.calls().is_empty());
    }
}
