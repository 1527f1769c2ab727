//! Update book command
//!
//! Replaces a record's editable fields. Binaries are optional: only the ones
//! supplied are uploaded again, through the same ledger as a new submission.
//! Existence is checked before any upload so a missing record never causes
//! provider traffic. Assets the record referenced before are left in place.

use mediator::Request;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{BookChanges, CatalogError, CoverImage};
use crate::features::books::types::{
    validate_cover_type, validate_metadata, BookMutationResponse, BookServices,
    BookValidationError, FileUpload,
};

use super::uploads::{UploadError, UploadLedger};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub published_date: Option<String>,
    #[serde(skip)]
    pub cover: Option<FileUpload>,
    #[serde(skip)]
    pub document: Option<FileUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateBookError {
    #[error(transparent)]
    Validation(#[from] BookValidationError),

    #[error("Book with ID '{0}' not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Failed to update book: {0}")]
    Persistence(#[source] CatalogError),
}

impl Request<Result<BookMutationResponse, UpdateBookError>> for UpdateBookCommand {}

impl crate::cqrs::middleware::Command for UpdateBookCommand {}

#[tracing::instrument(skip(services, command), fields(id = %command.id))]
pub async fn handle(
    services: BookServices,
    command: UpdateBookCommand,
) -> Result<BookMutationResponse, UpdateBookError> {
    let metadata = validate_metadata(
        command.title.as_deref(),
        command.author.as_deref(),
        command.description.as_deref(),
        command.category.as_deref(),
        command.published_date.as_deref(),
    )?;

    let document = command.document.filter(|f| !f.data.is_empty());
    let cover = command.cover.filter(|f| !f.data.is_empty());
    if let Some(cover) = &cover {
        validate_cover_type(cover)?;
    }

    let exists = services
        .catalog
        .get(command.id)
        .await
        .map_err(UpdateBookError::Persistence)?
        .is_some();
    if !exists {
        return Err(UpdateBookError::NotFound(command.id));
    }

    let mut ledger = UploadLedger::new(&services);

    let document_url = match document {
        Some(document) => match ledger.upload_document(document).await {
            Ok(stored) => Some(stored.url),
            Err(e) => {
                ledger.compensate().await;
                return Err(e.into());
            }
        },
        None => None,
    };

    let cover = match cover {
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

    let changes = BookChanges {
        title: metadata.title,
        author: metadata.author,
        description: metadata.description,
        category: metadata.category,
        published_date: metadata.published_date,
        document_url,
        cover,
    };

    let book = match services.catalog.update(command.id, changes).await {
        Ok(Some(book)) => book,
        Ok(None) => {
            // Deleted between the existence check and the write.
            ledger.compensate().await;
            return Err(UpdateBookError::NotFound(command.id));
        }
        Err(e) => {
            warn!(error = %e, "Catalog update failed after uploads");
            ledger.compensate().await;
            return Err(UpdateBookError::Persistence(e));
        }
    };
    ledger.commit();

    info!(book_id = %book.id, "Book updated");

    Ok(BookMutationResponse {
        message: "Book updated successfully".to_string(),
        book,
        warnings: metadata.warnings,
    })
}
