use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::features::books::types::BookServices;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBookCommand {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBookResponse {
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteBookError {
    #[error("Book with ID '{0}' not found")]
    NotFound(Uuid),
    #[error("Failed to delete book: {0}")]
    Persistence(#[from] CatalogError),
}

impl Request<Result<DeleteBookResponse, DeleteBookError>> for DeleteBookCommand {}

impl crate::cqrs::middleware::Command for DeleteBookCommand {}

/// Removes the record only; hosted assets stay where they are
#[tracing::instrument(skip(services))]
pub async fn handle(
    services: BookServices,
    command: DeleteBookCommand,
) -> Result<DeleteBookResponse, DeleteBookError> {
    if !services.catalog.delete(command.id).await? {
        return Err(DeleteBookError::NotFound(command.id));
    }

    tracing::info!(book_id = %command.id, "Book deleted");

    Ok(DeleteBookResponse {
        message: "Book deleted successfully".to_string(),
    })
}
