//! Provider uploads with compensation
//!
//! Every successful upload is recorded in an [`UploadLedger`]. If a later step
//! of the same request fails, [`UploadLedger::compensate`] removes the recorded
//! assets in reverse order. Compensation is best effort: its own failures are
//! logged and never replace the error that triggered it.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::features::books::types::{BookServices, FileUpload};
use crate::media::HostedImage;
use crate::storage::{document_key, StoredDocument};

/// External collaborator that received a binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DocumentStorage,
    MediaHost,
}

impl Provider {
    fn asset(self) -> &'static str {
        match self {
            Provider::DocumentStorage => "document",
            Provider::MediaHost => "cover image",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::DocumentStorage => f.write_str("document storage"),
            Provider::MediaHost => f.write_str("media host"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{provider} upload failed: {cause:#}")]
    Failed {
        provider: Provider,
        cause: anyhow::Error,
    },

    #[error("{provider} upload timed out after {}s", .timeout.as_secs())]
    TimedOut { provider: Provider, timeout: Duration },
}

impl UploadError {
    pub fn provider(&self) -> Provider {
        match self {
            UploadError::Failed { provider, .. } | UploadError::TimedOut { provider, .. } => {
                *provider
            }
        }
    }

    /// Message safe to show to clients; names the provider, hides internals
    pub fn client_message(&self) -> String {
        let provider = self.provider();
        match self {
            UploadError::Failed { .. } => {
                format!("Failed to upload {} to {}", provider.asset(), provider)
            }
            UploadError::TimedOut { .. } => {
                format!("Timed out uploading {} to {}", provider.asset(), provider)
            }
        }
    }
}

/// An asset hosted during the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostedAsset {
    Document { key: String },
    Cover { public_id: String },
}

/// Transient log of uploads made while handling one request
pub struct UploadLedger<'a> {
    services: &'a BookServices,
    hosted: Vec<HostedAsset>,
}

impl<'a> UploadLedger<'a> {
    pub fn new(services: &'a BookServices) -> Self {
        Self {
            services,
            hosted: Vec::new(),
        }
    }

    pub fn hosted(&self) -> &[HostedAsset] {
        &self.hosted
    }

    #[tracing::instrument(skip(self, file), fields(size = file.data.len()))]
    pub async fn upload_document(&mut self, file: FileUpload) -> Result<StoredDocument, UploadError> {
        let key = document_key(Uuid::new_v4(), file.file_name.as_deref());
        let documents = self.services.documents.clone();

        let stored = bounded(
            Provider::DocumentStorage,
            self.services.policy.timeout,
            documents.store_document(&key, file.data, file.content_type),
        )
        .await?;

        info!(key = %stored.key, checksum = %stored.checksum, "Document uploaded");
        self.hosted.push(HostedAsset::Document {
            key: stored.key.clone(),
        });
        Ok(stored)
    }

    #[tracing::instrument(skip(self, file), fields(size = file.data.len()))]
    pub async fn upload_cover(&mut self, file: FileUpload) -> Result<HostedImage, UploadError> {
        let media = self.services.media.clone();

        let image = bounded(
            Provider::MediaHost,
            self.services.policy.timeout,
            media.upload_image(
                &self.services.policy.cover_folder,
                file.data,
                file.file_name,
                file.content_type,
            ),
        )
        .await?;

        info!(public_id = %image.public_id, "Cover image uploaded");
        self.hosted.push(HostedAsset::Cover {
            public_id: image.public_id.clone(),
        });
        Ok(image)
    }

    /// Everything hosted so far is now referenced by a record
    pub fn commit(mut self) {
        self.hosted.clear();
    }

    /// Undo this request's uploads, newest first
    pub async fn compensate(mut self) {
        let policy = &self.services.policy;

        while let Some(asset) = self.hosted.pop() {
            if !policy.cleanup_orphans {
                warn!(?asset, "Orphaned asset left in place (cleanup disabled)");
                continue;
            }

            let result = match &asset {
                HostedAsset::Document { key } => {
                    bounded(
                        Provider::DocumentStorage,
                        policy.timeout,
                        self.services.documents.remove_document(key),
                    )
                    .await
                }
                HostedAsset::Cover { public_id } => {
                    bounded(
                        Provider::MediaHost,
                        policy.timeout,
                        self.services.media.destroy_image(public_id),
                    )
                    .await
                }
            };

            match result {
                Ok(()) => info!(?asset, "Removed asset after failed request"),
                Err(e) => warn!(?asset, error = %e, "Orphaned asset could not be removed"),
            }
        }
    }
}

impl Drop for UploadLedger<'_> {
    fn drop(&mut self) {
        // A ledger dropped with entries was neither committed nor compensated.
        for asset in &self.hosted {
            error!(?asset, "Upload ledger dropped with unresolved asset");
        }
    }
}

/// Run a provider call under the configured timeout
async fn bounded<T, F>(provider: Provider, timeout: Duration, call: F) -> Result<T, UploadError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(cause)) => {
            warn!(%provider, error = %cause, "Provider call failed");
            Err(UploadError::Failed { provider, cause })
        }
        Err(_) => {
            warn!(%provider, ?timeout, "Provider call timed out");
            Err(UploadError::TimedOut { provider, timeout })
        }
    }
}
