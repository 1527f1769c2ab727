//! Binary storage provider (S3-compatible)
//!
//! Book documents are written to a single bucket under
//! `books/documents/{upload-id}/{file-name}`. The catalog stores only the
//! durable link; the object key is kept so compensation can remove it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub mod config;

use config::StorageConfig;

/// Prefix under which every uploaded document lives
pub const DOCUMENT_PREFIX: &str = "books/documents";

/// Result of storing a document
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    /// Durable retrieval link recorded on the book
    pub url: String,
    pub checksum: String,
    pub size: i64,
}

/// Where book documents are kept
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store_document(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<StoredDocument>;

    async fn remove_document(&self, key: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    config: StorageConfig,
}

impl Storage {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        debug!("Initializing storage with config: {:?}", config);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "bookshelf-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!(bucket = %config.bucket, "Storage client initialized");

        Ok(Self { client, config })
    }

    #[instrument(skip(self, data), fields(bucket = %self.config.bucket))]
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<StoredDocument> {
        let checksum = calculate_sha256(&data);
        let size = data.len() as i64;

        debug!("Uploading {} bytes to s3://{}/{}", size, self.config.bucket, key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request.send().await.context("Failed to upload to S3")?;

        info!(key, size, checksum = %checksum, "Document stored");

        Ok(StoredDocument {
            key: key.to_string(),
            url: self.config.object_url(key),
            checksum,
            size,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete from S3: {}", key))?;

        info!("Deleted s3://{}/{}", self.config.bucket, key);

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Storage {
    async fn store_document(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<StoredDocument> {
        self.upload(key, data, content_type).await
    }

    async fn remove_document(&self, key: &str) -> Result<()> {
        self.delete(key).await
    }
}

/// Build a fresh, collision-free key for an uploaded document
pub fn document_key(upload_id: Uuid, file_name: Option<&str>) -> String {
    format!(
        "{}/{}/{}",
        DOCUMENT_PREFIX,
        upload_id,
        sanitize_file_name(file_name.unwrap_or_default())
    )
}

/// Keep ASCII alphanumerics, `.`, `-`, `_`; everything else becomes `-`.
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers on some platforms send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "document.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}

pub(crate) fn calculate_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            document_key(id, Some("Dune (1965).pdf")),
            "books/documents/00000000-0000-0000-0000-000000000000/Dune--1965-.pdf"
        );
    }

    #[test]
    fn test_sanitize_strips_client_paths() {
        assert_eq!(sanitize_file_name("C:\\Users\\me\\book.pdf"), "book.pdf");
        assert_eq!(sanitize_file_name("/tmp/a b.pdf"), "a-b.pdf");
    }

    #[test]
    fn test_sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_file_name(""), "document.pdf");
        assert_eq!(sanitize_file_name("   "), "document.pdf");
        assert_eq!(sanitize_file_name(".."), "document.pdf");
        assert_eq!(document_key(Uuid::nil(), None).rsplit('/').next(), Some("document.pdf"));
    }

    #[test]
    fn test_calculate_sha256() {
        let checksum = calculate_sha256(b"Hello, World!");
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[tokio::test]
    async fn test_storage_client_builds_without_network() {
        let storage = Storage::new(StorageConfig::for_minio("http://localhost:9000", "books")).await;
        assert!(storage.is_ok());
    }
}
