//! Media host client for cover images
//!
//! Talks to a Cloudinary-compatible signed upload API. Each request carries
//! the API key, a unix timestamp, and a SHA-256 signature over the sorted
//! parameters plus the API secret.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

pub mod config;

use config::MediaConfig;

/// A cover image accepted by the media host
#[derive(Debug, Clone, PartialEq)]
pub struct HostedImage {
    /// Durable HTTPS URL recorded on the book
    pub secure_url: String,
    /// Provider identifier used to replace or delete the image later
    pub public_id: String,
}

/// Where cover images are hosted
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload_image(
        &self,
        folder: &str,
        data: Vec<u8>,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> Result<HostedImage>;

    async fn destroy_image(&self, public_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bookshelf-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build media host HTTP client")?;

        info!(cloud = %config.cloud_name, "Media host client initialized");

        Ok(Self { http, config })
    }

    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.config.api_secret)
    }
}

#[async_trait]
impl MediaHost for MediaClient {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload_image(
        &self,
        folder: &str,
        data: Vec<u8>,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> Result<HostedImage> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder.to_string()), ("timestamp", timestamp.clone())]);

        let mut file = Part::bytes(data).file_name(file_name.unwrap_or_else(|| "cover".to_string()));
        if let Some(ct) = content_type {
            file = file.mime_str(&ct).context("Invalid cover content type")?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = self.config.image_endpoint("upload");
        debug!(%url, "Uploading cover image");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Media host request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Media host rejected upload with status {}: {}", status, body);
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("Media host returned an unreadable response")?;

        match (body.secure_url, body.public_id) {
            (Some(secure_url), Some(public_id))
                if !secure_url.is_empty() && !public_id.is_empty() =>
            {
                info!(%public_id, "Cover image hosted");
                Ok(HostedImage {
                    secure_url,
                    public_id,
                })
            }
            _ => bail!("Media host response is missing secure_url or public_id"),
        }
    }

    #[instrument(skip(self))]
    async fn destroy_image(&self, public_id: &str) -> Result<()> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.clone()),
        ]);

        let response = self
            .http
            .post(self.config.image_endpoint("destroy"))
            .form(&[
                ("public_id", public_id.to_string()),
                ("timestamp", timestamp),
                ("api_key", self.config.api_key.clone()),
                ("signature", signature),
                ("signature_algorithm", "sha256".to_string()),
            ])
            .send()
            .await
            .context("Media host request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Media host rejected destroy with status {}", status);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .context("Media host returned an unreadable response")?;

        // "not found" means there is nothing left to clean up.
        match body.result.as_str() {
            "ok" | "not found" => {
                info!(%public_id, result = %body.result, "Cover image destroyed");
                Ok(())
            }
            other => bail!("Media host could not destroy {}: {}", public_id, other),
        }
    }
}

/// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) followed by the secret.
pub fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
