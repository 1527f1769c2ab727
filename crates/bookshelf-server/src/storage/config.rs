use serde::{Deserialize, Serialize};
use std::env;

use crate::config::{env_or, required_env};

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
    /// Base for durable document links, e.g. a CDN in front of the bucket
    pub public_url: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("path_style", &self.path_style)
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: required_env("S3_BUCKET")?,
            access_key: required_env("S3_ACCESS_KEY")?,
            secret_key: required_env("S3_SECRET_KEY")?,
            path_style: env_or("S3_PATH_STYLE", false)?,
            public_url: env::var("S3_PUBLIC_URL").ok().filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn for_minio(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            bucket: bucket.into(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
            public_url: None,
        }
    }

    /// Durable link for an object key.
    ///
    /// `public_url` wins; otherwise a custom endpoint is addressed path-style
    /// and AWS is addressed virtual-host style.
    pub fn object_url(&self, key: &str) -> String {
        if let Some(base) = &self.public_url {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }
}
