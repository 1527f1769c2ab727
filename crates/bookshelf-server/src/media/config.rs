use serde::{Deserialize, Serialize};
use std::env;

use crate::config::required_env;

/// Default media host API root (Cloudinary-compatible)
pub const DEFAULT_MEDIA_API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Default folder namespace for cover images
pub const DEFAULT_COVER_FOLDER: &str = "book-covers";

#[derive(Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub api_base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub cover_folder: String,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("api_base_url", &self.api_base_url)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("cover_folder", &self.cover_folder)
            .finish()
    }
}

impl MediaConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_base_url: env::var("MEDIA_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MEDIA_API_BASE_URL.to_string()),
            cloud_name: required_env("MEDIA_CLOUD_NAME")?,
            api_key: required_env("MEDIA_API_KEY")?,
            api_secret: required_env("MEDIA_API_SECRET")?,
            cover_folder: env::var("MEDIA_COVER_FOLDER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COVER_FOLDER.to_string()),
        })
    }

    /// Endpoint for an image action (`upload`, `destroy`)
    pub fn image_endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name,
            action
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_endpoint() {
        let config = MediaConfig {
            api_base_url: "http://127.0.0.1:9999/v1_1/".to_string(),
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            cover_folder: DEFAULT_COVER_FOLDER.to_string(),
        };
        assert_eq!(
            config.image_endpoint("upload"),
            "http://127.0.0.1:9999/v1_1/demo/image/upload"
        );
        assert!(!format!("{:?}", config).contains("\"secret\""));
    }
}
