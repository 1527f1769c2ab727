//! Types shared by the book commands, queries, and routes

use bookshelf_common::types::parse_published_date;
use bookshelf_common::{BookRecord, Category};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::CatalogStore;
use crate::config::UploadConfig;
use crate::features::shared::validation::{
    validate_optional_text, validate_required_text, FieldValidationError,
};
use crate::media::MediaHost;
use crate::storage::DocumentStore;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const AUTHOR_MAX_LENGTH: usize = 50;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// A binary part received with a submission
#[derive(Clone)]
pub struct FileUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

impl FileUpload {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            data,
        }
    }

    pub fn with_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// How submissions reach the providers
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub cover_folder: String,
    pub timeout: Duration,
    pub require_cover: bool,
    pub cleanup_orphans: bool,
}

impl UploadPolicy {
    pub fn new(cover_folder: impl Into<String>, upload: &UploadConfig) -> Self {
        Self {
            cover_folder: cover_folder.into(),
            timeout: upload.timeout(),
            require_cover: upload.require_cover,
            cleanup_orphans: upload.cleanup_orphans,
        }
    }
}

/// Collaborators of the book ingestion workflow
#[derive(Clone)]
pub struct BookServices {
    pub catalog: Arc<dyn CatalogStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub media: Arc<dyn MediaHost>,
    pub policy: UploadPolicy,
}

/// Body returned by create and update
#[derive(Debug, Clone, Serialize)]
pub struct BookMutationResponse {
    pub message: String,
    pub book: BookRecord,
    /// Non-fatal notes, e.g. an unrecognized category that fell back to Other
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Metadata validation failures. Messages name the offending input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    #[error(transparent)]
    Field(#[from] FieldValidationError),

    #[error("{field} is required")]
    MissingFile { field: &'static str },

    #[error("coverPhoto must be an image (got {0})")]
    CoverNotImage(String),

    #[error("publishedDate '{0}' is invalid: expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Validated, trimmed metadata
#[derive(Debug, Clone, PartialEq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub category: Category,
    pub published_date: Option<NaiveDate>,
    pub warnings: Vec<String>,
}

/// Validate the editable text fields shared by create and update
pub fn validate_metadata(
    title: Option<&str>,
    author: Option<&str>,
    description: Option<&str>,
    category: Option<&str>,
    published_date: Option<&str>,
) -> Result<BookMetadata, BookValidationError> {
    let title = validate_required_text("title", title, TITLE_MAX_LENGTH)?;
    let author = validate_required_text("author", author, AUTHOR_MAX_LENGTH)?;
    let description =
        validate_optional_text("description", description, DESCRIPTION_MAX_LENGTH)?;

    let mut warnings = Vec::new();
    let raw_category = category.unwrap_or_default();
    let (category, recognized) = Category::parse_lenient(raw_category);
    if !recognized {
        warnings.push(format!(
            "Unrecognized category '{}' was stored as '{}'",
            raw_category.trim(),
            Category::Other
        ));
    }

    let published_date = match published_date {
        Some(raw) => parse_published_date(raw)
            .map_err(|_| BookValidationError::InvalidDate(raw.trim().to_string()))?,
        None => None,
    };

    Ok(BookMetadata {
        title,
        author,
        description,
        category,
        published_date,
        warnings,
    })
}

/// A declared cover content type must be `image/*`
pub fn validate_cover_type(cover: &FileUpload) -> Result<(), BookValidationError> {
    match cover.content_type.as_deref() {
        Some(declared) => match declared.parse::<mime::Mime>() {
            Ok(parsed) if parsed.type_() == mime::IMAGE => Ok(()),
            _ => Err(BookValidationError::CoverNotImage(declared.to_string())),
        },
        None => Ok(()),
    }
}
