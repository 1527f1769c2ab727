//! Catalog types shared across Bookshelf crates

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CommonError, Result};

// ============================================================================
// Category
// ============================================================================

/// Fixed vocabulary of book categories.
///
/// The wire names match the labels shown to readers (`"Non-Fiction"` keeps its
/// hyphen). `Other` is both the default and the fallback for anything the
/// catalog does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Science,
    History,
    Biography,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Category::Fiction,
        Category::NonFiction,
        Category::Science,
        Category::History,
        Category::Biography,
        Category::Other,
    ];

    /// Canonical display name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fiction => "Fiction",
            Category::NonFiction => "Non-Fiction",
            Category::Science => "Science",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::Other => "Other",
        }
    }

    /// Parse user input, falling back to `Other`.
    ///
    /// Returns the category and whether the input was recognized. Blank input
    /// counts as recognized: an omitted category simply takes the default.
    pub fn parse_lenient(input: &str) -> (Category, bool) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return (Category::Other, true);
        }
        match trimmed.parse::<Category>() {
            Ok(category) => (category, true),
            Err(_) => (Category::Other, false),
        }
    }
}

impl FromStr for Category {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "fiction" => Ok(Category::Fiction),
            "nonfiction" => Ok(Category::NonFiction),
            "science" => Ok(Category::Science),
            "history" => Ok(Category::History),
            "biography" => Ok(Category::Biography),
            "other" => Ok(Category::Other),
            _ => Err(CommonError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Book Record
// ============================================================================

/// A persisted catalog entry.
///
/// Records only exist once both external assets are hosted, so
/// `document_url` is always populated. `cover_image_url` and `cover_image_id`
/// are optional only for deployments that do not require covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Identifier assigned by the catalog store
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub category: Category,
    /// Durable link returned by the binary storage provider
    pub document_url: String,
    /// Durable URL returned by the media host
    pub cover_image_url: Option<String>,
    /// Media host identifier used to replace or delete the cover later
    pub cover_image_id: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Dates
// ============================================================================

/// Parse an optional publication date.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (the date part is kept).
/// Blank input yields `None`.
pub fn parse_published_date(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| CommonError::InvalidDate(trimmed.to_string()))
}
