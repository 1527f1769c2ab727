//! Bookshelf Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the Bookshelf workspace.
//!
//! # Overview
//!
//! - **Types**: the catalog record (`BookRecord`) and its `Category` vocabulary
//! - **Error Handling**: the common error and result types
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_common::types::Category;
//!
//! let (category, recognized) = Category::parse_lenient("science");
//! assert_eq!(category, Category::Science);
//! assert!(recognized);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{BookRecord, Category};
