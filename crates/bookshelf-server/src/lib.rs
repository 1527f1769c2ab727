//! Bookshelf Server Library
//!
//! HTTP service for a book catalog whose records point at two externally
//! hosted assets: a document kept in S3-compatible storage and a cover image
//! kept on a media host.
//!
//! # Architecture
//!
//! The server follows a **CQRS** layout of vertical feature slices:
//!
//! - **Commands** (write operations): submit, update, and delete books;
//!   register and log in admins. Executed via POST, PUT, and DELETE.
//! - **Queries** (read operations): list and get books. Executed via GET.
//!
//! ## Book ingestion
//!
//! A submission is validated, its document is uploaded, then its cover, and
//! only then is the record persisted. Each hosted asset is tracked in an
//! upload ledger; if a later step fails the ledger removes what was already
//! uploaded, so the catalog never points at missing assets and providers are
//! not left with orphans.
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework
//! - **SQLx**: PostgreSQL access and migrations
//! - **aws-sdk-s3** / **reqwest**: provider clients
//! - **Tower**: middleware and service abstractions

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod media;
pub mod middleware;
pub mod storage;

// Re-export commonly used types
pub use error::AppError;
