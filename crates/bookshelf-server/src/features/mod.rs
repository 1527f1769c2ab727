//! Feature modules implementing the Bookshelf API
//!
//! Each feature is a vertical slice following the CQRS pattern:
//! - `commands/` - write operations (create, update, delete)
//! - `queries/` - read operations (get, list)
//! - `routes.rs` - HTTP route definitions and error mapping
//! - `types.rs` - types shared inside the slice
//!
//! # Features
//!
//! - **books**: the catalog and the book ingestion workflow
//! - **admins**: administrator registration and login

pub mod admins;
pub mod books;
pub mod shared;

use axum::Router;

use crate::auth::AuthKeys;
use admins::AdminState;
use books::BookServices;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub books: BookServices,
    pub admins: AdminState,
    /// Verifies admin tokens on mutating routes
    pub keys: AuthKeys,
}

/// Mounts every feature under its own prefix:
/// - `/books` - catalog reads (public) and writes (admin)
/// - `/admin` - register and login
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest(
            "/books",
            books::books_routes(state.keys.clone()).with_state(state.books.clone()),
        )
        .nest("/admin", admins::admins_routes().with_state(state.admins.clone()))
}
