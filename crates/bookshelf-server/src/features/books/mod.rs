//! Books feature module
//!
//! Catalog reads are public. Creating, updating, and deleting books requires
//! an admin session token.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;


pub use commands::{
    DeleteBookCommand, DeleteBookError, DeleteBookResponse, SubmitBookCommand, SubmitBookError,
    UpdateBookCommand, UpdateBookError,
};
pub use queries::{GetBookError, GetBookQuery, ListBooksError, ListBooksQuery, ListBooksResponse};
pub use routes::books_routes;
pub use types::{BookMutationResponse, BookServices, FileUpload, UploadPolicy};
