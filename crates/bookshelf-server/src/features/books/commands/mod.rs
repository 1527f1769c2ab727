pub mod delete;
pub mod submit;
pub mod update;
pub mod uploads;

pub use delete::{DeleteBookCommand, DeleteBookError, DeleteBookResponse};
pub use submit::{SubmitBookCommand, SubmitBookError};
pub use update::{UpdateBookCommand, UpdateBookError};
pub use uploads::{Provider, UploadError, UploadLedger};
