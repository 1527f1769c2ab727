use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::response::ErrorResponse;
use crate::auth::AuthKeys;
use crate::middleware::auth::require_admin;

use super::{
    commands::{
        DeleteBookCommand, DeleteBookError, SubmitBookCommand, SubmitBookError,
        UpdateBookCommand, UpdateBookError,
    },
    queries::{GetBookError, GetBookQuery, ListBooksError, ListBooksQuery},
    types::{BookServices, FileUpload},
};

/// Reads are public; every write requires an admin token
pub fn books_routes(keys: AuthKeys) -> Router<BookServices> {
    let admin = || middleware::from_fn_with_state(keys.clone(), require_admin);

    Router::new()
        .route("/", get(list_books))
        .route("/", post(create_book).route_layer(admin()))
        .route("/:id", get(get_book))
        .route("/:id", put(update_book).route_layer(admin()))
        .route("/:id", delete(delete_book).route_layer(admin()))
        .route("/:id/files", put(update_book_files).route_layer(admin()))
}

/// Text fields and binaries of a multipart book form
#[derive(Debug, Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    category: Option<String>,
    published_date: Option<String>,
    cover: Option<FileUpload>,
    document: Option<FileUpload>,
}

impl BookForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, BookApiError> {
        let mut multipart = multipart.map_err(|e| BookApiError::BadRequest(e.body_text()))?;
        let mut form = BookForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "coverPhoto" | "pdf" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?.to_vec();
                    // Browsers send an empty part for an untouched file input.
                    if data.is_empty() {
                        continue;
                    }
                    let upload = FileUpload {
                        file_name,
                        content_type,
                        data,
                    };
                    if name == "pdf" {
                        form.document = Some(upload);
                    } else {
                        form.cover = Some(upload);
                    }
                }
                "title" => form.title = Some(field.text().await?),
                "author" => form.author = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "category" => form.category = Some(field.text().await?),
                "publishedDate" => form.published_date = Some(field.text().await?),
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn into_submission(self) -> SubmitBookCommand {
        SubmitBookCommand {
            title: self.title,
            author: self.author,
            description: self.description,
            category: self.category,
            published_date: self.published_date,
            cover: self.cover,
            document: self.document,
        }
    }

    fn into_update(self, id: Uuid) -> UpdateBookCommand {
        UpdateBookCommand {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            category: self.category,
            published_date: self.published_date,
            cover: self.cover,
            document: self.document,
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, BookApiError> {
    Uuid::parse_str(raw).map_err(|_| BookApiError::InvalidId(raw.to_string()))
}

#[tracing::instrument(skip(services, multipart))]
async fn create_book(
    State(services): State<BookServices>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, BookApiError> {
    let command = BookForm::read(multipart).await?.into_submission();
    let response = super::commands::submit::handle(services, command).await?;

    tracing::info!(book_id = %response.book.id, "Book created via API");

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[tracing::instrument(skip(services))]
async fn list_books(
    State(services): State<BookServices>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Response, BookApiError> {
    let Query(query) = query.map_err(|e| BookApiError::BadRequest(e.body_text()))?;
    let response = super::queries::list::handle(services, query).await?;

    tracing::debug!(
        count = response.books.len(),
        total = response.summary.total_count,
        "Books listed via API"
    );

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(services))]
async fn get_book(
    State(services): State<BookServices>,
    Path(id): Path<String>,
) -> Result<Response, BookApiError> {
    let id = parse_id(&id)?;
    let book = super::queries::get::handle(services, GetBookQuery { id }).await?;

    Ok((StatusCode::OK, Json(book)).into_response())
}

#[tracing::instrument(skip(services, body))]
async fn update_book(
    State(services): State<BookServices>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBookCommand>, JsonRejection>,
) -> Result<Response, BookApiError> {
    let id = parse_id(&id)?;
    let Json(mut command) = body.map_err(|e| BookApiError::BadRequest(e.body_text()))?;
    command.id = id;

    let response = super::commands::update::handle(services, command).await?;

    tracing::info!(book_id = %response.book.id, "Book updated via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(services, multipart))]
async fn update_book_files(
    State(services): State<BookServices>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, BookApiError> {
    let id = parse_id(&id)?;
    let command = BookForm::read(multipart).await?.into_update(id);

    let response = super::commands::update::handle(services, command).await?;

    tracing::info!(book_id = %response.book.id, "Book files replaced via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[tracing::instrument(skip(services))]
async fn delete_book(
    State(services): State<BookServices>,
    Path(id): Path<String>,
) -> Result<Response, BookApiError> {
    let id = parse_id(&id)?;
    let response = super::commands::delete::handle(services, DeleteBookCommand { id }).await?;

    tracing::info!(book_id = %id, "Book deleted via API");

    Ok((StatusCode::OK, Json(response)).into_response())
}

#[derive(Debug)]
enum BookApiError {
    InvalidId(String),
    BadRequest(String),
    Multipart(MultipartError),
    SubmitError(SubmitBookError),
    UpdateError(UpdateBookError),
    DeleteError(DeleteBookError),
    GetError(GetBookError),
    ListError(ListBooksError),
}

impl From<MultipartError> for BookApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<SubmitBookError> for BookApiError {
    fn from(err: SubmitBookError) -> Self {
        Self::SubmitError(err)
    }
}

impl From<UpdateBookError> for BookApiError {
    fn from(err: UpdateBookError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<DeleteBookError> for BookApiError {
    fn from(err: DeleteBookError) -> Self {
        Self::DeleteError(err)
    }
}

impl From<GetBookError> for BookApiError {
    fn from(err: GetBookError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListBooksError> for BookApiError {
    fn from(err: ListBooksError) -> Self {
        Self::ListError(err)
    }
}

fn validation(message: impl Into<String>) -> (StatusCode, &'static str, String) {
    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.into())
}

fn not_found(message: impl Into<String>) -> (StatusCode, &'static str, String) {
    (StatusCode::NOT_FOUND, "NOT_FOUND", message.into())
}

fn persistence(context: &str, err: &dyn std::error::Error) -> (StatusCode, &'static str, String) {
    tracing::error!("Catalog error during {}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "PERSISTENCE_ERROR",
        "Failed to save book".to_string(),
    )
}

impl IntoResponse for BookApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            BookApiError::InvalidId(raw) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                format!("'{}' is not a valid book ID", raw),
            ),
            BookApiError::BadRequest(message) => validation(message),
            BookApiError::Multipart(err) => {
                if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", err.body_text())
                } else {
                    validation(err.body_text())
                }
            }

            BookApiError::SubmitError(SubmitBookError::Validation(e)) => validation(e.to_string()),
            BookApiError::SubmitError(SubmitBookError::Upload(e)) => {
                tracing::error!("Upload failed during book creation: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_ERROR", e.client_message())
            }
            BookApiError::SubmitError(SubmitBookError::Persistence(e)) => {
                persistence("book creation", &e)
            }

            BookApiError::UpdateError(UpdateBookError::Validation(e)) => validation(e.to_string()),
            BookApiError::UpdateError(ref err @ UpdateBookError::NotFound(_)) => {
                not_found(err.to_string())
            }
            BookApiError::UpdateError(UpdateBookError::Upload(e)) => {
                tracing::error!("Upload failed during book update: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_ERROR", e.client_message())
            }
            BookApiError::UpdateError(UpdateBookError::Persistence(e)) => {
                persistence("book update", &e)
            }

            BookApiError::DeleteError(ref err @ DeleteBookError::NotFound(_)) => {
                not_found(err.to_string())
            }
            BookApiError::DeleteError(DeleteBookError::Persistence(e)) => {
                persistence("book deletion", &e)
            }

            BookApiError::GetError(ref err @ GetBookError::NotFound(_)) => {
                not_found(err.to_string())
            }
            BookApiError::GetError(GetBookError::Database(e)) => {
                tracing::error!("Catalog error during book retrieval: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            }

            BookApiError::ListError(ListBooksError::Database(e)) => {
                tracing::error!("Catalog error during book listing: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            BookApiError::ListError(err) => validation(err.to_string()),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
