use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use tracing::info;

use service::book_service;
use service::pagination::{BookPage, ListQuery};
use service::schemas::{BookCreate, BookResponse, BookUpdate};

use crate::errors::{ErrorBody, JsonApiError};
use crate::routes::ServerState;

#[utoipa::path(
    get, path = "/service-b/v1/book/list/", tag = "book",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage),
        (status = 422, description = "Unknown sort column", body = ErrorBody)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<BookPage>, JsonApiError> {
    let page = book_service::list(&state.db, &q).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/service-b/v1/book/{book_id}/", tag = "book",
    params(("book_id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Found", body = BookResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(book_id): Path<i32>) -> Result<Json<BookResponse>, JsonApiError> {
    Ok(Json(book_service::get(&state.db, book_id).await?))
}

#[utoipa::path(
    post, path = "/service-b/v1/book/", tag = "book",
    request_body = BookCreate,
    responses(
        (status = 201, description = "Created", body = BookResponse),
        (status = 422, description = "Validation Error", body = ErrorBody)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<BookCreate>) -> Result<(StatusCode, Json<BookResponse>), JsonApiError> {
    let created = book_service::create(&state.db, input).await?;
    info!(event = "book_created", book_id = created.id, author_id = created.author_id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch, path = "/service-b/v1/book/{book_id}/", tag = "book",
    params(("book_id" = i32, Path, description = "Book id")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Updated", body = BookResponse),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Validation Error", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(book_id): Path<i32>,
    Json(input): Json<BookUpdate>,
) -> Result<Json<BookResponse>, JsonApiError> {
    let updated = book_service::update(&state.db, book_id, input).await?;
    info!(event = "book_updated", book_id);
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/service-b/v1/book/{book_id}/", tag = "book",
    params(("book_id" = i32, Path, description = "Book id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(book_id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    book_service::remove(&state.db, book_id).await?;
    info!(event = "book_deleted", book_id);
    Ok(StatusCode::NO_CONTENT)
}
