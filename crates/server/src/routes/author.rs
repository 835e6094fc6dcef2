use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use tracing::info;

use service::author_service;
use service::pagination::{AuthorPage, ListQuery};
use service::schemas::{AuthorCreate, AuthorResponse, AuthorUpdate};

use crate::errors::{ErrorBody, JsonApiError};
use crate::routes::ServerState;

#[utoipa::path(
    get, path = "/service-b/v1/author/list/", tag = "author",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of authors", body = AuthorPage),
        (status = 422, description = "Unknown sort column", body = ErrorBody)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<AuthorPage>, JsonApiError> {
    let page = author_service::list(&state.db, &q).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/service-b/v1/author/{author_id}/", tag = "author",
    params(("author_id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Found", body = AuthorResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(author_id): Path<i32>) -> Result<Json<AuthorResponse>, JsonApiError> {
    Ok(Json(author_service::get(&state.db, author_id).await?))
}

#[utoipa::path(
    post, path = "/service-b/v1/author/", tag = "author",
    request_body = AuthorCreate,
    responses(
        (status = 201, description = "Created", body = AuthorResponse),
        (status = 422, description = "Validation Error", body = ErrorBody)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<AuthorCreate>) -> Result<(StatusCode, Json<AuthorResponse>), JsonApiError> {
    let created = author_service::create(&state.db, input).await?;
    info!(event = "author_created", author_id = created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch, path = "/service-b/v1/author/{author_id}/", tag = "author",
    params(("author_id" = i32, Path, description = "Author id")),
    request_body = AuthorUpdate,
    responses(
        (status = 200, description = "Updated", body = AuthorResponse),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Validation Error", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(author_id): Path<i32>,
    Json(input): Json<AuthorUpdate>,
) -> Result<Json<AuthorResponse>, JsonApiError> {
    let updated = author_service::update(&state.db, author_id, input).await?;
    info!(event = "author_updated", author_id);
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/service-b/v1/author/{author_id}/", tag = "author",
    params(("author_id" = i32, Path, description = "Author id")),
    responses(
        (status = 204, description = "Deleted together with the author's books"),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(author_id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    author_service::remove(&state.db, author_id).await?;
    info!(event = "author_deleted", author_id);
    Ok(StatusCode::NO_CONTENT)
}
