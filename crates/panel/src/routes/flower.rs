use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use tracing::info;

use server::errors::{ErrorBody, JsonApiError};
use service::flower_service;
use service::pagination::{FlowerPage, ListQuery};
use service::schemas::{FlowerCreate, FlowerResponse, FlowerUpdate};

use crate::routes::PanelState;

#[utoipa::path(
    get, path = "/service-a/v1/flower/list/", tag = "flower",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of flowers", body = FlowerPage),
        (status = 422, description = "Unknown sort column", body = ErrorBody)
    )
)]
pub async fn list(State(state): State<PanelState>, Query(q): Query<ListQuery>) -> Result<Json<FlowerPage>, JsonApiError> {
    Ok(Json(flower_service::list(&state.db, &q).await?))
}

#[utoipa::path(
    get, path = "/service-a/v1/flower/{flower_id}/", tag = "flower",
    params(("flower_id" = i32, Path, description = "Flower id")),
    responses(
        (status = 200, description = "Found", body = FlowerResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get(State(state): State<PanelState>, Path(flower_id): Path<i32>) -> Result<Json<FlowerResponse>, JsonApiError> {
    Ok(Json(flower_service::get(&state.db, flower_id).await?))
}

#[utoipa::path(
    post, path = "/service-a/v1/flower/", tag = "flower",
    request_body = FlowerCreate,
    responses(
        (status = 201, description = "Created", body = FlowerResponse),
        (status = 422, description = "Validation Error", body = ErrorBody)
    )
)]
pub async fn create(State(state): State<PanelState>, Json(input): Json<FlowerCreate>) -> Result<(StatusCode, Json<FlowerResponse>), JsonApiError> {
    let created = flower_service::create(&state.db, input).await?;
    info!(event = "flower_created", flower_id = created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch, path = "/service-a/v1/flower/{flower_id}/", tag = "flower",
    params(("flower_id" = i32, Path, description = "Flower id")),
    request_body = FlowerUpdate,
    responses(
        (status = 200, description = "Updated", body = FlowerResponse),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<PanelState>,
    Path(flower_id): Path<i32>,
    Json(input): Json<FlowerUpdate>,
) -> Result<Json<FlowerResponse>, JsonApiError> {
    Ok(Json(flower_service::update(&state.db, flower_id, input).await?))
}

#[utoipa::path(
    delete, path = "/service-a/v1/flower/{flower_id}/", tag = "flower",
    params(("flower_id" = i32, Path, description = "Flower id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete(State(state): State<PanelState>, Path(flower_id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    flower_service::remove(&state.db, flower_id).await?;
    info!(event = "flower_deleted", flower_id);
    Ok(StatusCode::NO_CONTENT)
}
