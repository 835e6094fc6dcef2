pub mod author;
pub mod book;

use axum::{extract::State, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::metrics::metrics_handler;
use common::types::{Health, ServiceInfo};

use crate::openapi::ApiDoc;

pub const ROOT_PATH: &str = "/service-b/";
pub const OPENAPI_PATH: &str = "/service-b/openapi.json/";
pub const DOCS_PATH: &str = "/service-b/docs";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub info: ServiceInfo,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = Health)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/service-b/", tag = "root", responses((status = 200, description = "Service name and version", body = ServiceInfo)))]
pub async fn root(State(state): State<ServerState>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

/// CORS and request tracing shared by every service router.
pub fn with_observability(router: Router) -> Router {
    router
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// Build the Service B router: book/author CRUD, OpenAPI document and Swagger UI.
pub fn build_router(state: ServerState) -> Router {
    let mut doc = ApiDoc::openapi();
    doc.info.title = state.info.name_service.clone();
    doc.info.version = state.info.version.clone();

    let api = Router::new()
        .route(ROOT_PATH, get(root))
        .route("/service-b/v1/book/", axum::routing::post(book::create))
        .route("/service-b/v1/book/list/", get(book::list))
        .route(
            "/service-b/v1/book/:book_id/",
            get(book::get).patch(book::update).delete(book::delete),
        )
        .route("/service-b/v1/author/", axum::routing::post(author::create))
        .route("/service-b/v1/author/list/", get(author::list))
        .route(
            "/service-b/v1/author/:author_id/",
            get(author::get).patch(author::update).delete(author::delete),
        )
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, doc))
        .with_state(state);

    with_observability(api)
}
