pub mod flower;

use axum::{extract::State, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::metrics::metrics_handler;
use common::types::ServiceInfo;
use server::routes::{health, with_observability};

use crate::openapi::ApiDoc;

pub const ROOT_PATH: &str = "/service-a/";
pub const OPENAPI_PATH: &str = "/service-a/openapi.json/";
pub const DOCS_PATH: &str = "/service-a/docs";

#[derive(Clone)]
pub struct PanelState {
    pub db: DatabaseConnection,
    pub info: ServiceInfo,
}

#[utoipa::path(get, path = "/service-a/", tag = "root", responses((status = 200, description = "Service name and version", body = ServiceInfo)))]
pub async fn root(State(state): State<PanelState>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

/// Service A router: flower CRUD, OpenAPI document, Swagger UI and the admin site.
pub fn build_router(state: PanelState, admin: Router) -> Router {
    let mut doc = ApiDoc::openapi();
    doc.info.title = state.info.name_service.clone();
    doc.info.version = state.info.version.clone();

    let api = Router::new()
        .route(ROOT_PATH, get(root))
        .route("/service-a/v1/flower/", axum::routing::post(flower::create))
        .route("/service-a/v1/flower/list/", get(flower::list))
        .route(
            "/service-a/v1/flower/:flower_id/",
            get(flower::get).patch(flower::update).delete(flower::delete),
        )
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, doc))
        .with_state(state)
        .merge(admin);

    with_observability(api)
}
